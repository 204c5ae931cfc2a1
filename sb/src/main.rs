//! Switchboard - in-process mediator demo
//!
//! CLI entry point for running message scripts through a mediator.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use switchboard::cli::{Cli, Command, OutputFormat};
use switchboard::config::Config;
use switchboard::script::{self, Script};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("switchboard")
        .join("logs");

    // Write to a log file, not stdout; stderr only when the file is unavailable
    let writer = match fs::create_dir_all(&log_dir).and_then(|_| fs::File::create(log_dir.join("switchboard.log"))) {
        Ok(file) => BoxMakeWriter::new(file),
        Err(_) => BoxMakeWriter::new(std::io::stderr),
    };

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(?config, "switchboard loaded config");

    match cli.command {
        Command::Demo { concurrent, format } => cmd_run(&config, Script::reference(), concurrent, format).await,
        Command::Send {
            participants,
            messages,
            concurrent,
            format,
        } => cmd_run(&config, Script::new(participants, messages), concurrent, format).await,
    }
}

async fn cmd_run(config: &Config, script: Script, concurrent: bool, format: OutputFormat) -> Result<()> {
    let lines: Vec<String> = if concurrent {
        script::run_concurrent(&script, &config.hub)
            .await?
            .into_iter()
            .flat_map(|(_, inbox)| inbox)
            .collect()
    } else {
        let registry = keyreg::init_shared(script::wire(&script, &config.mediator))?;
        script::run_sync(&script, registry)?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
        OutputFormat::Text => {
            for line in &lines {
                println!("{}", line);
            }
            eprintln!(
                "{} {} message(s), {} delivery(ies){}",
                "✓".green(),
                script.messages.len(),
                lines.len(),
                if concurrent { " (grouped by recipient)".dimmed().to_string() } else { String::new() }
            );
        }
    }

    Ok(())
}
