//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::script::ScriptMessage;

/// Switchboard - in-process mediator demo
#[derive(Parser, Debug)]
#[command(
    name = "sb",
    author,
    version,
    about = "Fan messages out to every other participant through a mediator",
    after_help = "Logs are written to: ~/.local/share/switchboard/logs/switchboard.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the Alice, Bob and Charlie greeting exchange
    Demo {
        /// Run every participant on its own task
        #[arg(long)]
        concurrent: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Broadcast custom messages between custom participants
    Send {
        /// Participant name, in registration order (repeatable)
        #[arg(short = 'p', long = "participant", required = true)]
        participants: Vec<String>,

        /// Message as FROM=TEXT, sent in the order given (repeatable)
        #[arg(short = 'm', long = "message", required = true)]
        messages: Vec<ScriptMessage>,

        /// Run every participant on its own task
        #[arg(long)]
        concurrent: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for received messages
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
