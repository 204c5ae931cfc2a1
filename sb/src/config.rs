//! Switchboard configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hub::HubConfig;
use crate::mediator::MediatorConfig;

/// Main switchboard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Synchronous mediator settings
    pub mediator: MediatorConfig,

    /// Concurrent hub settings
    pub hub: HubConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        self.hub.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .switchboard.yml
        let local_config = PathBuf::from(".switchboard.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/switchboard/switchboard.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("switchboard").join("switchboard.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate().context("Invalid config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediator::{FailurePolicy, SenderPolicy};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mediator, MediatorConfig::default());
        assert_eq!(config.hub.channel_buffer, 1000);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("switchboard.yml");
        fs::write(
            &path,
            r#"
mediator:
  sender-policy: lenient
  failure-policy: propagate
hub:
  participant-channel-buffer: 16
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.mediator.sender_policy, SenderPolicy::Lenient);
        assert_eq!(config.mediator.failure_policy, FailurePolicy::Propagate);
        assert_eq!(config.hub.participant_channel_buffer, 16);
        assert_eq!(config.hub.channel_buffer, 1000);
        assert_eq!(config.hub.sender_policy, SenderPolicy::Strict);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("nope.yml"));
    }

    #[test]
    fn test_load_invalid_policy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "mediator:\n  sender-policy: sometimes\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_zero_buffer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("zero.yml");
        fs::write(&path, "hub:\n  participant-channel-buffer: 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("participant-channel-buffer must be at least 1"));
    }
}
