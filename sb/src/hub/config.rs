//! Hub configuration

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mediator::SenderPolicy;

/// Hub configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Channel buffer size for hub requests
    #[serde(rename = "channel-buffer", default = "default_channel_buffer")]
    pub channel_buffer: usize,

    /// Channel buffer size for each participant's inbox
    #[serde(rename = "participant-channel-buffer", default = "default_participant_channel_buffer")]
    pub participant_channel_buffer: usize,

    /// Whether non-members may broadcast
    #[serde(rename = "sender-policy", default)]
    pub sender_policy: SenderPolicy,
}

fn default_channel_buffer() -> usize {
    debug!("default_channel_buffer: called");
    1000
}

fn default_participant_channel_buffer() -> usize {
    debug!("default_participant_channel_buffer: called");
    100
}

impl Default for HubConfig {
    fn default() -> Self {
        debug!("HubConfig::default: called");
        Self {
            channel_buffer: default_channel_buffer(),
            participant_channel_buffer: default_participant_channel_buffer(),
            sender_policy: SenderPolicy::default(),
        }
    }
}

impl HubConfig {
    /// Validate buffer sizes before any channel is built
    ///
    /// Tokio's bounded channels need room for at least one item.
    pub fn validate(&self) -> Result<()> {
        if self.channel_buffer == 0 {
            return Err(eyre!("hub channel-buffer must be at least 1"));
        }
        if self.participant_channel_buffer == 0 {
            return Err(eyre!("hub participant-channel-buffer must be at least 1"));
        }
        Ok(())
    }
}
