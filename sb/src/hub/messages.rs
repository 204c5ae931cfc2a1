//! Message types for the Hub

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::error::HubError;

/// A broadcast message as delivered to each recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,

    #[serde(rename = "from-name")]
    pub from: String,

    pub body: String,

    /// Unix timestamp in milliseconds
    #[serde(rename = "sent-at")]
    pub sent_at: i64,
}

impl Envelope {
    pub fn new(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            from: from.into(),
            body: body.into(),
            sent_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Internal requests to the Hub task
#[derive(Debug)]
pub enum HubRequest {
    /// Fan an envelope out to every member except its sender
    Broadcast {
        envelope: Envelope,
        reply_tx: oneshot::Sender<Result<usize, HubError>>,
    },

    /// Get current metrics
    GetMetrics { reply_tx: oneshot::Sender<HubMetrics> },

    /// Shutdown the hub
    Shutdown,
}

/// Hub metrics for observability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub members: usize,
    pub requests_received: u64,
    pub broadcasts_routed: u64,
    pub messages_delivered: u64,
    pub delivery_failures: u64,
    pub rejected_senders: u64,
}
