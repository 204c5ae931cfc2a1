//! Mediator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a broadcast does when the sender is not a registered member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SenderPolicy {
    /// Reject the broadcast without delivering anything
    #[default]
    Strict,
    /// Deliver to every member
    Lenient,
}

/// What a broadcast does when a recipient's receive handler fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, record it in the delivery report and keep going
    #[default]
    Continue,
    /// Stop at the first failure and return it to the sender
    Propagate,
}

/// Mediator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    #[serde(rename = "sender-policy")]
    pub sender_policy: SenderPolicy,

    #[serde(rename = "failure-policy")]
    pub failure_policy: FailurePolicy,
}

impl MediatorConfig {
    pub fn with_sender_policy(mut self, sender_policy: SenderPolicy) -> Self {
        debug!(?sender_policy, "MediatorConfig::with_sender_policy: called");
        self.sender_policy = sender_policy;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        debug!(?failure_policy, "MediatorConfig::with_failure_policy: called");
        self.failure_policy = failure_policy;
        self
    }
}
