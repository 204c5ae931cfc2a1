//! Hub error types

use thiserror::Error;

/// Errors returned to hub handles
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Hub channel closed")]
    ChannelClosed,

    #[error("Hub shut down before replying")]
    ShutDown,

    #[error("Sender {name} is not a member of this hub")]
    UnknownSender { name: String },
}
