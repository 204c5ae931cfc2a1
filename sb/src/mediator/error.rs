//! Mediator error types

use thiserror::Error;

/// Errors surfaced to a participant that sends through a mediator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediatorError {
    #[error("Participant {name} is not attached to a mediator")]
    NotRegistered { name: String },

    #[error("Mediator for participant {name} has been dropped")]
    MediatorDropped { name: String },

    #[error("Sender {name} is not a member of this mediator")]
    UnknownSender { name: String },

    #[error("Delivery to {recipient} failed: {reason}")]
    DeliveryFailed { recipient: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_message() {
        let err = MediatorError::NotRegistered {
            name: "Alice".to_string(),
        };
        assert!(err.to_string().contains("Alice"));
    }

    #[test]
    fn test_delivery_failed_message() {
        let err = MediatorError::DeliveryFailed {
            recipient: "Bob".to_string(),
            reason: "inbox full".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Bob"));
        assert!(msg.contains("inbox full"));
    }
}
