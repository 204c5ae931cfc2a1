//! Mediator for participant-to-participant broadcast
//!
//! Participants never hold references to each other. Each one registers with
//! a mediator and sends through it; the mediator fans the message out to every
//! *other* member, synchronously and in registration order.
//!
//! ```
//! use std::sync::Arc;
//! use switchboard::mediator::{ConcreteMediator, User};
//!
//! let mediator = Arc::new(ConcreteMediator::default());
//! let alice = Arc::new(User::new("Alice"));
//! let bob = Arc::new(User::new("Bob"));
//! mediator.register(alice.clone());
//! mediator.register(bob.clone());
//!
//! alice.send_message("Hello, everyone!").unwrap();
//! assert_eq!(bob.inbox(), vec!["[Bob] Received message: Hello, everyone!"]);
//! assert!(alice.inbox().is_empty());
//! ```

mod config;
mod core;
mod error;
mod participant;

pub use config::{FailurePolicy, MediatorConfig, SenderPolicy};
pub use self::core::{ConcreteMediator, DeliveryFailure, DeliveryReport, Mediator};
pub use error::MediatorError;
pub use participant::{Colleague, Transcript, User, received_line};
