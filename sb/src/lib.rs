//! Switchboard - in-process mediator for broadcast between participants
//!
//! Participants never reference one another. They register with a mediator
//! and send through it; every message reaches every *other* member exactly
//! once, in registration order.
//!
//! # Modules
//!
//! - [`mediator`] - synchronous mediator, the `Colleague` trait and `User`
//! - [`hub`] - the same fan-out with each participant on its own task
//! - [`script`] - wiring participants through a `keyreg::Registry` and running message scripts
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod hub;
pub mod mediator;
pub mod script;

// Re-export commonly used types
pub use config::Config;
pub use hub::{Envelope, Hub, HubConfig, HubError, HubHandle, HubMetrics, spawn_participant};
pub use mediator::{
    Colleague, ConcreteMediator, DeliveryReport, FailurePolicy, Mediator, MediatorConfig, MediatorError, SenderPolicy,
    Transcript, User,
};
pub use script::{Script, ScriptMessage};
