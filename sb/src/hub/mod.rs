//! Hub for participants that run as independent tasks
//!
//! The Hub is the concurrent counterpart of [`crate::mediator`]: one task owns
//! the membership and fans every broadcast out to each other member's channel.
//!
//! - **Join:** register a participant before the hub runs and get its [`HubHandle`]
//! - **Broadcast:** send through a handle to every other member
//! - **Receive:** read envelopes from a handle, or let [`spawn_participant`]
//!   feed them into a [`crate::mediator::Colleague`]
//!
//! A sender's messages reach each recipient in the order they were sent. The
//! interleaving of different senders, and of different recipients' tasks, is
//! unspecified.

mod config;
mod core;
mod error;
mod handle;
mod messages;

pub use config::HubConfig;
pub use error::HubError;
pub use handle::{HubHandle, spawn_participant};
pub use messages::{Envelope, HubMetrics, HubRequest};
pub use self::core::Hub;
