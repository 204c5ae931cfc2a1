//! Participants that communicate only through a mediator

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use eyre::Result;
use tracing::debug;

use super::core::{DeliveryReport, Mediator};
use super::error::MediatorError;

/// An entity that exchanges messages exclusively through a mediator
///
/// The name is the participant's identity: a mediator treats two colleagues
/// with the same name as the same member.
pub trait Colleague: Send + Sync {
    fn name(&self) -> &str;

    /// Handle a message broadcast by another participant
    fn receive(&self, message: &str) -> Result<()>;
}

/// Line recorded when a participant receives a message
pub fn received_line(name: &str, message: &str) -> String {
    format!("[{}] Received message: {}", name, message)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivery log shared by several participants
///
/// Cloning yields another handle to the same log, so lines from different
/// participants appear in the order they were delivered.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, line: impl Into<String>) {
        lock(&self.lines).push(line.into());
    }

    /// Snapshot of every line recorded so far
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.lines).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.lines).is_empty()
    }
}

/// A named participant that records what it receives
pub struct User {
    name: String,
    mediator: RwLock<Option<Weak<dyn Mediator>>>,
    inbox: Mutex<Vec<String>>,
    transcript: Option<Transcript>,
}

impl User {
    /// Create a detached participant with a private inbox
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mediator: RwLock::new(None),
            inbox: Mutex::new(Vec::new()),
            transcript: None,
        }
    }

    /// Create a detached participant that also records into `transcript`
    pub fn with_transcript(name: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            transcript: Some(transcript),
            ..Self::new(name)
        }
    }

    /// Attach this participant to `mediator`, replacing any earlier attachment
    ///
    /// Only a weak reference is kept; the mediator owns its members, not the
    /// other way around.
    pub fn set_mediator(&self, mediator: Weak<dyn Mediator>) {
        debug!(name = %self.name, "User::set_mediator: called");
        *self.mediator.write().unwrap_or_else(PoisonError::into_inner) = Some(mediator);
    }

    pub fn is_attached(&self) -> bool {
        self.mediator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|mediator| mediator.strong_count() > 0)
    }

    /// Broadcast `message` to every other member of the attached mediator
    pub fn send_message(&self, message: &str) -> Result<DeliveryReport, MediatorError> {
        debug!(name = %self.name, %message, "User::send_message: called");
        let weak = self
            .mediator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| MediatorError::NotRegistered {
                name: self.name.clone(),
            })?;

        let mediator = weak.upgrade().ok_or_else(|| MediatorError::MediatorDropped {
            name: self.name.clone(),
        })?;

        mediator.broadcast(self, message)
    }

    /// Every line this participant has received, oldest first
    pub fn inbox(&self) -> Vec<String> {
        lock(&self.inbox).clone()
    }
}

impl Colleague for User {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &str) -> Result<()> {
        let line = received_line(&self.name, message);
        debug!(name = %self.name, %line, "User::receive");
        if let Some(transcript) = &self.transcript {
            transcript.record(line.clone());
        }
        lock(&self.inbox).push(line);
        Ok(())
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("attached", &self.is_attached())
            .finish()
    }
}
