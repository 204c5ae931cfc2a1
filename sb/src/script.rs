//! Message scripts: who takes part and who says what, in order
//!
//! A script is run either through a [`ConcreteMediator`] (synchronous, one
//! global delivery order) or through a [`Hub`] (one task per participant,
//! per-recipient order only). In the synchronous case every object is wired
//! through a [`Registry`] and senders are resolved by name, never by holding
//! references to each other.

use std::str::FromStr;
use std::sync::Arc;

use eyre::{Context, Result, eyre};
use keyreg::Registry;
use tracing::{debug, info};

use crate::hub::{Hub, HubConfig, HubHandle, HubRequest, spawn_participant};
use crate::mediator::{Colleague, ConcreteMediator, MediatorConfig, Transcript, User};

/// Registry key of the mediator
pub const MEDIATOR_KEY: &str = "mediator";

/// Registry key of the transcript shared by all participants
pub const TRANSCRIPT_KEY: &str = "transcript";

/// Registry key of the participant called `name`
pub fn participant_key(name: &str) -> String {
    format!("participant/{}", name)
}

/// One scripted broadcast, written on the command line as `FROM=TEXT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMessage {
    pub from: String,
    pub body: String,
}

impl ScriptMessage {
    pub fn new(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
        }
    }
}

impl FromStr for ScriptMessage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((from, body)) if !from.trim().is_empty() => Ok(Self::new(from.trim(), body)),
            _ => Err(format!("Invalid message: {}. Use: FROM=TEXT", s)),
        }
    }
}

/// Participants in registration order plus the messages to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub participants: Vec<String>,
    pub messages: Vec<ScriptMessage>,
}

impl Script {
    pub fn new(participants: Vec<String>, messages: Vec<ScriptMessage>) -> Self {
        Self { participants, messages }
    }

    /// Alice, Bob and Charlie each greet the others once
    pub fn reference() -> Self {
        Self::new(
            vec!["Alice".to_string(), "Bob".to_string(), "Charlie".to_string()],
            vec![
                ScriptMessage::new("Alice", "Hello, everyone!"),
                ScriptMessage::new("Bob", "Hi, there!"),
                ScriptMessage::new("Charlie", "Hey, guys!"),
            ],
        )
    }

    /// Participant names with repeats removed, first occurrence wins
    pub fn unique_participants(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in &self.participants {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }
}

/// Build a mediator and its participants and publish them in a registry
pub fn wire(script: &Script, config: &MediatorConfig) -> Registry {
    let mediator = Arc::new(ConcreteMediator::new(config.clone()));
    let transcript = Arc::new(Transcript::new());
    let mut registry = Registry::new();

    for name in script.unique_participants() {
        let user = Arc::new(User::with_transcript(name, Transcript::clone(&transcript)));
        mediator.register(user.clone());
        registry.register(participant_key(name), user);
    }

    registry.register(MEDIATOR_KEY, mediator);
    registry.register(TRANSCRIPT_KEY, transcript);
    debug!(entries = registry.len(), "wire: registry built");
    registry
}

/// Send every scripted message through the mediator wired into `registry`
///
/// Returns every received line in global delivery order.
pub fn run_sync(script: &Script, registry: &Registry) -> Result<Vec<String>> {
    for message in &script.messages {
        let sender = registry
            .get::<User>(&participant_key(&message.from))?
            .ok_or_else(|| eyre!("Unknown participant: {}", message.from))?;

        let report = sender
            .send_message(&message.body)
            .context(format!("Failed to send as {}", message.from))?;
        info!(from = %message.from, delivered = report.delivered.len(), "Message sent");
    }

    let transcript = registry
        .get::<Transcript>(TRANSCRIPT_KEY)?
        .ok_or_else(|| eyre!("Registry has no transcript"))?;
    Ok(transcript.lines())
}

/// Run the script with every participant on its own task
///
/// Returns each participant's received lines, participants in registration
/// order. Order within one participant follows send order.
pub async fn run_concurrent(script: &Script, config: &HubConfig) -> Result<Vec<(String, Vec<String>)>> {
    config.validate()?;
    let mut hub = Hub::new(config.clone());
    let control = hub.sender();

    let mut handles = Vec::new();
    let mut users = Vec::new();
    let mut tasks = Vec::new();
    for name in script.unique_participants() {
        let handle = hub.join(name);
        let user = Arc::new(User::new(name));
        tasks.push(spawn_participant(handle.clone(), user.clone()));
        handles.push(handle);
        users.push(user);
    }

    let hub_task = tokio::spawn(hub.run());

    let result = send_all(script, &handles).await;

    control
        .send(HubRequest::Shutdown)
        .await
        .map_err(|_| eyre!("Hub stopped before shutdown"))?;
    hub_task.await.context("Hub task panicked")?;
    for task in tasks {
        task.await.context("Participant task panicked")?;
    }
    result?;

    Ok(users
        .iter()
        .map(|user| (user.name().to_string(), user.inbox()))
        .collect())
}

async fn send_all(script: &Script, handles: &[HubHandle]) -> Result<()> {
    for message in &script.messages {
        let handle = handles
            .iter()
            .find(|h| h.name() == message.from)
            .ok_or_else(|| eyre!("Unknown participant: {}", message.from))?;

        let delivered = handle
            .send_message(&message.body)
            .await
            .context(format!("Failed to send as {}", message.from))?;
        info!(from = %message.from, delivered, "Message sent");
    }
    Ok(())
}
