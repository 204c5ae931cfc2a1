//! Main Hub task implementation

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::HubConfig;
use super::error::HubError;
use super::handle::HubHandle;
use super::messages::{Envelope, HubMetrics, HubRequest};
use crate::mediator::SenderPolicy;

/// A registered participant's inbox
struct Member {
    name: String,
    tx: mpsc::Sender<Envelope>,
}

/// The Hub fans broadcasts out to participants running as their own tasks
///
/// Participants join before [`Hub::run`] takes the hub; after that the
/// membership is fixed and broadcasts are processed one at a time by the hub
/// task. Recipients are served in registration order; a recipient whose inbox
/// is full holds up the broadcast until it has room.
pub struct Hub {
    config: HubConfig,
    tx: mpsc::Sender<HubRequest>,
    rx: mpsc::Receiver<HubRequest>,
    members: Vec<Member>,
}

impl Hub {
    /// Create a new Hub with the given configuration
    pub fn new(config: HubConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        Self {
            config,
            tx,
            rx,
            members: Vec::new(),
        }
    }

    /// Get a sender for controlling the hub after [`Hub::run`] has taken it
    pub fn sender(&self) -> mpsc::Sender<HubRequest> {
        self.tx.clone()
    }

    /// Register a participant and return its handle
    ///
    /// Membership is fixed once [`Hub::run`] takes the hub, so joining never
    /// waits on the request channel. Joining under a name that is already a
    /// member leaves the membership unchanged; the returned handle can still
    /// send as that name, but its receiver is closed and never yields an
    /// envelope.
    pub fn join(&mut self, name: &str) -> HubHandle {
        debug!(%name, "Hub::join: called");
        let (env_tx, env_rx) = mpsc::channel(self.config.participant_channel_buffer);

        if self.members.iter().any(|m| m.name == name) {
            debug!(%name, "Ignoring duplicate join");
        } else {
            info!(%name, position = self.members.len(), "Participant joined");
            self.members.push(Member {
                name: name.to_string(),
                tx: env_tx,
            });
        }

        HubHandle::new(self.tx.clone(), env_rx, name.to_string())
    }

    /// A handle that can send as `name` without joining
    ///
    /// Under [`SenderPolicy::Strict`] its broadcasts are rejected unless some
    /// member already uses that name.
    pub fn announcer(&self, name: &str) -> HubHandle {
        HubHandle::sender_only(self.tx.clone(), name.to_string())
    }

    /// Request shutdown of the Hub
    pub async fn shutdown(&self) -> Result<(), HubError> {
        self.tx
            .send(HubRequest::Shutdown)
            .await
            .map_err(|_| HubError::ChannelClosed)
    }

    /// Run the Hub task
    ///
    /// This consumes the Hub and runs until shutdown is requested. Dropping
    /// the members on exit closes every participant's receiver.
    pub async fn run(self) {
        let Hub {
            config,
            tx,
            mut rx,
            members,
        } = self;
        // Only external senders keep the hub alive
        drop(tx);

        let mut metrics = HubMetrics {
            members: members.len(),
            ..Default::default()
        };

        info!(members = members.len(), "Hub started");

        while let Some(req) = rx.recv().await {
            metrics.requests_received += 1;

            match req {
                HubRequest::Broadcast { envelope, reply_tx } => {
                    let is_member = members.iter().any(|m| m.name == envelope.from);
                    if config.sender_policy == SenderPolicy::Strict && !is_member {
                        warn!(from = %envelope.from, "Rejected broadcast from non-member");
                        metrics.rejected_senders += 1;
                        let _ = reply_tx.send(Err(HubError::UnknownSender { name: envelope.from }));
                        continue;
                    }

                    debug!(id = %envelope.id, from = %envelope.from, "Broadcasting");

                    let mut delivered = 0;
                    for member in members.iter().filter(|m| m.name != envelope.from) {
                        if member.tx.send(envelope.clone()).await.is_ok() {
                            delivered += 1;
                            metrics.messages_delivered += 1;
                        } else {
                            warn!(recipient = %member.name, id = %envelope.id, "Recipient channel closed");
                            metrics.delivery_failures += 1;
                        }
                    }

                    metrics.broadcasts_routed += 1;
                    let _ = reply_tx.send(Ok(delivered));
                }

                HubRequest::GetMetrics { reply_tx } => {
                    let _ = reply_tx.send(metrics.clone());
                }

                HubRequest::Shutdown => {
                    info!("Hub shutting down");
                    break;
                }
            }
        }

        info!(members = members.len(), "Hub stopped");
    }
}
