//! HubHandle - participant interface to a running Hub

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::HubError;
use super::messages::{Envelope, HubMetrics, HubRequest};
use crate::mediator::Colleague;

/// Handle for one participant to send through and receive from the Hub
///
/// This handle is cloneable. Clones share the same receiver, so each envelope
/// is received by exactly one of them.
#[derive(Clone)]
pub struct HubHandle {
    /// Sender to the Hub task
    tx: mpsc::Sender<HubRequest>,

    /// Receiver for envelopes routed to this participant
    /// This is None for sender-only handles
    rx: Option<Arc<Mutex<mpsc::Receiver<Envelope>>>>,

    /// The participant name this handle sends as
    name: String,
}

impl HubHandle {
    pub(crate) fn new(tx: mpsc::Sender<HubRequest>, rx: mpsc::Receiver<Envelope>, name: String) -> Self {
        debug!(%name, "HubHandle::new: called");
        Self {
            tx,
            rx: Some(Arc::new(Mutex::new(rx))),
            name,
        }
    }

    /// Create a handle without a receiver (for sending only)
    pub(crate) fn sender_only(tx: mpsc::Sender<HubRequest>, name: String) -> Self {
        debug!(%name, "HubHandle::sender_only: called");
        Self { tx, rx: None, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Broadcast `body` to every other member
    ///
    /// Waits until the hub has queued the message for every recipient and
    /// returns how many recipients it reached. Because each call waits, the
    /// messages of one handle arrive in the order they were sent.
    ///
    /// Do not call this from the task that drains this participant's own
    /// inbox. While the call waits, that inbox is not drained; once it is
    /// full the hub blocks delivering to it and never replies.
    pub async fn send_message(&self, body: &str) -> Result<usize, HubError> {
        debug!(name = %self.name, %body, "HubHandle::send_message: called");
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(HubRequest::Broadcast {
                envelope: Envelope::new(&self.name, body),
                reply_tx,
            })
            .await
            .map_err(|_| HubError::ChannelClosed)?;

        reply_rx.await.map_err(|_| HubError::ShutDown)?
    }

    /// Receive the next envelope
    ///
    /// Returns None once the hub has shut down, for sender-only handles, and
    /// for handles whose join was ignored as a duplicate.
    pub async fn recv(&self) -> Option<Envelope> {
        debug!(name = %self.name, "HubHandle::recv: called");
        let rx = self.rx.as_ref()?;
        let mut rx_guard = rx.lock().await;
        rx_guard.recv().await
    }

    /// Try to receive an envelope without waiting
    pub fn try_recv(&self) -> Option<Envelope> {
        let rx = self.rx.as_ref()?;
        let mut rx_guard = rx.try_lock().ok()?;
        rx_guard.try_recv().ok()
    }

    /// Get current hub metrics
    pub async fn metrics(&self) -> Result<HubMetrics, HubError> {
        debug!(name = %self.name, "HubHandle::metrics: called");
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(HubRequest::GetMetrics { reply_tx })
            .await
            .map_err(|_| HubError::ChannelClosed)?;

        reply_rx.await.map_err(|_| HubError::ShutDown)
    }
}

/// Feed every envelope routed to `handle` into `colleague`
///
/// The task ends when the hub shuts down and returns the number of envelopes
/// the colleague handled successfully. Receive failures are logged and do not
/// stop the task.
pub fn spawn_participant(handle: HubHandle, colleague: Arc<dyn Colleague>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut handled = 0;
        while let Some(envelope) = handle.recv().await {
            match colleague.receive(&envelope.body) {
                Ok(()) => handled += 1,
                Err(e) => warn!(
                    name = %colleague.name(),
                    from = %envelope.from,
                    id = %envelope.id,
                    "Receive failed: {:#}",
                    e
                ),
            }
        }
        debug!(name = %colleague.name(), handled, "Participant task finished");
        handled
    })
}
