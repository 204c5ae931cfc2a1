//! Synchronous broadcast mediator

use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, info, warn};

use super::config::{FailurePolicy, MediatorConfig, SenderPolicy};
use super::error::MediatorError;
use super::participant::{Colleague, User};

/// A recipient whose receive handler returned an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub reason: String,
}

/// Outcome of a single broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients that handled the message, in delivery order
    pub delivered: Vec<String>,

    /// Recipients whose handler failed (only populated under `FailurePolicy::Continue`)
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// Number of recipients the message was handed to
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Routes messages between colleagues that never reference each other
pub trait Mediator: Send + Sync {
    /// Add `colleague` to the membership
    ///
    /// Returns `false` without changing anything when a colleague with the same
    /// name is already a member.
    fn add_colleague(&self, colleague: Arc<dyn Colleague>) -> bool;

    /// Deliver `message` to every member except `sender`, in registration order
    fn broadcast(&self, sender: &dyn Colleague, message: &str) -> Result<DeliveryReport, MediatorError>;
}

/// Mediator that delivers inline on the caller's thread
///
/// Broadcasts iterate a snapshot of the membership taken under a read lock,
/// so a receive handler may send or register without deadlocking. Such nested
/// registrations only affect later broadcasts.
pub struct ConcreteMediator {
    config: MediatorConfig,
    colleagues: RwLock<Vec<Arc<dyn Colleague>>>,
}

impl ConcreteMediator {
    pub fn new(config: MediatorConfig) -> Self {
        debug!(?config, "ConcreteMediator::new: called");
        Self {
            config,
            colleagues: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    /// Add `user` and attach this mediator to it
    ///
    /// The user is only attached when it was newly added, so a different
    /// participant reusing a member's name stays detached.
    pub fn register(self: &Arc<Self>, user: Arc<User>) -> bool {
        let added = self.add_colleague(user.clone());
        if added {
            let mediator: Arc<dyn Mediator> = self.clone();
            user.set_mediator(Arc::downgrade(&mediator));
        }
        added
    }

    /// A weak handle suitable for [`User::set_mediator`]
    pub fn downgrade(self: &Arc<Self>) -> Weak<dyn Mediator> {
        let mediator: Arc<dyn Mediator> = self.clone();
        Arc::downgrade(&mediator)
    }

    /// Member names in registration order
    pub fn members(&self) -> Vec<String> {
        self.snapshot().iter().map(|c| c.name().to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().iter().any(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.colleagues.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn Colleague>> {
        self.colleagues.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for ConcreteMediator {
    fn default() -> Self {
        Self::new(MediatorConfig::default())
    }
}

impl Mediator for ConcreteMediator {
    fn add_colleague(&self, colleague: Arc<dyn Colleague>) -> bool {
        let mut colleagues = self.colleagues.write().unwrap_or_else(PoisonError::into_inner);
        if colleagues.iter().any(|c| c.name() == colleague.name()) {
            debug!(name = %colleague.name(), "ConcreteMediator::add_colleague: already a member");
            return false;
        }

        info!(name = %colleague.name(), position = colleagues.len(), "Colleague registered");
        colleagues.push(colleague);
        true
    }

    fn broadcast(&self, sender: &dyn Colleague, message: &str) -> Result<DeliveryReport, MediatorError> {
        let from = sender.name();
        debug!(%from, %message, "ConcreteMediator::broadcast: called");

        let members = self.snapshot();
        if self.config.sender_policy == SenderPolicy::Strict && !members.iter().any(|c| c.name() == from) {
            warn!(%from, "Rejected broadcast from non-member");
            return Err(MediatorError::UnknownSender { name: from.to_string() });
        }

        let mut report = DeliveryReport::default();
        for recipient in members.iter().filter(|c| c.name() != from) {
            match recipient.receive(message) {
                Ok(()) => report.delivered.push(recipient.name().to_string()),
                Err(e) => {
                    let reason = format!("{:#}", e);
                    match self.config.failure_policy {
                        FailurePolicy::Propagate => {
                            return Err(MediatorError::DeliveryFailed {
                                recipient: recipient.name().to_string(),
                                reason,
                            });
                        }
                        FailurePolicy::Continue => {
                            warn!(%from, recipient = %recipient.name(), %reason, "Delivery failed");
                            report.failed.push(DeliveryFailure {
                                recipient: recipient.name().to_string(),
                                reason,
                            });
                        }
                    }
                }
            }
        }

        debug!(%from, delivered = report.delivered.len(), failed = report.failed.len(), "Broadcast complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediator::Transcript;
    use eyre::eyre;
    use proptest::prelude::*;
    use std::sync::Mutex;

    /// Colleague that always fails to receive
    struct Broken {
        name: String,
    }

    impl Colleague for Broken {
        fn name(&self) -> &str {
            &self.name
        }

        fn receive(&self, _message: &str) -> eyre::Result<()> {
            Err(eyre!("{} has no inbox", self.name))
        }
    }

    /// Colleague that replies to the first message it sees
    struct Echo {
        user: Arc<User>,
        replied: Mutex<bool>,
    }

    impl Colleague for Echo {
        fn name(&self) -> &str {
            self.user.name()
        }

        fn receive(&self, message: &str) -> eyre::Result<()> {
            self.user.receive(message)?;
            let mut replied = self.replied.lock().unwrap();
            if !*replied {
                *replied = true;
                self.user.send_message(&format!("re: {}", message))?;
            }
            Ok(())
        }
    }

    fn setup(names: &[&str]) -> (Arc<ConcreteMediator>, Vec<Arc<User>>, Transcript) {
        let mediator = Arc::new(ConcreteMediator::default());
        let transcript = Transcript::new();
        let users: Vec<Arc<User>> = names
            .iter()
            .map(|name| Arc::new(User::with_transcript(*name, transcript.clone())))
            .collect();
        for user in &users {
            assert!(mediator.register(user.clone()));
        }
        (mediator, users, transcript)
    }

    #[test]
    fn test_reference_scenario() {
        let (_mediator, users, transcript) = setup(&["Alice", "Bob", "Charlie"]);
        let (alice, bob, charlie) = (&users[0], &users[1], &users[2]);

        alice.send_message("Hello, everyone!").unwrap();
        bob.send_message("Hi, there!").unwrap();
        charlie.send_message("Hey, guys!").unwrap();

        assert_eq!(
            transcript.lines(),
            vec![
                "[Bob] Received message: Hello, everyone!",
                "[Charlie] Received message: Hello, everyone!",
                "[Alice] Received message: Hi, there!",
                "[Charlie] Received message: Hi, there!",
                "[Alice] Received message: Hey, guys!",
                "[Bob] Received message: Hey, guys!",
            ]
        );
        assert_eq!(alice.inbox().len(), 2);
    }

    #[test]
    fn test_sender_excluded() {
        let (_mediator, users, _) = setup(&["Alice", "Bob", "Charlie"]);

        let report = users[0].send_message("Hello, everyone!").unwrap();
        assert_eq!(report.delivered, vec!["Bob", "Charlie"]);
        assert!(users[0].inbox().is_empty());
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let (mediator, users, _) = setup(&["Alice", "Bob"]);

        assert!(!mediator.register(users[1].clone()));
        assert!(!mediator.add_colleague(users[0].clone()));
        assert_eq!(mediator.members(), vec!["Alice", "Bob"]);

        let report = users[0].send_message("once").unwrap();
        assert_eq!(report.delivered, vec!["Bob"]);
        assert_eq!(users[1].inbox().len(), 1);
    }

    #[test]
    fn test_same_name_impostor_stays_detached() {
        let (mediator, _users, _) = setup(&["Alice", "Bob"]);

        let impostor = Arc::new(User::new("Bob"));
        assert!(!mediator.register(impostor.clone()));
        assert!(!impostor.is_attached());
        assert!(matches!(
            impostor.send_message("hi"),
            Err(MediatorError::NotRegistered { .. })
        ));
    }

    #[test]
    fn test_two_step_attachment() {
        let mediator = Arc::new(ConcreteMediator::default());
        let alice = Arc::new(User::new("Alice"));
        let bob = Arc::new(User::new("Bob"));

        mediator.add_colleague(alice.clone());
        mediator.add_colleague(bob.clone());
        alice.set_mediator(mediator.downgrade());

        alice.send_message("ping").unwrap();
        assert_eq!(bob.inbox(), vec!["[Bob] Received message: ping"]);
        assert!(matches!(bob.send_message("pong"), Err(MediatorError::NotRegistered { .. })));
    }

    #[test]
    fn test_strict_policy_rejects_non_member() {
        let (mediator, users, _) = setup(&["Alice", "Bob"]);

        let outsider = User::new("Mallory");
        let err = mediator.broadcast(&outsider, "let me in").unwrap_err();
        assert_eq!(
            err,
            MediatorError::UnknownSender {
                name: "Mallory".to_string()
            }
        );
        assert!(users.iter().all(|u| u.inbox().is_empty()));
    }

    #[test]
    fn test_lenient_policy_reaches_everyone() {
        let config = MediatorConfig::default().with_sender_policy(SenderPolicy::Lenient);
        let mediator = Arc::new(ConcreteMediator::new(config));
        let alice = Arc::new(User::new("Alice"));
        let bob = Arc::new(User::new("Bob"));
        mediator.register(alice.clone());
        mediator.register(bob.clone());

        let outsider = User::new("Mallory");
        let report = mediator.broadcast(&outsider, "announcement").unwrap();
        assert_eq!(report.delivered, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_continue_policy_records_failure() {
        let (mediator, users, _) = setup(&["Alice", "Bob"]);
        mediator.add_colleague(Arc::new(Broken {
            name: "Broken".to_string(),
        }));
        let charlie = Arc::new(User::new("Charlie"));
        mediator.register(charlie.clone());

        let report = users[0].send_message("status?").unwrap();
        assert_eq!(report.delivered, vec!["Bob", "Charlie"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, "Broken");
        assert!(report.failed[0].reason.contains("no inbox"));
        assert_eq!(report.attempted(), 3);
    }

    #[test]
    fn test_propagate_policy_stops_at_failure() {
        let config = MediatorConfig::default().with_failure_policy(FailurePolicy::Propagate);
        let mediator = Arc::new(ConcreteMediator::new(config));
        let alice = Arc::new(User::new("Alice"));
        let charlie = Arc::new(User::new("Charlie"));
        mediator.register(alice.clone());
        mediator.add_colleague(Arc::new(Broken {
            name: "Broken".to_string(),
        }));
        mediator.register(charlie.clone());

        let err = alice.send_message("status?").unwrap_err();
        assert!(matches!(err, MediatorError::DeliveryFailed { ref recipient, .. } if recipient == "Broken"));
        assert!(charlie.inbox().is_empty());
    }

    #[test]
    fn test_send_after_mediator_dropped() {
        let mediator = Arc::new(ConcreteMediator::default());
        let alice = Arc::new(User::new("Alice"));
        mediator.register(alice.clone());
        drop(mediator);

        assert_eq!(
            alice.send_message("hello?").unwrap_err(),
            MediatorError::MediatorDropped {
                name: "Alice".to_string()
            }
        );
    }

    #[test]
    fn test_nested_send_from_handler() {
        let mediator = Arc::new(ConcreteMediator::default());
        let transcript = Transcript::new();
        let alice = Arc::new(User::with_transcript("Alice", transcript.clone()));
        let bob = Arc::new(User::with_transcript("Bob", transcript.clone()));
        mediator.register(alice.clone());
        mediator.register(bob.clone());

        // Carol replies once to the first message it receives
        let carol = Arc::new(User::with_transcript("Carol", transcript.clone()));
        carol.set_mediator(mediator.downgrade());
        mediator.add_colleague(Arc::new(Echo {
            user: carol.clone(),
            replied: Mutex::new(false),
        }));

        alice.send_message("ping").unwrap();

        assert_eq!(
            transcript.lines(),
            vec![
                "[Bob] Received message: ping",
                "[Carol] Received message: ping",
                "[Alice] Received message: re: ping",
                "[Bob] Received message: re: ping",
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_membership_has_no_duplicates(adds in proptest::collection::vec(0usize..6, 0..40)) {
            let mediator = ConcreteMediator::default();
            let pool: Vec<Arc<User>> = (0..6).map(|i| Arc::new(User::new(format!("p{}", i)))).collect();

            let mut expected: Vec<String> = Vec::new();
            for i in adds {
                let name = format!("p{}", i);
                let added = mediator.add_colleague(pool[i].clone());
                prop_assert_eq!(added, !expected.contains(&name));
                if added {
                    expected.push(name);
                }
            }

            prop_assert_eq!(mediator.members(), expected);
        }

        #[test]
        fn prop_broadcast_reaches_all_but_sender(n in 1usize..8, sender_seed in any::<usize>()) {
            let names: Vec<String> = (0..n).map(|i| format!("member-{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let (_mediator, users, transcript) = setup(&refs);
            let sender = sender_seed % n;

            let report = users[sender].send_message("fan-out").unwrap();

            let expected: Vec<String> = names.iter().enumerate().filter(|(i, _)| *i != sender).map(|(_, n)| n.clone()).collect();
            prop_assert_eq!(report.delivered.len(), n - 1);
            prop_assert_eq!(&report.delivered, &expected);
            prop_assert!(users[sender].inbox().is_empty());
            prop_assert_eq!(transcript.len(), n - 1);
        }
    }
}
