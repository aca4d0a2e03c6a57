use crate::error::Error;
use crate::message::{EventType, Message};
use crate::registry::{DeliveryTurn, SessionRegistry};
use crate::session::{Session, SessionId};
use futures::future::join_all;
use log::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Per-write deadline used when none is configured.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sessions subscribed to the topic when delivery started.
    pub recipients: usize,
    /// Sessions that accepted the frame.
    pub delivered: usize,
    /// Sessions removed because their write failed or timed out.
    pub evicted: usize,
}

/// Owns the live session set and fans bid notifications out to it.
///
/// Every structural change (register, unregister, eviction) takes the registry's
/// write lock. A broadcast reserves its turn in the topic's delivery order, waits
/// for the broadcasts issued before it, then reads the topic's subscribers and
/// writes to them in parallel, each under its own send lock and bounded by the
/// write timeout. No registry lock is held while writing.
pub struct Manager {
    registry: RwLock<SessionRegistry>,
    write_timeout: Duration,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_write_timeout(DEFAULT_WRITE_TIMEOUT)
    }

    pub fn with_write_timeout(write_timeout: Duration) -> Self {
        Self {
            registry: RwLock::new(SessionRegistry::new()),
            write_timeout,
        }
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Add a session to the live set. A session that has already been closed is ignored.
    pub async fn register(&self, session: Arc<Session>) {
        let mut registry = self.registry.write().await;

        // Checked under the lock: `unregister` flips the flag before it takes the lock,
        // so a racing unregister either sees this insert or prevents it.
        if session.is_closed() {
            debug!(
                "Ignoring registration of closed session {} for tender {}",
                session.id(),
                session.topic()
            );
            return;
        }

        let (id, topic) = (session.id().clone(), session.topic().to_owned());
        if registry.insert(session) {
            info!(
                "Registered WebSocket session {id} for tender {topic} ({} sessions across {} tenders)",
                registry.len(),
                registry.topic_count()
            );
        } else {
            debug!("Session {id} was already registered");
        }
    }

    /// Remove a session from the live set and close its transport.
    ///
    /// Safe to call more than once and for sessions that were never registered or
    /// were already evicted by a failed broadcast.
    pub async fn unregister(&self, session: &Session) {
        session.mark_closed();

        {
            let mut registry = self.registry.write().await;
            if registry.remove(session.id()).is_some() {
                info!(
                    "Unregistered WebSocket session {} for tender {}",
                    session.id(),
                    session.topic()
                );
                if registry.is_empty() {
                    debug!("No WebSocket sessions remain");
                }
            } else {
                debug!("Session {} was not registered", session.id());
            }
        }

        session.release_transport(self.write_timeout).await;
    }

    /// Queue a typed event for the sessions subscribed to the message's topic and
    /// deliver it on a background task.
    ///
    /// Returns once the message has its place in the topic's delivery order, so
    /// messages dispatched one after another reach each subscriber in that order.
    /// The caller never waits on a subscriber's write. `None` means nobody is
    /// subscribed to the topic and nothing was queued.
    pub async fn dispatch_message(
        self: &Arc<Self>,
        message: Message,
    ) -> Result<Option<JoinHandle<BroadcastReport>>, Error> {
        let text = serde_json::to_string(&message.event)?;

        let Some(turn) = self.registry.write().await.reserve(&message.topic) else {
            trace!("No sessions subscribed to tender {}", message.topic);
            return Ok(None);
        };

        let manager = self.clone();
        Ok(Some(tokio::spawn(async move {
            let report = manager.deliver(&message.topic, &text, turn).await;
            debug!(
                "Sent {} event to tender {}: {report:?}",
                message.event.event_type(),
                message.topic
            );
            report
        })))
    }

    /// Serialize `payload` once and write it to every session subscribed to `topic`,
    /// waiting for the delivery to finish.
    ///
    /// Fails only if serialization fails. Sessions whose write fails or exceeds the
    /// write timeout are evicted; the rest of the fan-out is unaffected. Recipients
    /// are the topic's members once this broadcast's turn comes. If every member
    /// left and the topic was re-subscribed in the meantime, the newcomers joined
    /// after the broadcast was issued and do not receive it.
    pub async fn broadcast<T>(&self, topic: &str, payload: &T) -> Result<BroadcastReport, Error>
    where
        T: Serialize + ?Sized,
    {
        let text = serde_json::to_string(payload)?;

        let Some(turn) = self.registry.write().await.reserve(topic) else {
            trace!("No sessions subscribed to tender {topic}");
            return Ok(BroadcastReport::default());
        };

        Ok(self.deliver(topic, &text, turn).await)
    }

    async fn deliver(&self, topic: &str, text: &str, mut turn: DeliveryTurn) -> BroadcastReport {
        turn.wait().await;
        let recipients = self.registry.read().await.subscribers(topic, &turn);

        let outcomes = join_all(recipients.iter().map(|session| async move {
            (session, session.send_text(text, self.write_timeout).await)
        }))
        .await;

        let mut report = BroadcastReport {
            recipients: recipients.len(),
            ..Default::default()
        };
        let mut failed = Vec::new();
        for (session, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        "Failed to send to session {} for tender {topic}: {e}. Evicting session.",
                        session.id()
                    );
                    failed.push(session.clone());
                }
            }
        }

        self.remove_failed(&failed).await;
        drop(turn);

        report.evicted = failed.len();
        join_all(
            failed
                .iter()
                .map(|session| session.release_transport(self.write_timeout)),
        )
        .await;

        report
    }

    async fn remove_failed(&self, failed: &[Arc<Session>]) {
        if failed.is_empty() {
            return;
        }

        let mut registry = self.registry.write().await;
        for session in failed {
            session.mark_closed();
            registry.remove(session.id());
        }
    }

    pub async fn is_registered(&self, id: &SessionId) -> bool {
        self.registry.read().await.contains(id)
    }

    pub async fn session_count(&self) -> usize {
        self.registry.read().await.len()
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.read().await.subscriber_count(topic)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
