use crate::session::{Session, SessionId, TopicId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::oneshot;

/// A reserved place in one topic's delivery order.
///
/// Reservations are handed out under the registry lock, so their order is the
/// order broadcasts were issued in. A turn starts once the turn reserved before
/// it has been dropped.
pub(crate) struct DeliveryTurn {
    entry: Arc<()>,
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl DeliveryTurn {
    /// Wait for every earlier turn on the same topic entry to finish.
    pub(crate) async fn wait(&mut self) {
        if let Some(previous) = self.previous.take() {
            // The sender is never used; being dropped is the signal.
            let _ = previous.await;
        }
    }
}

struct TopicEntry {
    sessions: HashSet<SessionId>,
    /// Identity of this entry; a recreated entry starts a new delivery order.
    id: Arc<()>,
    /// Completion signal of the most recently reserved turn.
    tail: Option<oneshot::Receiver<()>>,
}

impl TopicEntry {
    fn new() -> Self {
        Self {
            sessions: HashSet::new(),
            id: Arc::new(()),
            tail: None,
        }
    }
}

/// Set of live sessions with a topic index for O(subscribers) fan-out.
///
/// Not synchronized on its own: the [`Manager`](crate::Manager) owns it behind a
/// single lock and is the only thing that mutates it.
#[derive(Default)]
pub struct SessionRegistry {
    /// Primary storage: lookup by session id for registration/cleanup - O(1)
    sessions: HashMap<SessionId, Arc<Session>>,

    /// Secondary index: topic -> subscribed session ids, plus the topic's delivery order
    topic_index: HashMap<TopicId, TopicEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, replacing any entry with the same id.
    /// Returns `false` when the session was already a member.
    pub fn insert(&mut self, session: Arc<Session>) -> bool {
        let id = session.id().clone();
        let topic = session.topic().to_owned();

        let newly_added = self.sessions.insert(id.clone(), session).is_none();

        self.topic_index
            .entry(topic)
            .or_insert_with(TopicEntry::new)
            .sessions
            .insert(id);

        newly_added
    }

    /// Remove a session by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &SessionId) -> Option<Arc<Session>> {
        let session = self.sessions.remove(id)?;

        if let Some(entry) = self.topic_index.get_mut(session.topic()) {
            entry.sessions.remove(id);

            // Clean up empty topic entries
            if entry.sessions.is_empty() {
                self.topic_index.remove(session.topic());
            }
        }

        Some(session)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn topic_count(&self) -> usize {
        self.topic_index.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topic_index
            .get(topic)
            .map_or(0, |entry| entry.sessions.len())
    }

    /// Reserve the next delivery turn for a topic that currently has subscribers.
    pub(crate) fn reserve(&mut self, topic: &str) -> Option<DeliveryTurn> {
        let entry = self.topic_index.get_mut(topic)?;
        let (done, tail) = oneshot::channel();

        Some(DeliveryTurn {
            entry: entry.id.clone(),
            previous: entry.tail.replace(tail),
            _done: done,
        })
    }

    /// Current subscribers of `topic`, provided the topic entry is still the one
    /// `turn` was reserved on. An entry that was emptied and recreated since then
    /// only holds sessions that registered after the broadcast was issued, so it
    /// yields no recipients.
    pub(crate) fn subscribers(&self, topic: &str, turn: &DeliveryTurn) -> Vec<Arc<Session>> {
        match self.topic_index.get(topic) {
            Some(entry) if Arc::ptr_eq(&entry.id, &turn.entry) => entry
                .sessions
                .iter()
                .filter_map(|id| self.sessions.get(id).cloned())
                .collect(),
            _ => Vec::new(),
        }
    }
}
