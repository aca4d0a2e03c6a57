use crate::error::Error;
use crate::transport::Transport;
use log::*;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;

/// Tender identifier a session receives bid notifications for.
pub type TopicId = String;

/// Unique identifier for a session (server-generated, never sent to the client)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One live client connection and the tender it watches.
///
/// The transport sits behind the session's send lock: every write and the final
/// close take that lock, so frames from concurrent broadcasts never interleave on
/// one connection. Once closed, the transport is dropped and the session can never
/// be written to or registered again.
pub struct Session {
    id: SessionId,
    topic: TopicId,
    transport: Mutex<Option<Box<dyn Transport>>>,
    closed: watch::Sender<bool>,
}

impl Session {
    pub fn new<T>(topic: impl Into<TopicId>, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            id: SessionId::new(),
            topic: topic.into(),
            transport: Mutex::new(Some(Box::new(transport))),
            closed: watch::Sender::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the session has been closed, by its own connection or by eviction.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives as long as `self`, so this only returns once the flag flips.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Write one text frame under the send lock.
    ///
    /// `deadline` bounds both waiting for the lock and the write itself.
    pub async fn send_text(&self, text: &str, deadline: Duration) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::closed());
        }

        let write = async {
            let mut transport = self.transport.lock().await;
            match transport.as_mut() {
                Some(transport) => transport.send_text(text).await,
                None => Err(Error::closed()),
            }
        };

        match timeout(deadline, write).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(deadline)),
        }
    }

    /// Close the session and release its transport. Safe to call any number of times.
    pub async fn close(&self, deadline: Duration) {
        self.mark_closed();
        self.release_transport(deadline).await;
    }

    /// Flip the closed flag. Returns `true` only for the call that actually closed it.
    pub(crate) fn mark_closed(&self) -> bool {
        self.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    /// Take the transport out from under the send lock and close it.
    ///
    /// Waiting for the lock is bounded by the in-flight writer's own deadline;
    /// the close handshake is bounded by `deadline`. The transport is dropped either way.
    pub(crate) async fn release_transport(&self, deadline: Duration) {
        let Some(mut transport) = self.transport.lock().await.take() else {
            return;
        };

        match timeout(deadline, transport.close()).await {
            Ok(Ok(())) => trace!("Closed transport for session {}", self.id),
            Ok(Err(e)) => debug!("Transport for session {} closed uncleanly: {e}", self.id),
            Err(_) => warn!(
                "Transport for session {} did not close within {deadline:?}, dropping it",
                self.id
            ),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("closed", &self.is_closed())
            .finish()
    }
}
