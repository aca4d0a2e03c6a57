//! In-memory transports for exercising sessions and the manager without sockets.

use crate::error::Error;
use crate::transport::Transport;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn broken_pipe() -> Error {
    Error::transport(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"))
}

/// Observes how many times a transport was closed.
#[derive(Clone, Default)]
pub(crate) struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub(crate) fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }

    pub(crate) fn close_calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Forwards every frame to a channel, like a healthy client.
pub(crate) struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
    closes: CloseCounter,
}

impl ChannelTransport {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<String>, CloseCounter) {
        let (tx, rx) = mpsc::unbounded_channel();
        let closes = CloseCounter::default();
        (
            Self {
                tx,
                closes: closes.clone(),
            },
            rx,
            closes,
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.tx.send(text.to_owned()).map_err(|_| broken_pipe())
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.closes.record();
        Ok(())
    }
}

/// A connection that was torn down out-of-band: every write fails.
pub(crate) struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn send_text(&mut self, _text: &str) -> Result<(), Error> {
        Err(broken_pipe())
    }

    async fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// A consumer that never reads: writes block forever.
pub(crate) struct StalledTransport {
    closes: CloseCounter,
}

impl StalledTransport {
    pub(crate) fn new() -> (Self, CloseCounter) {
        let closes = CloseCounter::default();
        (
            Self {
                closes: closes.clone(),
            },
            closes,
        )
    }
}

#[async_trait]
impl Transport for StalledTransport {
    async fn send_text(&mut self, _text: &str) -> Result<(), Error> {
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.closes.record();
        Ok(())
    }
}

/// A slow but healthy client: each write takes `delay` before it is forwarded.
pub(crate) struct DelayedTransport {
    inner: ChannelTransport,
    delay: Duration,
}

impl DelayedTransport {
    pub(crate) fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>, CloseCounter) {
        let (inner, rx, closes) = ChannelTransport::new();
        (Self { inner, delay }, rx, closes)
    }
}

#[async_trait]
impl Transport for DelayedTransport {
    async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        tokio::time::sleep(self.delay).await;
        self.inner.send_text(text).await
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.inner.close().await
    }
}
