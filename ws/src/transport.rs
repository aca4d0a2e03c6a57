//! The write half of a client connection, as seen by a [`Session`](crate::session::Session).

use crate::error::Error;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;

/// Exclusively owned write side of a full-duplex client connection.
///
/// A session holds its transport behind its send lock, so implementations are
/// never driven by two writers at once.
#[async_trait]
pub trait Transport: Send {
    /// Write one text frame.
    async fn send_text(&mut self, text: &str) -> Result<(), Error>;

    /// Close the connection. Called at most once per session.
    async fn close(&mut self) -> Result<(), Error>;
}

/// Sink half of an upgraded axum WebSocket.
pub struct WebSocketTransport {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketTransport {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.sink
            .send(Message::Text(text.to_owned().into()))
            .await
            .map_err(Error::transport)
    }

    async fn close(&mut self) -> Result<(), Error> {
        // The peer may already be gone; a failed close frame still needs the sink flushed shut.
        let frame = self.sink.send(Message::Close(None)).await;
        self.sink.close().await.map_err(Error::transport)?;
        frame.map_err(Error::transport)
    }
}
