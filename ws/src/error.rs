//! Error types for the `ws` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and an error kind enum.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Top-level error type for the real-time layer.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Categories of errors raised while delivering messages to sessions.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The payload could not be encoded. The only error `broadcast` reports.
    Serialization,
    /// The session's transport has already been released.
    Closed,
    /// A write did not complete within the per-write deadline.
    Timeout,
    /// The underlying connection rejected the write.
    Transport,
}

impl Error {
    pub fn closed() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Closed,
        }
    }

    pub fn timeout(deadline: Duration) -> Self {
        Error {
            source: Some(format!("write did not complete within {deadline:?}").into()),
            error_kind: ErrorKind::Timeout,
        }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Transport,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "WebSocket Error: {:?}: {source}", self.error_kind),
            None => write!(f, "WebSocket Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}
