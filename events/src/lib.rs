//! Event system infrastructure for the tendering platform.
//!
//! This crate provides the event system that keeps the bid workflow unaware of
//! infrastructure concerns such as real-time WebSocket notifications.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (domain, ws, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any entity's id field data type.
/// This matches the definition in the domain crate to maintain compatibility.
pub type Id = Uuid;

/// Domain events that represent business-level changes in the system.
/// These events are emitted after a domain operation has been persisted.
///
/// Entity data is carried as `serde_json::Value` to avoid dependencies on
/// the domain crate.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// Emitted when a contractor's bid has been stored against a tender.
    /// Triggers a `new_bid` notification to every WebSocket session watching the tender.
    BidCreated {
        /// Tender the bid was placed on. Used as the notification topic.
        tender_id: Id,
        /// Complete serialized bid (id, price, delivery_time, comments, status, ...).
        bid: Value,
    },
}

impl DomainEvent {
    /// Short name of the event, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::BidCreated { .. } => "bid_created",
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    /// Handlers are called sequentially and own their failures; nothing is
    /// reported back to the publisher.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
