//! Real-time bid notifications over WebSocket.
//!
//! Clients open a WebSocket for one tender and receive a `new_bid` message for
//! every bid placed on it afterwards.
//!
//! # Architecture
//!
//! - **Session**: one upgraded connection plus the tender (topic) it watches.
//!   The connection's write half sits behind a per-session send lock.
//! - **SessionRegistry**: the live session set with a topic index, so a
//!   broadcast touches only the tender's subscribers.
//! - **Manager**: the coordinator. Owns the registry behind a single lock and is
//!   the only thing that mutates it. Broadcasts to one tender are applied in the
//!   order they were issued; broadcasts to different tenders run in parallel.
//! - **Ephemeral messages**: nothing is persisted. A client that is not
//!   connected misses the event and re-reads bids over HTTP.
//!
//! # Message Flow
//!
//! 1. Frontend opens `/ws?tender_id=<id>`
//! 2. The web layer upgrades, wraps the socket's sink in a `WebSocketTransport`
//!    and registers a `Session` with the `Manager`
//! 3. A contractor submits a bid; once it is stored the domain layer publishes
//!    `DomainEvent::BidCreated`
//! 4. `WsDomainEventHandler` turns it into `Event::NewBid` and calls
//!    `Manager::dispatch_message`, which serializes once, reserves the message's
//!    place in the tender's delivery order and returns. A background task then
//!    writes the frame to every subscriber under its send lock, bounded by the
//!    write timeout, so the bidder's HTTP response never waits on a socket
//! 5. Any session whose write fails or times out is evicted and its transport
//!    closed; the others are unaffected
//! 6. When the client disconnects, the web layer's read loop ends and it calls
//!    `Manager::unregister`
//!
//! # Example: Sending an event
//!
//! ```rust,ignore
//! use ws::message::{Event as WsEvent, Message as WsMessage};
//!
//! app_state.ws_manager.dispatch_message(WsMessage {
//!     event: WsEvent::NewBid { bid: serde_json::to_value(&bid)? },
//!     topic: bid.tender_id.to_string(),
//! }).await?;
//! ```
//!
//! # Modules
//!
//! - `session`: Session, SessionId and the per-session send lock
//! - `registry`: SessionRegistry with the topic index
//! - `manager`: register / unregister / broadcast / dispatch
//! - `message`: wire event types
//! - `transport`: the Transport seam and its axum WebSocket implementation

pub mod domain_event_handler;
pub mod error;
pub mod manager;
pub mod message;
pub mod registry;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::{BroadcastReport, Manager};
pub use session::{Session, SessionId, TopicId};
pub use transport::{Transport, WebSocketTransport};
