//! Tenders, bids and the rules for accepting a bid.
//!
//! Storage is an in-memory `Store`; notifications leave this crate only as
//! `events::DomainEvent`s handed to an `EventPublisher`.

/// A type alias that represents any entity's id field data type.
pub use events::Id;

pub mod bid;
pub mod error;
pub mod store;
pub mod tender;

pub use store::Store;
