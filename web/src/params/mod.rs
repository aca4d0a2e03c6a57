//! Typed parameters for endpoint inputs that do not map directly onto a domain type.
//!
//! Deserializing into these structs validates the shape of a request before any handler
//! logic runs; anything left to check (empty strings and the like) is done by the handler.

pub(crate) mod tender;
pub(crate) mod ws;
