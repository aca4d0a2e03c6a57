//! WebSocket HTTP handler for the web layer.
//!
//! Only the upgrade and read loop live here. Sessions, the registry and broadcast
//! fan-out belong to the `ws` crate, which the event pipeline also depends on.

pub(crate) mod handler;
