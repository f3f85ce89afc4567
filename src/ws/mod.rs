//! WebSocket layer: connection handling and the lobby wire protocol.
//!
//! The endpoint at `/ws` is the only way to mutate lobbies. Each
//! connection is bound to one authenticated identity.

pub mod connection;
pub mod handler;
pub mod messages;
