//! Service layer: lobby coordination.
//!
//! [`LobbyService`] validates and applies lobby commands against the
//! [`crate::domain::LobbyRegistry`] and emits the resulting events through
//! the [`crate::domain::BroadcastDispatcher`].

pub mod lobby_service;

pub use lobby_service::{CreateLobby, LobbyService};
