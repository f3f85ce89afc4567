//! Domain layer: lobby entity, registry, session bindings, and fan-out.
//!
//! This module holds all authoritative in-memory state: the lobby registry
//! with its per-lobby locks, the identity → lobby session directory, and
//! the dispatcher that delivers events to member connections.

pub mod broadcast;
pub mod identity;
pub mod lobby;
pub mod lobby_event;
pub mod lobby_id;
pub mod lobby_registry;
pub mod password;
pub mod session_directory;

pub use broadcast::{BroadcastDispatcher, ConnectionHandle};
pub use identity::{Identity, UserId};
pub use lobby::{Departure, Lobby, LobbySnapshot, LobbyState, LobbySummary, Member, NewLobby};
pub use lobby_event::LobbyEvent;
pub use lobby_id::LobbyId;
pub use lobby_registry::{LobbyGuard, LobbyHandle, LobbyRegistry};
pub use password::{Password, PasswordHash};
pub use session_directory::SessionDirectory;
