//! Server-originated events.
//!
//! Every accepted mutation produces a [`LobbyEvent`] that the
//! [`super::BroadcastDispatcher`] fans out to the lobby's members. Errors
//! and lobby-browser replies go only to the requesting connection.

use serde::Serialize;

use super::LobbyId;
use super::lobby::{LobbySnapshot, LobbySummary};
use crate::error::LobbyError;

/// Event sent from the server to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LobbyEvent {
    /// Full state of a lobby after an accepted mutation.
    LobbySnapshot(LobbySnapshot),

    /// The lobby was closed and removed.
    LobbyClosed {
        /// Closed lobby.
        lobby_id: LobbyId,
    },

    /// A command from this connection was rejected.
    CommandError {
        /// Stable error code, see [`LobbyError::code`].
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// Reply to `listLobbies`.
    LobbyList {
        /// Open lobbies, oldest first.
        lobbies: Vec<LobbySummary>,
    },
}

impl LobbyEvent {
    /// Returns the lobby this event concerns, if any.
    #[must_use]
    pub const fn lobby_id(&self) -> Option<LobbyId> {
        match self {
            Self::LobbySnapshot(snapshot) => Some(snapshot.id),
            Self::LobbyClosed { lobby_id } => Some(*lobby_id),
            Self::CommandError { .. } | Self::LobbyList { .. } => None,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::LobbySnapshot(_) => "lobbySnapshot",
            Self::LobbyClosed { .. } => "lobbyClosed",
            Self::CommandError { .. } => "commandError",
            Self::LobbyList { .. } => "lobbyList",
        }
    }
}

impl From<&LobbyError> for LobbyEvent {
    fn from(err: &LobbyError) -> Self {
        Self::CommandError {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
