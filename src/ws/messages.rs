//! Wire protocol: inbound envelope and its decoding into [`Command`]s.
//!
//! Clients send flat JSON objects discriminated by `type`:
//!
//! ```json
//! { "type": "joinLobby", "lobbyId": "6f1c...", "password": "abc" }
//! ```
//!
//! Outbound frames are serialized [`crate::domain::LobbyEvent`]s.

use serde::Deserialize;

use crate::domain::{Identity, LobbyId, Password};
use crate::error::LobbyError;
use crate::service::CreateLobby;

/// Identity claimed inside an envelope.
///
/// Accepted as `identity` or (older clients) `user`. Only used to catch
/// clients acting for someone other than the authenticated connection.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaim {
    /// Claimed user id; string or number.
    pub id: ClaimId,
    /// Claimed email; not compared.
    #[serde(default)]
    pub email: Option<String>,
}

/// User id as it may appear on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClaimId {
    /// `"id": "42"`
    Text(String),
    /// `"id": 42`
    Number(u64),
}

impl ClaimId {
    fn matches(&self, identity: &Identity) -> bool {
        match self {
            Self::Text(id) => id == identity.id.as_str(),
            Self::Number(id) => id.to_string() == identity.id.as_str(),
        }
    }
}

/// Top-level inbound message envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Command discriminator.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Target lobby.
    pub lobby_id: Option<String>,
    /// Claimed identity; must match the connection if present.
    #[serde(alias = "user")]
    pub identity: Option<IdentityClaim>,
    /// Readiness flag for `setReady`.
    pub ready: Option<bool>,
    /// Lobby password for `createLobby` / `joinLobby`.
    pub password: Option<Password>,
    /// Game id for `createLobby`, or filter for `listLobbies`.
    pub game_id: Option<String>,
    /// Privacy flag for `createLobby`.
    pub is_private: Option<bool>,
    /// Requested capacity for `createLobby`.
    pub max_members: Option<usize>,
}

/// A decoded, validated client command.
#[derive(Debug, Clone)]
pub enum Command {
    /// `createLobby`
    CreateLobby(CreateLobby),
    /// `joinLobby`
    JoinLobby {
        /// Target lobby.
        lobby_id: LobbyId,
        /// Entry password for private lobbies.
        password: Option<Password>,
    },
    /// `leaveLobby`
    LeaveLobby {
        /// Target lobby.
        lobby_id: LobbyId,
    },
    /// `setReady`, `playerReady`, `playerUnready`
    SetReady {
        /// Target lobby.
        lobby_id: LobbyId,
        /// New readiness.
        ready: bool,
    },
    /// `deleteLobby`
    DeleteLobby {
        /// Target lobby.
        lobby_id: LobbyId,
    },
    /// `listLobbies`
    ListLobbies {
        /// Optional game filter.
        game_id: Option<String>,
    },
}

impl Command {
    /// Wire name of the command, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateLobby(_) => "createLobby",
            Self::JoinLobby { .. } => "joinLobby",
            Self::LeaveLobby { .. } => "leaveLobby",
            Self::SetReady { .. } => "setReady",
            Self::DeleteLobby { .. } => "deleteLobby",
            Self::ListLobbies { .. } => "listLobbies",
        }
    }
}

/// Decodes a text frame sent by `identity` into a [`Command`].
///
/// # Errors
///
/// - [`LobbyError::MalformedMessage`] if the frame is not an envelope.
/// - [`LobbyError::UnknownCommand`] if `type` is not recognized.
/// - [`LobbyError::IdentityMismatch`] if the envelope claims another user.
/// - [`LobbyError::InvalidRequest`] if a required field is missing or bad.
pub fn decode(text: &str, identity: &Identity) -> Result<Command, LobbyError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| LobbyError::MalformedMessage(e.to_string()))?;

    if let Some(claim) = &envelope.identity
        && !claim.id.matches(identity)
    {
        return Err(LobbyError::IdentityMismatch);
    }

    let command = match envelope.msg_type.as_str() {
        "createLobby" => Command::CreateLobby(CreateLobby {
            game_id: envelope
                .game_id
                .ok_or_else(|| missing("gameId"))?,
            is_private: envelope.is_private.unwrap_or(false),
            password: envelope.password,
            max_members: envelope.max_members,
        }),
        "joinLobby" => Command::JoinLobby {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
            password: envelope.password,
        },
        "leaveLobby" => Command::LeaveLobby {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
        },
        "setReady" => Command::SetReady {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
            ready: envelope.ready.ok_or_else(|| missing("ready"))?,
        },
        "playerReady" => Command::SetReady {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
            ready: true,
        },
        "playerUnready" => Command::SetReady {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
            ready: false,
        },
        "deleteLobby" => Command::DeleteLobby {
            lobby_id: lobby_id(envelope.lobby_id.as_deref())?,
        },
        "listLobbies" => Command::ListLobbies {
            game_id: envelope.game_id,
        },
        other => return Err(LobbyError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

fn lobby_id(raw: Option<&str>) -> Result<LobbyId, LobbyError> {
    let raw = raw.ok_or_else(|| missing("lobbyId"))?;
    raw.parse()
        .map_err(|_| LobbyError::InvalidRequest(format!("invalid lobbyId: {raw}")))
}

fn missing(field: &str) -> LobbyError {
    LobbyError::InvalidRequest(format!("missing {field}"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn me() -> Identity {
        Identity::new("1", "bambam")
    }

    #[test]
    fn decodes_create_lobby() {
        let text = r#"{"type":"createLobby","gameId":"mayin","isPrivate":true,"password":"abc","maxMembers":4}"#;
        let Ok(Command::CreateLobby(req)) = decode(text, &me()) else {
            panic!("expected createLobby");
        };
        assert_eq!(req.game_id, "mayin");
        assert!(req.is_private);
        assert!(req.password.is_some());
        assert_eq!(req.max_members, Some(4));
    }

    #[test]
    fn ready_variants_map_to_set_ready() {
        let id = LobbyId::new();
        for (text, expected) in [
            (format!(r#"{{"type":"playerReady","lobbyId":"{id}"}}"#), true),
            (format!(r#"{{"type":"playerUnready","lobbyId":"{id}"}}"#), false),
            (format!(r#"{{"type":"setReady","lobbyId":"{id}","ready":true}}"#), true),
        ] {
            let Ok(Command::SetReady { lobby_id, ready }) = decode(&text, &me()) else {
                panic!("expected setReady for {text}");
            };
            assert_eq!(lobby_id, id);
            assert_eq!(ready, expected);
        }
    }

    #[test]
    fn set_ready_requires_flag() {
        let text = format!(r#"{{"type":"setReady","lobbyId":"{}"}}"#, LobbyId::new());
        assert!(matches!(decode(&text, &me()), Err(LobbyError::InvalidRequest(_))));
    }

    #[test]
    fn missing_or_bad_lobby_id_is_invalid() {
        assert!(matches!(
            decode(r#"{"type":"joinLobby"}"#, &me()),
            Err(LobbyError::InvalidRequest(_))
        ));
        assert!(matches!(
            decode(r#"{"type":"joinLobby","lobbyId":"nope"}"#, &me()),
            Err(LobbyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn malformed_and_unknown() {
        assert!(matches!(
            decode("not json", &me()),
            Err(LobbyError::MalformedMessage(_))
        ));
        assert!(matches!(
            decode(r#"{"lobbyId":"x"}"#, &me()),
            Err(LobbyError::MalformedMessage(_))
        ));
        assert_eq!(
            decode(r#"{"type":"startGame"}"#, &me()).err(),
            Some(LobbyError::UnknownCommand("startGame".to_string()))
        );
    }

    #[test]
    fn identity_claim_must_match_connection() {
        let id = LobbyId::new();
        let ok = format!(r#"{{"type":"leaveLobby","lobbyId":"{id}","user":{{"id":1,"email":"bambam"}}}}"#);
        assert!(decode(&ok, &me()).is_ok());

        let spoofed = format!(r#"{{"type":"leaveLobby","lobbyId":"{id}","identity":{{"id":"2"}}}}"#);
        assert_eq!(decode(&spoofed, &me()).err(), Some(LobbyError::IdentityMismatch));
    }

    #[test]
    fn list_lobbies_takes_optional_filter() {
        let Ok(Command::ListLobbies { game_id }) = decode(r#"{"type":"listLobbies"}"#, &me()) else {
            panic!("expected listLobbies");
        };
        assert_eq!(game_id, None);
        assert_eq!(
            decode(r#"{"type":"listLobbies","gameId":"mayin"}"#, &me())
                .map(|c| c.name())
                .ok(),
            Some("listLobbies")
        );
    }
}
