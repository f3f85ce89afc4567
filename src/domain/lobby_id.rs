//! Type-safe lobby identifier.
//!
//! [`LobbyId`] wraps a [`uuid::Uuid`] (v4) so that lobby identifiers cannot
//! be mixed up with connection ids or user ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a lobby.
///
/// Generated once when the lobby is created and stable for its whole
/// lifetime. Used as the key in [`super::LobbyRegistry`] and as the value
/// side of [`super::SessionDirectory`] bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct LobbyId(uuid::Uuid);

impl LobbyId {
    /// Creates a new random `LobbyId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `LobbyId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for LobbyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LobbyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl From<uuid::Uuid> for LobbyId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
