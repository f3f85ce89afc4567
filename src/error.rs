//! Lobby error types with wire code and HTTP status mapping.
//!
//! [`LobbyError`] is the single error type of the crate. Over WebSocket it
//! becomes a `commandError` event carrying [`LobbyError::code`]; over REST
//! it becomes an [`ErrorResponse`] with the numeric
//! [`LobbyError::error_code`] and [`LobbyError::status_code`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::LobbyId;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "lobby not found: 6f1c..."
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Every recoverable failure the lobby engine reports.
///
/// None of these affect other members' views; they are reported only to
/// the connection that issued the command.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                  |
/// |-----------|------------------|------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request / 401        |
/// | 2000–2999 | Not Found/State  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server           | 500 Internal Server Error    |
/// | 4000–4999 | Lobby rules      | 403 Forbidden / 409 Conflict |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// Lobby id unknown or already closed.
    #[error("lobby not found: {0}")]
    NotFound(LobbyId),

    /// Lobby is at capacity.
    #[error("lobby {0} is full")]
    Full(LobbyId),

    /// Identity is already bound to a lobby.
    #[error("already in lobby {0}")]
    AlreadyInLobby(LobbyId),

    /// Identity is not a member of the lobby.
    #[error("not a member of lobby {0}")]
    NotAMember(LobbyId),

    /// Only the owner may perform this action.
    #[error("only the owner may delete lobby {0}")]
    NotOwner(LobbyId),

    /// Private lobby password did not match.
    #[error("wrong password for lobby {0}")]
    WrongPassword(LobbyId),

    /// Command was well-formed JSON but semantically invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Inbound frame was not a decodable envelope.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Envelope `type` is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Envelope carried an identity other than the connection's.
    #[error("identity does not match the authenticated connection")]
    IdentityMismatch,

    /// Upgrade request carried no authenticated identity.
    #[error("missing authenticated identity")]
    Unauthenticated,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LobbyError {
    /// Returns the stable wire code used in `commandError` events.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Full(_) => "Full",
            Self::AlreadyInLobby(_) => "AlreadyInLobby",
            Self::NotAMember(_) => "NotAMember",
            Self::NotOwner(_) => "NotOwner",
            Self::WrongPassword(_) => "WrongPassword",
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::MalformedMessage(_) => "MalformedMessage",
            Self::UnknownCommand(_) => "UnknownCommand",
            Self::IdentityMismatch => "IdentityMismatch",
            Self::Unauthenticated => "Unauthenticated",
            Self::Internal(_) => "Internal",
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MalformedMessage(_) => 1002,
            Self::UnknownCommand(_) => 1003,
            Self::IdentityMismatch => 1004,
            Self::Unauthenticated => 1005,
            Self::NotFound(_) => 2001,
            Self::AlreadyInLobby(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Full(_) => 4001,
            Self::NotAMember(_) => 4002,
            Self::NotOwner(_) => 4003,
            Self::WrongPassword(_) => 4004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::MalformedMessage(_)
            | Self::UnknownCommand(_)
            | Self::IdentityMismatch => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Full(_) | Self::AlreadyInLobby(_) => StatusCode::CONFLICT,
            Self::NotAMember(_) | Self::NotOwner(_) | Self::WrongPassword(_) => {
                StatusCode::FORBIDDEN
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LobbyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
