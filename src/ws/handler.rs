//! Axum WebSocket upgrade handler.
//!
//! Authentication happens upstream. The verified identity arrives as
//! request metadata and is bound to the connection for its whole life.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::Identity;
use crate::error::LobbyError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated user's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Query fallback for clients that cannot set upgrade headers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityQuery {
    /// User id.
    pub user_id: Option<String>,
    /// User email.
    pub email: Option<String>,
}

/// `GET /ws`: Upgrade HTTP connection to the lobby protocol.
///
/// # Errors
///
/// Returns [`LobbyError::Unauthenticated`] if no identity is supplied.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IdentityQuery>,
) -> Result<impl IntoResponse, LobbyError> {
    let identity = authenticated_identity(&headers, &query)?;
    let lobby_service = Arc::clone(&state.lobby_service);

    Ok(ws.on_upgrade(move |socket| run_connection(socket, identity, lobby_service)))
}

/// Resolves the connection identity from headers, then the query string.
///
/// # Errors
///
/// Returns [`LobbyError::Unauthenticated`] if the user id is absent or
/// blank. A missing email is tolerated and left empty.
pub fn authenticated_identity(
    headers: &HeaderMap,
    query: &IdentityQuery,
) -> Result<Identity, LobbyError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let id = header(USER_ID_HEADER)
        .or_else(|| {
            query
                .user_id
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .ok_or(LobbyError::Unauthenticated)?;
    let email = header(USER_EMAIL_HEADER)
        .or_else(|| query.email.clone())
        .unwrap_or_default();

    Ok(Identity::new(id, email))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn headers_take_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("7"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("h@x"));
        let query = IdentityQuery {
            user_id: Some("8".to_string()),
            email: Some("q@x".to_string()),
        };

        let Ok(identity) = authenticated_identity(&headers, &query) else {
            panic!("identity should resolve");
        };
        assert_eq!(identity.id.as_str(), "7");
        assert_eq!(identity.email, "h@x");
    }

    #[test]
    fn query_is_a_fallback() {
        let query = IdentityQuery {
            user_id: Some("8".to_string()),
            email: None,
        };
        let Ok(identity) = authenticated_identity(&HeaderMap::new(), &query) else {
            panic!("identity should resolve");
        };
        assert_eq!(identity.id.as_str(), "8");
        assert!(identity.email.is_empty());
    }

    #[test]
    fn missing_or_blank_id_is_unauthenticated() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert_eq!(
            authenticated_identity(&headers, &IdentityQuery::default()).err(),
            Some(LobbyError::Unauthenticated)
        );
    }
}
