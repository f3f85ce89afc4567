//! Lobby browser handlers: list and get. Read-only.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LobbyListParams, LobbyListResponse};
use crate::app_state::AppState;
use crate::domain::{LobbyId, LobbySnapshot};
use crate::error::{ErrorResponse, LobbyError};

/// `GET /lobbies`: List open lobbies with pagination and optional game filter.
#[utoipa::path(
    get,
    path = "/api/v1/lobbies",
    tag = "Lobbies",
    summary = "List lobbies",
    description = "Returns a paginated list of open lobbies, oldest first, optionally filtered by game. Closed lobbies are never listed.",
    params(LobbyListParams),
    responses(
        (status = 200, description = "Paginated lobby list", body = LobbyListResponse),
    )
)]
pub async fn list_lobbies(
    State(state): State<AppState>,
    Query(params): Query<LobbyListParams>,
) -> impl IntoResponse {
    let summaries = state
        .lobby_service
        .list_lobbies(params.game_filter())
        .await;
    let (data, pagination) = params.pagination().paginate(summaries);

    Json(LobbyListResponse { data, pagination })
}

/// `GET /lobbies/{id}`: Get the snapshot of one lobby.
///
/// # Errors
///
/// Returns [`LobbyError::NotFound`] if the lobby does not exist or is
/// closed, and [`LobbyError::InvalidRequest`] if `id` is not a UUID.
#[utoipa::path(
    get,
    path = "/api/v1/lobbies/{id}",
    tag = "Lobbies",
    summary = "Get lobby snapshot",
    description = "Returns the member list, readiness and state of a single open lobby.",
    params(
        ("id" = uuid::Uuid, Path, description = "Lobby UUID"),
    ),
    responses(
        (status = 200, description = "Lobby snapshot", body = LobbySnapshot),
        (status = 400, description = "Malformed lobby id", body = ErrorResponse),
        (status = 404, description = "Lobby not found", body = ErrorResponse),
    )
)]
pub async fn get_lobby(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, LobbyError> {
    let lobby_id: LobbyId = id
        .parse()
        .map_err(|_| LobbyError::InvalidRequest(format!("invalid lobby id: {id}")))?;
    let snapshot = state.lobby_service.lobby_snapshot(lobby_id).await?;
    Ok(Json(snapshot))
}

/// Lobby browser routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lobbies", get(list_lobbies))
        .route("/lobbies/{id}", get(get_lobby))
}
