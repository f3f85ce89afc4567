//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! Lobby endpoints are mounted under `/api/v1`. The OpenAPI document is
//! served at `/api-docs/openapi.json`, with Swagger UI at `/swagger-ui`
//! when the `swagger-ui` feature is enabled.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lobby-gateway",
        description = "Read-only lobby browser for the lobby-gateway WebSocket service."
    ),
    paths(
        handlers::lobby::list_lobbies,
        handlers::lobby::get_lobby,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::LobbyListResponse,
        dto::PaginationMeta,
        crate::domain::LobbySnapshot,
        crate::domain::LobbySummary,
        crate::domain::LobbyState,
        crate::domain::Member,
        crate::domain::Identity,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Lobbies", description = "Lobby browser"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_router())
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
