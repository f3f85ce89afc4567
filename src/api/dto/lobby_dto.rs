//! Lobby browser request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams};
use crate::domain::LobbySummary;

/// Query parameters of `GET /api/v1/lobbies`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LobbyListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Only list lobbies for this game.
    #[serde(default, alias = "gameId")]
    pub game_id: Option<String>,
}

fn default_page() -> u32 {
    PaginationParams::default().page
}

fn default_per_page() -> u32 {
    PaginationParams::default().per_page
}

impl LobbyListParams {
    /// Pagination part of the query.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Game filter, ignoring blank values.
    #[must_use]
    pub fn game_filter(&self) -> Option<&str> {
        self.game_id
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Paginated list of open lobbies.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LobbyListResponse {
    /// Lobbies on this page, oldest first.
    pub data: Vec<LobbySummary>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
