//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{BroadcastDispatcher, LobbyRegistry, SessionDirectory};
use crate::service::LobbyService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Lobby coordinator for all transitions and queries.
    pub lobby_service: Arc<LobbyService>,
}

impl AppState {
    /// Wires registry, session directory, dispatcher and coordinator.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let sessions = Arc::new(SessionDirectory::new());
        let registry = Arc::new(LobbyRegistry::new(sessions));
        let dispatcher = Arc::new(BroadcastDispatcher::new());
        Self {
            lobby_service: Arc::new(LobbyService::new(registry, dispatcher, config)),
        }
    }
}
