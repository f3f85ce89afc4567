//! Lobby coordinator: validates commands, applies them, emits events.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{
    BroadcastDispatcher, Departure, Identity, Lobby, LobbyEvent, LobbyId, LobbyRegistry,
    LobbySnapshot, LobbySummary, NewLobby, Password, SessionDirectory, UserId,
};
use crate::error::LobbyError;

/// Parameters of a `createLobby` command.
#[derive(Debug, Clone, Default)]
pub struct CreateLobby {
    /// Game the lobby is for.
    pub game_id: String,
    /// Whether joining requires a password.
    pub is_private: bool,
    /// Entry password; required when `is_private`.
    pub password: Option<Password>,
    /// Requested capacity; clamped to the configured bounds.
    pub max_members: Option<usize>,
}

/// Orchestration layer for all lobby transitions.
///
/// Stateless coordinator: owns references to [`LobbyRegistry`] for state
/// and [`BroadcastDispatcher`] for fan-out. Every mutation follows the
/// pattern: acquire the lobby lock → validate → mutate → update session
/// bindings → broadcast while still holding the lock → release. Events for
/// one lobby therefore leave in exactly the order the mutations happened.
#[derive(Debug, Clone)]
pub struct LobbyService {
    registry: Arc<LobbyRegistry>,
    dispatcher: Arc<BroadcastDispatcher>,
    config: Arc<GatewayConfig>,
}

impl LobbyService {
    /// Creates a new `LobbyService`.
    #[must_use]
    pub fn new(
        registry: Arc<LobbyRegistry>,
        dispatcher: Arc<BroadcastDispatcher>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the inner [`LobbyRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<LobbyRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`BroadcastDispatcher`].
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<BroadcastDispatcher> {
        &self.dispatcher
    }

    /// Returns the session directory shared with the registry.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionDirectory> {
        self.registry.sessions()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Creates a lobby owned by `owner` and broadcasts its first snapshot.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::InvalidRequest`] on an empty game id, or a private
    ///   lobby without a password.
    /// - [`LobbyError::AlreadyInLobby`] if `owner` is already in a lobby.
    pub async fn create_lobby(
        &self,
        owner: &Identity,
        request: CreateLobby,
    ) -> Result<LobbySnapshot, LobbyError> {
        let game_id = request.game_id.trim();
        if game_id.is_empty() {
            return Err(LobbyError::InvalidRequest("gameId must not be empty".to_string()));
        }
        let password = if request.is_private {
            match request.password {
                Some(password) if !password.is_empty() => Some(password),
                _ => {
                    return Err(LobbyError::InvalidRequest(
                        "a private lobby requires a password".to_string(),
                    ));
                }
            }
        } else {
            None
        };

        let lobby = self
            .registry
            .create(NewLobby {
                game_id: game_id.to_string(),
                owner: owner.clone(),
                password,
                max_members: self.config.lobby_capacity(request.max_members),
                min_ready: self.config.min_ready_members,
            })
            .await?;

        let snapshot = self.publish_snapshot(&lobby).await;
        drop(lobby);
        tracing::info!(
            lobby_id = %snapshot.id,
            game_id = %snapshot.game_id,
            owner = %owner.id,
            is_private = snapshot.is_private,
            max_members = snapshot.max_members,
            "lobby created"
        );
        Ok(snapshot)
    }

    /// Adds `identity` to a lobby as an unready member.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby does not exist or is closed.
    /// - [`LobbyError::AlreadyInLobby`] if `identity` is in any lobby.
    /// - [`LobbyError::WrongPassword`] if the private-lobby password fails.
    /// - [`LobbyError::Full`] if the lobby is at capacity.
    pub async fn join_lobby(
        &self,
        lobby_id: LobbyId,
        identity: &Identity,
        password: Option<&Password>,
    ) -> Result<LobbySnapshot, LobbyError> {
        let handle = self.registry.get(lobby_id).await?;
        let mut lobby = handle.write().await;
        if lobby.is_closed() {
            return Err(LobbyError::NotFound(lobby_id));
        }
        if lobby.is_member(&identity.id) {
            return Err(LobbyError::AlreadyInLobby(lobby_id));
        }
        lobby.check_password(password)?;
        if lobby.is_full() {
            return Err(LobbyError::Full(lobby_id));
        }

        self.sessions().bind(&identity.id, lobby_id).await?;
        if let Err(e) = lobby.add_member(identity.clone()) {
            self.sessions().release(&identity.id, lobby_id).await;
            return Err(e);
        }

        let snapshot = self.publish_snapshot(&lobby).await;
        tracing::info!(
            %lobby_id,
            user = %identity.id,
            members = snapshot.members.len(),
            "member joined"
        );
        Ok(snapshot)
    }

    /// Removes `identity` from a lobby.
    ///
    /// The owner leaving closes the lobby for everyone.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby does not exist or is closed.
    /// - [`LobbyError::NotAMember`] if `identity` is not a member.
    pub async fn leave_lobby(
        &self,
        lobby_id: LobbyId,
        identity: &Identity,
    ) -> Result<Departure, LobbyError> {
        let handle = self.registry.get(lobby_id).await?;
        let mut lobby = handle.write().await;
        let recipients = lobby.member_ids();
        let departure = lobby.leave(&identity.id)?;

        match &departure {
            Departure::Left(_) => {
                self.sessions().release(&identity.id, lobby_id).await;
                let snapshot = LobbyEvent::LobbySnapshot(lobby.snapshot());
                self.dispatcher.broadcast(&recipients, &snapshot).await;
                tracing::info!(
                    %lobby_id,
                    user = %identity.id,
                    members = lobby.members().len(),
                    "member left"
                );
            }
            Departure::Closed(members) => {
                let released: Vec<UserId> =
                    members.iter().map(|m| m.identity.id.clone()).collect();
                self.publish_closed(lobby_id, &recipients, &released).await;
                tracing::info!(%lobby_id, user = %identity.id, "lobby closed by departure");
            }
        }
        drop(lobby);

        if matches!(departure, Departure::Closed(_)) {
            self.forget(lobby_id).await;
        }
        Ok(departure)
    }

    /// Sets the readiness flag of `identity` and recomputes the lobby state.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby does not exist or is closed.
    /// - [`LobbyError::NotAMember`] if `identity` is not a member.
    pub async fn set_ready(
        &self,
        lobby_id: LobbyId,
        identity: &Identity,
        ready: bool,
    ) -> Result<LobbySnapshot, LobbyError> {
        let handle = self.registry.get(lobby_id).await?;
        let mut lobby = handle.write().await;
        lobby.set_ready(&identity.id, ready)?;

        let snapshot = self.publish_snapshot(&lobby).await;
        tracing::debug!(
            %lobby_id,
            user = %identity.id,
            ready,
            state = ?snapshot.state,
            "readiness changed"
        );
        Ok(snapshot)
    }

    /// Closes a lobby at its owner's request.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby does not exist or is closed.
    /// - [`LobbyError::NotOwner`] if `identity` is not the owner.
    pub async fn delete_lobby(
        &self,
        lobby_id: LobbyId,
        identity: &Identity,
    ) -> Result<(), LobbyError> {
        let handle = self.registry.get(lobby_id).await?;
        let mut lobby = handle.write().await;
        if lobby.is_closed() {
            return Err(LobbyError::NotFound(lobby_id));
        }
        if lobby.owner().id != identity.id {
            return Err(LobbyError::NotOwner(lobby_id));
        }

        let recipients = lobby.member_ids();
        let members = lobby.close();
        let released: Vec<UserId> = members.into_iter().map(|m| m.identity.id).collect();
        self.publish_closed(lobby_id, &recipients, &released).await;
        drop(lobby);

        self.forget(lobby_id).await;
        tracing::info!(%lobby_id, owner = %identity.id, "lobby deleted");
        Ok(())
    }

    /// Runs the implicit leave for an identity whose connection closed.
    ///
    /// Returns the departure if the identity was in a lobby.
    pub async fn disconnect(&self, identity: &Identity) -> Option<Departure> {
        let lobby_id = self.sessions().current_lobby(&identity.id).await?;
        match self.leave_lobby(lobby_id, identity).await {
            Ok(departure) => {
                tracing::info!(%lobby_id, user = %identity.id, "disconnect treated as leave");
                Some(departure)
            }
            Err(e) => {
                tracing::debug!(
                    %lobby_id,
                    user = %identity.id,
                    error = %e,
                    "stale binding on disconnect"
                );
                self.sessions().release(&identity.id, lobby_id).await;
                None
            }
        }
    }

    /// Returns the current snapshot of an open lobby.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotFound`] if the lobby does not exist or is
    /// closed.
    pub async fn lobby_snapshot(&self, lobby_id: LobbyId) -> Result<LobbySnapshot, LobbyError> {
        let handle = self.registry.get(lobby_id).await?;
        let lobby = handle.read().await;
        if lobby.is_closed() {
            return Err(LobbyError::NotFound(lobby_id));
        }
        Ok(lobby.snapshot())
    }

    /// Returns summaries of all open lobbies, optionally for one game.
    pub async fn list_lobbies(&self, game_filter: Option<&str>) -> Vec<LobbySummary> {
        self.registry.list(game_filter).await
    }

    /// Broadcasts the lobby's snapshot to its current members. Must be
    /// called with the lobby lock held.
    async fn publish_snapshot(&self, lobby: &Lobby) -> LobbySnapshot {
        let snapshot = lobby.snapshot();
        let event = LobbyEvent::LobbySnapshot(snapshot.clone());
        self.dispatcher.broadcast(&lobby.member_ids(), &event).await;
        snapshot
    }

    /// Releases member bindings and tells `recipients` the lobby is gone.
    /// Must be called with the lobby lock held.
    async fn publish_closed(
        &self,
        lobby_id: LobbyId,
        recipients: &[UserId],
        released: &[UserId],
    ) {
        for user in released {
            self.sessions().release(user, lobby_id).await;
        }
        self.dispatcher
            .broadcast(recipients, &LobbyEvent::LobbyClosed { lobby_id })
            .await;
    }

    /// Drops a closed lobby from the registry map.
    async fn forget(&self, lobby_id: LobbyId) {
        if let Err(e) = self.registry.remove(lobby_id).await {
            tracing::debug!(%lobby_id, error = %e, "closed lobby already removed");
        }
    }
}
