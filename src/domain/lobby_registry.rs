//! Concurrent lobby storage with per-lobby fine-grained locking.
//!
//! [`LobbyRegistry`] stores every live lobby in a `HashMap` whose entries
//! are individually protected by a [`tokio::sync::RwLock`]. The outer map
//! lock is held only for the structural moment of inserting, removing or
//! cloning out entries; it is never held while waiting on a lobby lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use super::lobby::{Lobby, LobbySummary, Member, NewLobby};
use super::{LobbyId, SessionDirectory};
use crate::error::LobbyError;

/// Shared handle to one lobby behind its exclusive section.
pub type LobbyHandle = Arc<RwLock<Lobby>>;

/// Exclusive access to a freshly created lobby.
pub type LobbyGuard = OwnedRwLockWriteGuard<Lobby>;

/// Central store for all live lobbies.
///
/// # Concurrency
///
/// - Commands on the same lobby are serialized by that lobby's lock.
/// - Commands on different lobbies run in parallel.
/// - Lobby create/remove contend only on the outer map lock.
#[derive(Debug)]
pub struct LobbyRegistry {
    lobbies: RwLock<HashMap<LobbyId, LobbyHandle>>,
    sessions: Arc<SessionDirectory>,
}

impl LobbyRegistry {
    /// Creates an empty registry that records bindings in `sessions`.
    #[must_use]
    pub fn new(sessions: Arc<SessionDirectory>) -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
            sessions,
        }
    }

    /// The session directory this registry binds members in.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionDirectory> {
        &self.sessions
    }

    /// Creates a lobby under a fresh id and binds its owner.
    ///
    /// The lobby is inserted already locked and the owner is bound under
    /// that lock, so nobody can observe the lobby (or act on the owner's
    /// binding) until the caller drops the returned guard.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::AlreadyInLobby`] if the owner is already bound
    /// to another lobby; the lobby is closed and removed again in that case.
    pub async fn create(&self, spec: NewLobby) -> Result<LobbyGuard, LobbyError> {
        let lobby_id = LobbyId::new();
        let owner = spec.owner.id.clone();
        let handle = Arc::new(RwLock::new(Lobby::new(lobby_id, spec)));
        let mut lobby = Arc::clone(&handle).write_owned().await;

        {
            let mut map = self.lobbies.write().await;
            if map.contains_key(&lobby_id) {
                return Err(LobbyError::Internal(format!(
                    "lobby {lobby_id} already exists"
                )));
            }
            map.insert(lobby_id, handle);
        }

        if let Err(e) = self.sessions.bind(&owner, lobby_id).await {
            let _ = lobby.close();
            self.lobbies.write().await.remove(&lobby_id);
            return Err(e);
        }
        Ok(lobby)
    }

    /// Returns the lobby behind its per-lobby lock.
    ///
    /// The lobby may still turn out to be closed once locked; callers check
    /// [`Lobby::is_closed`] inside the critical section.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotFound`] if no lobby with the given id exists.
    pub async fn get(&self, lobby_id: LobbyId) -> Result<LobbyHandle, LobbyError> {
        let map = self.lobbies.read().await;
        map.get(&lobby_id)
            .cloned()
            .ok_or(LobbyError::NotFound(lobby_id))
    }

    /// Removes a lobby, closes it if still open, and releases every member
    /// binding that still points at it.
    ///
    /// Returns the members drained by this call; empty if the lobby had
    /// already been closed inside its critical section.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotFound`] if no lobby with the given id exists.
    pub async fn remove(&self, lobby_id: LobbyId) -> Result<Vec<Member>, LobbyError> {
        let handle = self
            .lobbies
            .write()
            .await
            .remove(&lobby_id)
            .ok_or(LobbyError::NotFound(lobby_id))?;

        let members = handle.write().await.close();
        for member in &members {
            self.sessions.release(&member.identity.id, lobby_id).await;
        }
        Ok(members)
    }

    /// Summaries of all open lobbies, oldest first, optionally restricted
    /// to one game.
    pub async fn list(&self, game_filter: Option<&str>) -> Vec<LobbySummary> {
        let handles: Vec<LobbyHandle> = self.lobbies.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let lobby = handle.read().await;
            if lobby.is_closed() {
                continue;
            }
            if let Some(game_id) = game_filter
                && lobby.game_id() != game_id
            {
                continue;
            }
            summaries.push(LobbySummary::from(&*lobby));
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        summaries
    }

    /// Returns the number of lobbies in the registry.
    pub async fn len(&self) -> usize {
        self.lobbies.read().await.len()
    }

    /// Returns `true` if the registry contains no lobbies.
    pub async fn is_empty(&self) -> bool {
        self.lobbies.read().await.is_empty()
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SessionDirectory::new()))
    }
}
