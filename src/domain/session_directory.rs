//! Identity → lobby bindings.
//!
//! [`SessionDirectory`] enforces that an identity belongs to at most one
//! lobby at a time. Its lock is always the innermost one taken: callers may
//! hold a per-lobby lock while binding, never the other way around.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::identity::UserId;
use super::LobbyId;
use crate::error::LobbyError;

/// Authoritative map of which lobby each identity is currently in.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    bindings: RwLock<HashMap<UserId, LobbyId>>,
}

impl SessionDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `user` to `lobby_id`.
    ///
    /// Binding again to the same lobby is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::AlreadyInLobby`] carrying the existing lobby if
    /// `user` is bound to a different lobby.
    pub async fn bind(&self, user: &UserId, lobby_id: LobbyId) -> Result<(), LobbyError> {
        let mut bindings = self.bindings.write().await;
        match bindings.get(user) {
            Some(current) if *current != lobby_id => Err(LobbyError::AlreadyInLobby(*current)),
            Some(_) => Ok(()),
            None => {
                bindings.insert(user.clone(), lobby_id);
                Ok(())
            }
        }
    }

    /// Removes whatever binding `user` has. Idempotent.
    ///
    /// Returns the lobby the user was bound to, if any. Lobby teardown and
    /// disconnect go through [`SessionDirectory::release`] instead, which
    /// cannot drop a binding the user has since made to another lobby.
    pub async fn unbind(&self, user: &UserId) -> Option<LobbyId> {
        self.bindings.write().await.remove(user)
    }

    /// Removes the binding only if it still points at `lobby_id`.
    ///
    /// Used when tearing down a lobby so that a member who has already moved
    /// on to another lobby keeps its new binding.
    pub async fn release(&self, user: &UserId, lobby_id: LobbyId) -> bool {
        let mut bindings = self.bindings.write().await;
        if bindings.get(user) == Some(&lobby_id) {
            bindings.remove(user);
            true
        } else {
            false
        }
    }

    /// Returns the lobby `user` is bound to, if any.
    pub async fn current_lobby(&self, user: &UserId) -> Option<LobbyId> {
        self.bindings.read().await.get(user).copied()
    }

    /// Number of bound identities.
    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    /// Returns `true` if nobody is bound.
    pub async fn is_empty(&self) -> bool {
        self.bindings.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_then_lookup() {
        let dir = SessionDirectory::new();
        let user = UserId::new("1");
        let lobby = LobbyId::new();

        assert!(dir.bind(&user, lobby).await.is_ok());
        assert_eq!(dir.current_lobby(&user).await, Some(lobby));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn second_lobby_is_rejected() {
        let dir = SessionDirectory::new();
        let user = UserId::new("1");
        let first = LobbyId::new();

        assert!(dir.bind(&user, first).await.is_ok());
        let result = dir.bind(&user, LobbyId::new()).await;
        assert_eq!(result, Err(LobbyError::AlreadyInLobby(first)));
        assert_eq!(dir.current_lobby(&user).await, Some(first));
    }

    #[tokio::test]
    async fn rebinding_same_lobby_is_noop() {
        let dir = SessionDirectory::new();
        let user = UserId::new("1");
        let lobby = LobbyId::new();

        assert!(dir.bind(&user, lobby).await.is_ok());
        assert!(dir.bind(&user, lobby).await.is_ok());
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn unbind_is_idempotent() {
        let dir = SessionDirectory::new();
        let user = UserId::new("1");
        let lobby = LobbyId::new();

        assert!(dir.bind(&user, lobby).await.is_ok());
        assert_eq!(dir.unbind(&user).await, Some(lobby));
        assert_eq!(dir.unbind(&user).await, None);
        assert!(dir.is_empty().await);
    }

    #[tokio::test]
    async fn release_keeps_newer_binding() {
        let dir = SessionDirectory::new();
        let user = UserId::new("1");
        let old = LobbyId::new();
        let new = LobbyId::new();

        assert!(dir.bind(&user, new).await.is_ok());
        assert!(!dir.release(&user, old).await);
        assert_eq!(dir.current_lobby(&user).await, Some(new));

        assert!(dir.release(&user, new).await);
        assert_eq!(dir.current_lobby(&user).await, None);
    }
}
