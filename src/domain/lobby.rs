//! Lobby entity and its readiness state machine.
//!
//! A [`Lobby`] is only ever touched behind its per-lobby lock in the
//! [`super::LobbyRegistry`]. Every method here is synchronous and either
//! applies a transition completely or returns an error without changing
//! anything.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::identity::{Identity, UserId};
use super::password::{Password, PasswordHash};
use super::LobbyId;
use crate::error::LobbyError;

/// Lifecycle state of a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum LobbyState {
    /// Accepting members; not everyone is ready.
    Open,
    /// Every member is ready and the minimum member count is met.
    AllReady,
    /// Terminal. The lobby has been removed from the registry.
    Closed,
}

/// A member of a lobby and its readiness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Member {
    /// Who the member is.
    pub identity: Identity,
    /// Whether the member has marked itself ready.
    pub ready: bool,
}

/// Parameters for a lobby about to be created.
#[derive(Debug, Clone)]
pub struct NewLobby {
    /// Game the lobby is for. Opaque to the engine.
    pub game_id: String,
    /// Creator and permanent owner.
    pub owner: Identity,
    /// Entry password; `Some` makes the lobby private.
    pub password: Option<Password>,
    /// Capacity including the owner.
    pub max_members: usize,
    /// Minimum member count before the lobby can be `AllReady`.
    pub min_ready: usize,
}

/// Outcome of a member leaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// A regular member left; the lobby lives on.
    Left(Member),
    /// The lobby closed. Carries every member present at closing time,
    /// including the one who left.
    Closed(Vec<Member>),
}

/// Server-side lobby aggregate.
#[derive(Debug)]
pub struct Lobby {
    id: LobbyId,
    game_id: String,
    owner: Identity,
    password_hash: Option<PasswordHash>,
    members: Vec<Member>,
    state: LobbyState,
    max_members: usize,
    min_ready: usize,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl Lobby {
    /// Creates an open lobby whose only member is the (unready) owner.
    #[must_use]
    pub fn new(id: LobbyId, spec: NewLobby) -> Self {
        let now = Utc::now();
        let password_hash = spec.password.as_ref().map(PasswordHash::generate);
        let owner_member = Member {
            identity: spec.owner.clone(),
            ready: false,
        };
        let mut lobby = Self {
            id,
            game_id: spec.game_id,
            owner: spec.owner,
            password_hash,
            members: vec![owner_member],
            state: LobbyState::Open,
            max_members: spec.max_members.max(1),
            min_ready: spec.min_ready.max(1),
            created_at: now,
            last_modified_at: now,
        };
        lobby.recompute_state();
        lobby
    }

    /// Lobby identifier.
    #[must_use]
    pub const fn id(&self) -> LobbyId {
        self.id
    }

    /// Game identifier supplied at creation.
    #[must_use]
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// The owner's identity.
    #[must_use]
    pub const fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LobbyState {
        self.state
    }

    /// Members in join order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Capacity including the owner.
    #[must_use]
    pub const fn max_members(&self) -> usize {
        self.max_members
    }

    /// `true` if no further member can join.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_members
    }

    /// `true` if a password is required to join.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.password_hash.is_some()
    }

    /// `true` once the lobby has reached its terminal state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == LobbyState::Closed
    }

    /// `true` if `user` is currently a member.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.iter().any(|m| &m.identity.id == user)
    }

    /// Ids of all current members, in join order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.identity.id.clone()).collect()
    }

    /// Checks the entry password of a private lobby.
    ///
    /// Public lobbies accept any (or no) password.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::WrongPassword`] if the lobby is private and the
    /// candidate is missing or does not match.
    pub fn check_password(&self, candidate: Option<&Password>) -> Result<(), LobbyError> {
        let Some(hash) = &self.password_hash else {
            return Ok(());
        };
        match candidate {
            Some(password) if hash.verify(password) => Ok(()),
            _ => Err(LobbyError::WrongPassword(self.id)),
        }
    }

    /// Adds `identity` as an unready member.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby is closed.
    /// - [`LobbyError::AlreadyInLobby`] if `identity` is already a member.
    /// - [`LobbyError::Full`] if the lobby is at capacity.
    pub fn add_member(&mut self, identity: Identity) -> Result<(), LobbyError> {
        self.ensure_open()?;
        if self.is_member(&identity.id) {
            return Err(LobbyError::AlreadyInLobby(self.id));
        }
        if self.is_full() {
            return Err(LobbyError::Full(self.id));
        }
        self.members.push(Member {
            identity,
            ready: false,
        });
        self.touch();
        Ok(())
    }

    /// Removes `user` from the lobby.
    ///
    /// The owner leaving, or the lobby becoming empty, closes the lobby.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby is already closed.
    /// - [`LobbyError::NotAMember`] if `user` is not a member.
    pub fn leave(&mut self, user: &UserId) -> Result<Departure, LobbyError> {
        self.ensure_open()?;
        let Some(pos) = self.members.iter().position(|m| &m.identity.id == user) else {
            return Err(LobbyError::NotAMember(self.id));
        };
        if &self.owner.id == user {
            return Ok(Departure::Closed(self.close()));
        }
        let member = self.members.remove(pos);
        if self.members.is_empty() {
            let mut remaining = self.close();
            remaining.push(member);
            return Ok(Departure::Closed(remaining));
        }
        self.touch();
        Ok(Departure::Left(member))
    }

    /// Sets the readiness flag of `user`.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::NotFound`] if the lobby is closed.
    /// - [`LobbyError::NotAMember`] if `user` is not a member.
    pub fn set_ready(&mut self, user: &UserId, ready: bool) -> Result<(), LobbyError> {
        self.ensure_open()?;
        let Some(member) = self.members.iter_mut().find(|m| &m.identity.id == user) else {
            return Err(LobbyError::NotAMember(self.id));
        };
        member.ready = ready;
        self.touch();
        Ok(())
    }

    /// Moves the lobby to `Closed` and drains its members.
    ///
    /// Idempotent: closing a closed lobby returns an empty list.
    pub fn close(&mut self) -> Vec<Member> {
        self.state = LobbyState::Closed;
        self.last_modified_at = Utc::now();
        std::mem::take(&mut self.members)
    }

    /// Full state for broadcast and REST reads.
    #[must_use]
    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            id: self.id,
            game_id: self.game_id.clone(),
            owner: self.owner.clone(),
            is_private: self.is_private(),
            members: self.members.clone(),
            state: self.state,
            max_members: self.max_members,
            created_at: self.created_at,
            updated_at: self.last_modified_at,
        }
    }

    fn ensure_open(&self) -> Result<(), LobbyError> {
        if self.is_closed() {
            return Err(LobbyError::NotFound(self.id));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.recompute_state();
        self.last_modified_at = Utc::now();
    }

    /// Derives `Open`/`AllReady` from the member list. Never reopens a
    /// closed lobby.
    fn recompute_state(&mut self) {
        if self.is_closed() {
            return;
        }
        let all_ready =
            self.members.len() >= self.min_ready && self.members.iter().all(|m| m.ready);
        self.state = if all_ready {
            LobbyState::AllReady
        } else {
            LobbyState::Open
        };
    }
}

/// Full lobby state as seen by members and the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    /// Lobby identifier.
    pub id: LobbyId,
    /// Game identifier.
    pub game_id: String,
    /// Owner identity.
    pub owner: Identity,
    /// Whether a password is required to join.
    pub is_private: bool,
    /// Members in join order with their readiness.
    pub members: Vec<Member>,
    /// Current lifecycle state.
    pub state: LobbyState,
    /// Capacity including the owner.
    pub max_members: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Time of the last accepted transition.
    pub updated_at: DateTime<Utc>,
}

/// Lightweight lobby description for the lobby browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    /// Lobby identifier.
    pub id: LobbyId,
    /// Game identifier.
    pub game_id: String,
    /// Owner identity.
    pub owner: Identity,
    /// Whether a password is required to join.
    pub is_private: bool,
    /// Current member count.
    pub member_count: usize,
    /// Capacity including the owner.
    pub max_members: usize,
    /// Current lifecycle state.
    pub state: LobbyState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Lobby> for LobbySummary {
    fn from(lobby: &Lobby) -> Self {
        Self {
            id: lobby.id,
            game_id: lobby.game_id.clone(),
            owner: lobby.owner.clone(),
            is_private: lobby.is_private(),
            member_count: lobby.members.len(),
            max_members: lobby.max_members,
            state: lobby.state,
            created_at: lobby.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn owner() -> Identity {
        Identity::new("1", "bambam")
    }

    fn guest() -> Identity {
        Identity::new("2", "byza")
    }

    fn make_lobby(max_members: usize, password: Option<&str>) -> Lobby {
        Lobby::new(
            LobbyId::new(),
            NewLobby {
                game_id: "mayin".to_string(),
                owner: owner(),
                password: password.map(Password::new),
                max_members,
                min_ready: 1,
            },
        )
    }

    #[test]
    fn owner_is_first_unready_member() {
        let lobby = make_lobby(4, None);
        assert_eq!(lobby.members().len(), 1);
        assert!(lobby.is_member(&owner().id));
        assert_eq!(lobby.state(), LobbyState::Open);
        assert!(!lobby.is_private());
    }

    #[test]
    fn all_ready_tracks_every_member() {
        let mut lobby = make_lobby(4, None);
        assert!(lobby.add_member(guest()).is_ok());

        assert!(lobby.set_ready(&owner().id, true).is_ok());
        assert_eq!(lobby.state(), LobbyState::Open);

        assert!(lobby.set_ready(&guest().id, true).is_ok());
        assert_eq!(lobby.state(), LobbyState::AllReady);

        assert!(lobby.set_ready(&guest().id, false).is_ok());
        assert_eq!(lobby.state(), LobbyState::Open);
    }

    #[test]
    fn new_member_drops_all_ready() {
        let mut lobby = make_lobby(4, None);
        assert!(lobby.set_ready(&owner().id, true).is_ok());
        assert_eq!(lobby.state(), LobbyState::AllReady);

        assert!(lobby.add_member(guest()).is_ok());
        assert_eq!(lobby.state(), LobbyState::Open);
    }

    #[test]
    fn unready_member_leaving_restores_all_ready() {
        let mut lobby = make_lobby(4, None);
        assert!(lobby.add_member(guest()).is_ok());
        assert!(lobby.set_ready(&owner().id, true).is_ok());

        let Ok(Departure::Left(member)) = lobby.leave(&guest().id) else {
            panic!("guest should leave without closing");
        };
        assert_eq!(member.identity, guest());
        assert_eq!(lobby.state(), LobbyState::AllReady);
    }

    #[test]
    fn min_ready_gates_all_ready() {
        let mut lobby = Lobby::new(
            LobbyId::new(),
            NewLobby {
                game_id: "mayin".to_string(),
                owner: owner(),
                password: None,
                max_members: 4,
                min_ready: 2,
            },
        );
        assert!(lobby.set_ready(&owner().id, true).is_ok());
        assert_eq!(lobby.state(), LobbyState::Open);

        assert!(lobby.add_member(guest()).is_ok());
        assert!(lobby.set_ready(&guest().id, true).is_ok());
        assert_eq!(lobby.state(), LobbyState::AllReady);
    }

    #[test]
    fn full_lobby_rejects_join_without_change() {
        let mut lobby = make_lobby(2, None);
        assert!(lobby.add_member(guest()).is_ok());

        let result = lobby.add_member(Identity::new("3", "third"));
        assert_eq!(result, Err(LobbyError::Full(lobby.id())));
        assert_eq!(lobby.member_ids(), vec![owner().id, guest().id]);
    }

    #[test]
    fn duplicate_member_rejected() {
        let mut lobby = make_lobby(4, None);
        let result = lobby.add_member(owner());
        assert_eq!(result, Err(LobbyError::AlreadyInLobby(lobby.id())));
    }

    #[test]
    fn password_gate() {
        let lobby = make_lobby(4, Some("abc"));
        assert!(lobby.is_private());
        assert!(lobby.check_password(Some(&Password::new("abc"))).is_ok());
        assert_eq!(
            lobby.check_password(Some(&Password::new("xyz"))),
            Err(LobbyError::WrongPassword(lobby.id()))
        );
        assert_eq!(
            lobby.check_password(None),
            Err(LobbyError::WrongPassword(lobby.id()))
        );
    }

    #[test]
    fn owner_leaving_closes_and_drains() {
        let mut lobby = make_lobby(4, None);
        assert!(lobby.add_member(guest()).is_ok());
        assert!(lobby.set_ready(&guest().id, true).is_ok());

        let Ok(Departure::Closed(members)) = lobby.leave(&owner().id) else {
            panic!("owner leaving should close the lobby");
        };
        assert_eq!(members.len(), 2);
        assert!(lobby.is_closed());
        assert!(lobby.members().is_empty());
    }

    #[test]
    fn closed_lobby_rejects_everything() {
        let mut lobby = make_lobby(4, None);
        let _ = lobby.close();
        let id = lobby.id();
        assert_eq!(lobby.add_member(guest()), Err(LobbyError::NotFound(id)));
        assert_eq!(
            lobby.set_ready(&owner().id, true),
            Err(LobbyError::NotFound(id))
        );
        assert_eq!(lobby.leave(&owner().id), Err(LobbyError::NotFound(id)));
        assert_eq!(lobby.state(), LobbyState::Closed);
    }

    #[test]
    fn non_member_cannot_ready_or_leave() {
        let mut lobby = make_lobby(4, None);
        let id = lobby.id();
        assert_eq!(
            lobby.set_ready(&guest().id, true),
            Err(LobbyError::NotAMember(id))
        );
        assert_eq!(lobby.leave(&guest().id), Err(LobbyError::NotAMember(id)));
    }

    #[test]
    fn rejoin_resets_ready() {
        let mut lobby = make_lobby(4, None);
        assert!(lobby.add_member(guest()).is_ok());
        assert!(lobby.set_ready(&guest().id, true).is_ok());
        assert!(lobby.leave(&guest().id).is_ok());
        assert!(lobby.add_member(guest()).is_ok());

        let snapshot = lobby.snapshot();
        let Some(member) = snapshot.members.iter().find(|m| m.identity == guest()) else {
            panic!("guest should be listed");
        };
        assert!(!member.ready);
    }

    #[test]
    fn snapshot_serializes_camel_case_without_secrets() {
        let lobby = make_lobby(4, Some("hunter2"));
        let json = serde_json::to_string(&lobby.snapshot()).unwrap_or_default();
        assert!(json.contains("\"gameId\":\"mayin\""));
        assert!(json.contains("\"isPrivate\":true"));
        assert!(json.contains("\"state\":\"Open\""));
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }
}
