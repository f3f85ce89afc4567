//! # lobby-gateway
//!
//! Real-time lobby coordination for multiplayer games over WebSocket.
//!
//! Authenticated users create lobbies for a game, join them (optionally
//! behind a password), toggle readiness, and leave. Every accepted change
//! is pushed to all members of the affected lobby as a full snapshot, in
//! the same order for everyone. A lobby whose owner leaves is closed for
//! all members.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler + codec (ws/)       ── the only mutation path
//!     ├── REST lobby browser (api/)      ── read-only
//!     │
//!     ├── LobbyService (service/)        ── lock → validate → mutate → broadcast
//!     │
//!     ├── LobbyRegistry (domain/)        ── LobbyId → Arc<RwLock<Lobby>>
//!     ├── SessionDirectory (domain/)     ── UserId → LobbyId
//!     └── BroadcastDispatcher (domain/)  ── UserId → bounded outbound queue
//! ```
//!
//! All state is in memory and lost on restart.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
