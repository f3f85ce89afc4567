//! Fan-out of lobby events to member connections.
//!
//! Each live connection registers a [`ConnectionHandle`]: the sending half of
//! its bounded outbound queue plus a close signal. [`BroadcastDispatcher`]
//! serializes an event once and enqueues it for every recipient with a
//! non-blocking `try_send`. The coordinator calls it from inside the
//! lobby's critical section, so all members of a lobby see that lobby's
//! events in the same order.
//!
//! A recipient whose queue is full or gone is not retried. Its connection
//! is told to close, and the connection's shutdown path runs the usual
//! disconnect transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Notify, RwLock, mpsc};

use super::LobbyEvent;
use super::identity::UserId;

/// Outbound side of one WebSocket connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: uuid::Uuid,
    tx: mpsc::Sender<Arc<str>>,
    closing: Arc<Notify>,
}

impl ConnectionHandle {
    /// Wraps the sender of a connection's outbound queue.
    #[must_use]
    pub fn new(tx: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            tx,
            closing: Arc::new(Notify::new()),
        }
    }

    /// Unique id of this connection.
    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Serializes and enqueues `event`.
    ///
    /// Returns `false` (and signals the connection to close) if the queue
    /// is full or closed.
    pub fn send(&self, event: &LobbyEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(json) => self.send_raw(Arc::from(json)),
            Err(e) => {
                tracing::warn!(
                    event_type = event.event_type_str(),
                    error = %e,
                    "failed to serialize event"
                );
                false
            }
        }
    }

    /// Enqueues an already serialized frame.
    pub fn send_raw(&self, json: Arc<str>) -> bool {
        if self.tx.try_send(json).is_ok() {
            true
        } else {
            self.close();
            false
        }
    }

    /// Asks the connection to shut down. Fire-and-forget.
    pub fn close(&self) {
        self.closing.notify_one();
    }

    /// Completes once [`ConnectionHandle::close`] has been called.
    pub async fn closed(&self) {
        self.closing.notified().await;
    }
}

/// Registry of live connections, keyed by identity.
#[derive(Debug, Default)]
pub struct BroadcastDispatcher {
    connections: RwLock<HashMap<UserId, ConnectionHandle>>,
}

impl BroadcastDispatcher {
    /// Creates a dispatcher with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the connection of `user`.
    ///
    /// A previous connection of the same identity is superseded and told to
    /// close.
    pub async fn register(&self, user: UserId, handle: ConnectionHandle) {
        let previous = self.connections.write().await.insert(user.clone(), handle);
        if let Some(previous) = previous {
            tracing::warn!(%user, conn_id = %previous.id(), "superseding existing connection");
            previous.close();
        }
    }

    /// Removes the connection of `user` if `conn_id` is still the current
    /// one.
    ///
    /// Returns `true` if it was, i.e. the identity is now offline.
    pub async fn unregister(&self, user: &UserId, conn_id: uuid::Uuid) -> bool {
        let mut conns = self.connections.write().await;
        if conns.get(user).map(ConnectionHandle::id) == Some(conn_id) {
            conns.remove(user);
            true
        } else {
            false
        }
    }

    /// Delivers `event` to every connected recipient, in order.
    ///
    /// Returns the number of recipients the event was enqueued for.
    pub async fn broadcast(&self, recipients: &[UserId], event: &LobbyEvent) -> usize {
        let json: Arc<str> = match serde_json::to_string(event) {
            Ok(j) => Arc::from(j),
            Err(e) => {
                tracing::warn!(
                    event_type = event.event_type_str(),
                    error = %e,
                    "failed to serialize event"
                );
                return 0;
            }
        };

        let conns = self.connections.read().await;
        let mut delivered = 0;
        for user in recipients {
            let Some(conn) = conns.get(user) else {
                tracing::debug!(%user, "recipient has no live connection");
                continue;
            };
            if conn.send_raw(Arc::clone(&json)) {
                delivered += 1;
            } else {
                tracing::warn!(%user, conn_id = %conn.id(), "delivery failed; closing connection");
            }
        }
        tracing::debug!(
            event_type = event.event_type_str(),
            lobby_id = ?event.lobby_id(),
            recipients = recipients.len(),
            delivered,
            "broadcast event"
        );
        delivered
    }

    /// Returns `true` if `user` has a registered connection.
    pub async fn is_connected(&self, user: &UserId) -> bool {
        self.connections.read().await.contains_key(user)
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
