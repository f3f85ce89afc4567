//! WebSocket connection state machine.
//!
//! Each connection is split into two tasks:
//!
//! - a writer that drains the bounded outbound queue into the socket, and
//! - the reader loop below, which decodes commands and hands them to the
//!   [`LobbyService`].
//!
//! Lobby events reach the writer through the [`ConnectionHandle`]
//! registered with the dispatcher. Direct replies (errors, `lobbyList`) go
//! through the same queue so they stay ordered with broadcasts.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{Command, decode};
use crate::domain::{ConnectionHandle, Identity, LobbyEvent};
use crate::error::LobbyError;
use crate::service::LobbyService;

/// Runs the read/write loop for the connection of `identity`.
///
/// On exit the connection is unregistered; if it was still the identity's
/// current connection, the disconnect transition runs.
pub async fn run_connection(socket: WebSocket, identity: Identity, service: Arc<LobbyService>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<str>>(service.config().outbound_buffer);
    let handle = ConnectionHandle::new(tx);
    let conn_id = handle.id();

    service
        .dispatcher()
        .register(identity.id.clone(), handle.clone())
        .await;
    tracing::info!(user = %identity.id, %conn_id, "ws connection opened");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_tx.send(Message::text(frame.to_string())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let mut forced = false;
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_text_message(&text, &identity, &service).await
                            && !handle.send(&reply)
                        {
                            forced = true;
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let err = LobbyError::MalformedMessage(
                            "binary frames are not supported".to_string(),
                        );
                        if !handle.send(&LobbyEvent::from(&err)) {
                            forced = true;
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(user = %identity.id, error = %e, "ws read error");
                        break;
                    }
                    _ => {}
                }
            }
            () = handle.closed() => {
                forced = true;
                break;
            }
            _ = &mut writer => break,
        }
    }

    release_connection(&service, &identity, conn_id).await;
    drop(handle);

    if forced {
        writer.abort();
    } else if !writer.is_finished() {
        let _ = writer.await;
    }
    tracing::info!(user = %identity.id, %conn_id, forced, "ws connection closed");
}

/// Unregisters connection `conn_id` of `identity` and runs the disconnect
/// transition if the identity is now offline.
///
/// A superseded connection normally leaves membership to its successor.
/// If the successor is already gone too, this connection may have applied
/// a command (such as a create) after the successor's own cleanup ran, so
/// the transition runs here instead.
pub async fn release_connection(service: &LobbyService, identity: &Identity, conn_id: Uuid) {
    let dispatcher = service.dispatcher();
    let was_current = dispatcher.unregister(&identity.id, conn_id).await;
    if was_current || !dispatcher.is_connected(&identity.id).await {
        service.disconnect(identity).await;
    }
}

/// Decodes and executes one text frame.
///
/// Returns the event to send back to this connection alone, if any.
/// Successful mutations answer through the lobby broadcast instead.
pub async fn handle_text_message(
    text: &str,
    identity: &Identity,
    service: &LobbyService,
) -> Option<LobbyEvent> {
    let command = match decode(text, identity) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(user = %identity.id, error = %e, "rejected frame");
            return Some(LobbyEvent::from(&e));
        }
    };
    let name = command.name();

    let result = match command {
        Command::CreateLobby(request) => {
            service.create_lobby(identity, request).await.map(|_| None)
        }
        Command::JoinLobby { lobby_id, password } => service
            .join_lobby(lobby_id, identity, password.as_ref())
            .await
            .map(|_| None),
        Command::LeaveLobby { lobby_id } => {
            service.leave_lobby(lobby_id, identity).await.map(|_| None)
        }
        Command::SetReady { lobby_id, ready } => service
            .set_ready(lobby_id, identity, ready)
            .await
            .map(|_| None),
        Command::DeleteLobby { lobby_id } => {
            service.delete_lobby(lobby_id, identity).await.map(|()| None)
        }
        Command::ListLobbies { game_id } => {
            let lobbies = service.list_lobbies(game_id.as_deref()).await;
            Ok(Some(LobbyEvent::LobbyList { lobbies }))
        }
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            tracing::debug!(
                user = %identity.id,
                command = name,
                code = e.code(),
                "command rejected"
            );
            Some(LobbyEvent::from(&e))
        }
    }
}
