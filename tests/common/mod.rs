//! Shared harness: boots the gateway on an ephemeral port.

#![allow(dead_code, clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lobby_gateway::app_state::AppState;
use lobby_gateway::config::GatewayConfig;
use lobby_gateway::server;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts a server with `config` and returns its address.
pub async fn spawn_server(config: GatewayConfig) -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(server::serve(listener, AppState::new(config)));
    addr
}

/// Starts a server with default configuration.
pub async fn spawn_default() -> SocketAddr {
    spawn_server(GatewayConfig::default()).await
}

/// Opens a WebSocket as `user_id`, identity passed via query string.
pub async fn connect(addr: SocketAddr, user_id: &str) -> Ws {
    let url = format!("ws://{addr}/ws?userId={user_id}&email={user_id}%40example.com");
    let Ok((ws, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed for {user_id}");
    };
    ws
}

/// Sends a JSON command frame.
pub async fn send(ws: &mut Ws, command: Value) {
    if ws.send(Message::text(command.to_string())).await.is_err() {
        panic!("ws send failed");
    }
}

/// Receives the next JSON event, skipping control frames.
pub async fn recv(ws: &mut Ws) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(RECV_TIMEOUT, ws.next()).await else {
            panic!("no event within {RECV_TIMEOUT:?}");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("server sent invalid JSON: {}", text.as_str());
            };
            return value;
        }
    }
}

/// Receives the next event and checks its `type`.
pub async fn recv_type(ws: &mut Ws, event_type: &str) -> Value {
    let event = recv(ws).await;
    assert_eq!(event["type"], event_type, "unexpected event: {event}");
    event
}

/// Asserts no event arrives for a short while.
pub async fn assert_silent(ws: &mut Ws) {
    if let Ok(Some(Ok(Message::Text(text)))) =
        tokio::time::timeout(Duration::from_millis(200), ws.next()).await
    {
        panic!("unexpected event: {}", text.as_str());
    }
}

/// Creates a public lobby for `game` and returns its id.
pub async fn create_lobby(ws: &mut Ws, game: &str) -> String {
    send(ws, serde_json::json!({ "type": "createLobby", "gameId": game })).await;
    let snapshot = recv_type(ws, "lobbySnapshot").await;
    let Some(id) = snapshot["id"].as_str() else {
        panic!("snapshot without id: {snapshot}");
    };
    id.to_string()
}
