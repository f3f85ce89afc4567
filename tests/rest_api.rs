//! REST lobby browser and health endpoint.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use common::{connect, create_lobby, recv_type, send, spawn_default};
use serde_json::{Value, json};

async fn get_json(url: String) -> (u16, Value) {
    let Ok(response) = reqwest::get(&url).await else {
        panic!("GET {url} failed");
    };
    let status = response.status().as_u16();
    let Ok(body) = response.json::<Value>().await else {
        panic!("GET {url} returned non-JSON");
    };
    (status, body)
}

#[tokio::test]
async fn health_reports_counts() {
    let addr = spawn_default().await;
    let mut alice = connect(addr, "alice").await;
    let _ = create_lobby(&mut alice, "mayin").await;

    let (status, body) = get_json(format!("http://{addr}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["lobbies"], 1);
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn list_is_paginated_and_filtered() {
    let addr = spawn_default().await;
    let mut owners = Vec::new();
    for (user, game) in [("a", "mayin"), ("b", "mayin"), ("c", "chess")] {
        let mut ws = connect(addr, user).await;
        let _ = create_lobby(&mut ws, game).await;
        owners.push(ws);
    }

    let (status, body) = get_json(format!("http://{addr}/api/v1/lobbies?per_page=2")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);

    let (_, body) = get_json(format!("http://{addr}/api/v1/lobbies?game_id=chess")).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["gameId"], "chess");
}

#[tokio::test]
async fn get_lobby_returns_snapshot_or_404() {
    let addr = spawn_default().await;
    let mut alice = connect(addr, "alice").await;
    let lobby_id = create_lobby(&mut alice, "mayin").await;

    let (status, body) = get_json(format!("http://{addr}/api/v1/lobbies/{lobby_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], lobby_id.as_str());
    assert_eq!(body["owner"]["id"], "alice");

    send(&mut alice, json!({ "type": "deleteLobby", "lobbyId": lobby_id })).await;
    recv_type(&mut alice, "lobbyClosed").await;

    let (status, body) = get_json(format!("http://{addr}/api/v1/lobbies/{lobby_id}")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);

    let (status, _) = get_json(format!("http://{addr}/api/v1/lobbies/not-a-uuid")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let addr = spawn_default().await;
    let (status, body) = get_json(format!("http://{addr}/api-docs/openapi.json")).await;
    assert_eq!(status, 200);
    assert!(body["paths"]["/api/v1/lobbies"].is_object());
}
