//! Integration tests for the websocket broadcaster and the update hook.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use helpers::{PASSWORD, TestApp, UPDATE_KEY};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: std::net::SocketAddr, path: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws?url={path}"))
        .await
        .expect("WebSocket handshake failed");
    socket
}

async fn next_event(socket: &mut Socket) -> Option<Value> {
    let frame = tokio::time::timeout(Duration::from_millis(500), socket.next())
        .await
        .ok()??;
    match frame.ok()? {
        Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
        _ => None,
    }
}

async fn publish(app: &TestApp, body: Value) -> helpers::TestResponse {
    app.request("POST", "/update", Some(body), &[("key", UPDATE_KEY)])
        .await
}

#[tokio::test]
async fn test_update_reaches_only_matching_subscribers() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut watcher = connect(addr, "/products/42").await;
    let mut other = connect(addr, "/products/7").await;
    let mut browsing = connect(addr, "/cart").await;
    assert_eq!(app.state.realtime.connections.connection_count(), 3);

    let response = publish(&app, json!({ "id": "42", "price": 1999 })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["delivered"], 1);

    let event = next_event(&mut watcher).await.expect("watcher got no update");
    assert_eq!(event["type"], "update");
    assert_eq!(event["resource_id"], "42");
    assert_eq!(event["payload"]["price"], 1999);

    assert!(next_event(&mut other).await.is_none());
    assert!(next_event(&mut browsing).await.is_none());
}

#[tokio::test]
async fn test_routing_moves_subscription() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut socket = connect(addr, "/products/7").await;
    socket
        .send(Message::Text(
            json!({ "type": "routing", "url": "/products/42" }).to_string().into(),
        ))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let old = publish(&app, json!({ "id": "7" })).await;
    assert_eq!(old.body["data"]["delivered"], 0);

    let new = publish(&app, json!({ "id": 42 })).await;
    assert_eq!(new.body["data"]["delivered"], 1);
    let event = next_event(&mut socket).await.expect("no update after routing");
    assert_eq!(event["resource_id"], "42");
}

#[tokio::test]
async fn test_authentication_event_sets_identity() {
    let app = TestApp::new();
    app.create_customer("ada@example.com").await;
    let (access, _) = app
        .login(
            "/api/customers/login",
            json!({ "email": "ada@example.com", "password": PASSWORD }),
        )
        .await;
    let addr = app.spawn().await;

    let mut socket = connect(addr, "/products/42").await;
    socket
        .send(Message::Text(
            json!({ "type": "authenticated", "token": "garbage" }).to_string().into(),
        ))
        .await
        .unwrap();
    socket
        .send(Message::Text(
            json!({ "type": "authenticated", "token": access }).to_string().into(),
        ))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let records = storefront_database::repositories::ConnectionRepository::new(
        app.state.store.clone(),
    )
    .list()
    .await
    .unwrap();
    assert_eq!(records.len(), 1);
    let identity = records[0].identity.as_ref().expect("connection stayed anonymous");
    assert_eq!(identity.identity, "ada@example.com");

    // A garbage event gets an error reply but keeps the socket open.
    socket.send(Message::Text("{not json".into())).await.unwrap();
    let event = next_event(&mut socket).await.expect("no error event");
    assert_eq!(event["type"], "error");

    publish(&app, json!({ "id": "42" })).await;
    let event = next_event(&mut socket).await.expect("socket closed after error");
    assert_eq!(event["type"], "update");
}

#[tokio::test]
async fn test_handshake_without_url_is_rejected() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let err = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect_err("handshake without url should fail");
    match err {
        tokio_tungstenite::tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 400);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(app.state.realtime.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_disconnect_removes_connection_record() {
    let app = TestApp::new();
    let addr = app.spawn().await;

    let mut socket = connect(addr, "/products/42").await;
    assert_eq!(app.state.realtime.connections.connection_count(), 1);

    socket.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(app.state.realtime.connections.connection_count(), 0);
    let records = storefront_database::repositories::ConnectionRepository::new(
        app.state.store.clone(),
    )
    .list()
    .await
    .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_update_hook_requires_key_and_id() {
    let app = TestApp::new();

    let no_key = app
        .request("POST", "/update", Some(json!({ "id": "42" })), &[])
        .await;
    assert_eq!(no_key.status, StatusCode::UNAUTHORIZED);

    let wrong_key = app
        .request("POST", "/update", Some(json!({ "id": "42" })), &[("key", "nope")])
        .await;
    assert_eq!(wrong_key.status, StatusCode::UNAUTHORIZED);

    let no_id = publish(&app, json!({ "price": 10 })).await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);
}
