//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use storefront_realtime::connection::ConnectionHandle;

use crate::error::ApiResult;
use crate::extractors::ClientIp;
use crate::state::AppState;

/// Handshake query parameters.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Page path the client is viewing, e.g. `/products/42`.
    pub url: Option<String>,
}

/// GET /ws?url={path}
///
/// The connection is registered before the upgrade so a handshake without
/// `url` is refused with 400.
pub async fn ws_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let (handle, outbound_rx) = state
        .realtime
        .connections
        .register(query.url.as_deref(), ip)
        .await?;

    let conn_id = handle.id.clone();
    let failed_state = state.clone();

    Ok(ws
        .on_failed_upgrade(move |e| {
            warn!(conn_id = %conn_id, error = %e, "WebSocket upgrade failed");
            tokio::spawn(async move {
                failed_state.realtime.connections.unregister(&conn_id).await;
            });
        })
        .on_upgrade(move |socket| handle_ws_connection(state, handle, outbound_rx, socket)))
}

/// Pumps frames for an established connection until either side closes.
async fn handle_ws_connection(
    state: AppState,
    handle: Arc<ConnectionHandle>,
    mut outbound_rx: mpsc::Receiver<String>,
    socket: WebSocket,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let conn_id = handle.id.clone();
    let mut shutdown = state.realtime.shutdown_receiver();

    info!(conn_id = %conn_id, ip = ?handle.ip, "WebSocket connection established");

    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    state
                        .realtime
                        .connections
                        .handle_inbound(&conn_id, text.as_str())
                        .await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown.recv() => break,
        }
    }

    outbound_task.abort();
    state.realtime.connections.unregister(&conn_id).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
