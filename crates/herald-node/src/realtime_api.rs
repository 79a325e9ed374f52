//! Real-time WebSocket API.
//!
//! - `/ws/{client_id}` - WebSocket session for one client
//! - `/api/realtime/stats` - Hub statistics
//!
//! ## WebSocket Protocol
//!
//! Plain text frames. Every text a client sends comes back to it as
//! `You wrote: <text>` and goes to everyone as `Client #<id> says: <text>`.
//! Joins, leaves and catalog changes arrive as text frames as well.
//! Binary frames are ignored.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use herald_realtime::{run_session, ClientId, MessageSink, MessageSource, RecvError, SendError};
use tracing::{debug, info};

use crate::api::AppState;
use crate::observability::METRICS;

/// Create the real-time API routes.
pub fn realtime_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/{client_id}", get(ws_handler))
        .route("/api/realtime/stats", get(get_stats))
}

/// WebSocket upgrade handler.
///
/// A `client_id` that is not an integer is rejected by the path extractor
/// before any upgrade happens.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<ClientId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, state))
}

/// Run one client's session over an upgraded socket.
async fn handle_socket(socket: WebSocket, client_id: ClientId, state: AppState) {
    info!(client_id, "WebSocket client connected");
    METRICS.websocket_connections.inc();

    let (sender, receiver) = socket.split();
    let summary = run_session(
        state.hub.clone(),
        client_id,
        WsSink(sender),
        WsSource(receiver),
        state.session,
    )
    .await;

    METRICS.websocket_connections.dec();
    METRICS
        .websocket_messages_relayed
        .inc_by(summary.messages_relayed);
    info!(
        client_id,
        relayed = summary.messages_relayed,
        "WebSocket client disconnected"
    );
}

/// Write half of an axum WebSocket.
struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl MessageSink for WsSink {
    async fn send(&mut self, text: String) -> Result<(), SendError> {
        self.0
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| SendError::Closed)
    }

    async fn close(&mut self) {
        let _ = self.0.close().await;
    }
}

/// Read half of an axum WebSocket.
struct WsSource(SplitStream<WebSocket>);

#[async_trait]
impl MessageSource for WsSource {
    async fn receive(&mut self) -> Result<String, RecvError> {
        loop {
            match self.0.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => return Err(RecvError::Disconnected),
                Some(Ok(Message::Binary(_))) => debug!("Binary message ignored"),
                // Pings are answered by axum
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Err(e)) => return Err(RecvError::Transport(e.to_string())),
            }
        }
    }
}

/// Get real-time connection statistics.
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.hub.stats())
}
