use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::shared::AppState;

use super::session::Session;

/// Query string of the upgrade request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectParams {
    /// Room to join on connect; empty means no room
    #[serde(default)]
    pub roomid: String,
}

/// WebSocket endpoint
/// GET /ws?roomid={room_id}
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(app_state): State<AppState>,
) -> Response {
    info!(room_id = %params.roomid, "WebSocket connection requested");

    ws.on_failed_upgrade(|error| {
        warn!(error = %error, "WebSocket upgrade failed");
    })
    .on_upgrade(move |socket| handle_websocket_connection(socket, params.roomid, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, room_id: String, app_state: AppState) {
    let session = Session::new(
        app_state.hub.clone(),
        Box::new(socket),
        room_id,
        app_state.config.write_timeout,
    );

    session.run().await;
}
