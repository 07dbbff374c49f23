use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use tracing::warn;

use board_gateway::relay;

use crate::state::AppState;

/// GET /notifications — upgrade to a WebSocket that receives every new
/// message's content as a text frame.
pub async fn notifications(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let topic = state.board.topic().clone();
    let keepalive = state.keepalive;

    ws.on_failed_upgrade(|e| warn!("Notification upgrade failed: {}", e))
        .on_upgrade(move |socket| async move {
            relay::run(socket, topic, keepalive).await;
        })
}
