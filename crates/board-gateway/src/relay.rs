use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::topic::Topic;

/// Default interval between keepalive pings.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Why a relay connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ClientGone,
    SendFailed,
    TopicFailed,
}

/// Relay every payload published on `topic` to one WebSocket client until
/// either side goes away. No buffering, no replay.
pub async fn run(socket: WebSocket, topic: Topic, keepalive: Duration) -> CloseReason {
    let (mut sender, mut receiver) = socket.split();

    let mut subscription = match topic.subscribe().await {
        Ok(sub) => sub,
        Err(e) => {
            warn!("Relay failed to subscribe to '{}': {}", topic.name(), e);
            let _ = sender.send(Message::Close(None)).await;
            return CloseReason::TopicFailed;
        }
    };
    info!("Relay subscribed to '{}'", topic.name());

    // Forward payloads and keepalives. Single writer, so publish order holds.
    let mut forward_task = tokio::spawn(async move {
        let mut keepalive = tokio::time::interval(keepalive);
        keepalive.tick().await;

        loop {
            tokio::select! {
                result = subscription.recv() => {
                    let payload = match result {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Relay receive failed: {}", e);
                            return CloseReason::TopicFailed;
                        }
                    };

                    debug!("Relaying notification ({} bytes)", payload.len());
                    if let Err(e) = sender.send(Message::Text(payload.into())).await {
                        debug!("Relay write failed: {}", e);
                        return CloseReason::SendFailed;
                    }
                }
                _ = keepalive.tick() => {
                    if let Err(e) = sender.send(Message::Ping(vec![].into())).await {
                        debug!("Relay keepalive failed: {}", e);
                        return CloseReason::SendFailed;
                    }
                }
            }
        }
    });

    // Watch the client half for a close frame or a dead socket.
    let mut watch_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("Relay read failed: {}", e);
                    break;
                }
            }
        }
        CloseReason::ClientGone
    });

    // Whichever side finishes first tears down the other
    let reason = tokio::select! {
        result = &mut forward_task => {
            watch_task.abort();
            result.unwrap_or(CloseReason::SendFailed)
        }
        result = &mut watch_task => {
            forward_task.abort();
            result.unwrap_or(CloseReason::ClientGone)
        }
    };

    info!("Relay on '{}' closed: {:?}", topic.name(), reason);
    reason
}
