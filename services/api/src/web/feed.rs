//! services/api/src/web/feed.rs
//!
//! The live-feed WebSocket: pushes the activity window and the connected
//! user's gamification record as full-replacement frames whenever either
//! changes.

use crate::web::{
    middleware::UserId,
    protocol::ServerMessage,
    rest::{LogEntryResponse, StatsResponse},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn feed_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user_id))
}

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

async fn send_message(sender: &WsSender, message: &ServerMessage) -> bool {
    let Ok(frame) = serde_json::to_string(message) else {
        warn!("Failed to encode feed frame");
        return false;
    };
    sender
        .lock()
        .await
        .send(Message::Text(frame.into()))
        .await
        .is_ok()
}

async fn handle_socket(socket: WebSocket, app_state: AppState, user_id: String) {
    info!("Feed connection established for user: {}", user_id);

    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));
    let token = CancellationToken::new();

    // --- 1. Open the store subscriptions ---
    let activity = match app_state.gamification.activity().subscribe().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to subscribe to activity feed: {e}");
            let _ = send_message(
                &ws_sender,
                &ServerMessage::Error {
                    message: "Failed to open the activity feed.".to_string(),
                },
            )
            .await;
            return;
        }
    };
    let stats = match app_state.gamification.progress().subscribe(&user_id).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to subscribe to user stats: {e}");
            let _ = send_message(
                &ws_sender,
                &ServerMessage::Error {
                    message: "Failed to open the stats feed.".to_string(),
                },
            )
            .await;
            return;
        }
    };

    // --- 2. Push Tasks ---
    // Each subscription item is a full replacement for what the client
    // displays, so the tasks just encode and forward.
    let activity_task = {
        let ws_sender = ws_sender.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let mut activity = activity;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    window = activity.next() => {
                        let Some(window) = window else { break };
                        let message = ServerMessage::Activity {
                            entries: window.into_iter().map(LogEntryResponse::from).collect(),
                        };
                        if !send_message(&ws_sender, &message).await {
                            break;
                        }
                    }
                }
            }
        })
    };
    let stats_task = {
        let ws_sender = ws_sender.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let mut stats = stats;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    progress = stats.next() => {
                        let Some(progress) = progress else { break };
                        let message = ServerMessage::Stats {
                            stats: StatsResponse::from(progress),
                        };
                        if !send_message(&ws_sender, &message).await {
                            break;
                        }
                    }
                }
            }
        })
    };

    // --- 3. Drain the client until it hangs up ---
    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            // The feed is push-only; anything else is ignored.
            _ => {}
        }
    }

    // --- 4. Cleanup ---
    token.cancel();
    let _ = activity_task.await;
    let _ = stats_task.await;
    info!("Feed connection closed for user: {}", user_id);
}
