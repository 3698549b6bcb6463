//! The chat page and its WebSocket endpoint.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::chat::ChatHub;
use crate::middleware::guard::RequireLogin;
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// GET /chat
pub async fn show_chat(RequireLogin(_): RequireLogin, session: Session) -> Html<String> {
    let ctx = PageContext::load(&session).await;
    Html(views::chat(&ctx))
}

/// GET /chat/ws
///
/// Upgrades to a WebSocket bound to the logged-in username.
pub async fn chat_ws(
    RequireLogin(username): RequireLogin,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.chat, username))
}

/// Relay one connection.
///
/// A spawned sender task forwards hub broadcasts to the socket while the
/// current task publishes every inbound text frame.
async fn handle_socket(socket: WebSocket, hub: Arc<ChatHub>, username: String) {
    tracing::info!(%username, "Chat connected");

    let mut rx = hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    let sender_username = username.clone();
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    let json = match serde_json::to_string(&message) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize chat message");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(username = %sender_username, "Chat sink closed");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(username = %sender_username, skipped, "Chat client lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Some(message) = hub.publish(&username, text.as_str()) {
                    tracing::debug!(%username, chars = message.text.chars().count(), "Chat message");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%username, error = %e, "Chat receive error");
                break;
            }
        }
    }

    send_task.abort();
    tracing::info!(%username, "Chat disconnected");
}
