//! In-process broadcast hub for the chat room.

use inkwell_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::broadcast;

/// Messages buffered per subscriber before slow clients start lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Longest message body relayed, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// A chat line as delivered to every connected client.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
    pub sent_at: Timestamp,
}

/// Fan-out of chat messages to every open WebSocket.
pub struct ChatHub {
    tx: broadcast::Sender<ChatMessage>,
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.tx.subscribe()
    }

    /// Relay `raw` from `username`. Returns the message actually sent, if any.
    pub fn publish(&self, username: &str, raw: &str) -> Option<ChatMessage> {
        let text = prepare_text(raw)?;
        let message = ChatMessage {
            username: username.to_string(),
            text,
            sent_at: chrono::Utc::now(),
        };
        // No subscribers is fine; the message simply goes nowhere.
        let _ = self.tx.send(message.clone());
        Some(message)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Trim, drop empty input, and cap the length.
fn prepare_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
}
