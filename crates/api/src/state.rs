use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use inkwell_db::DynStore;

use crate::chat::ChatHub;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Users, pages and tasks.
    pub store: DynStore,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Encrypts and decrypts the session cookie.
    pub cookie_key: Key,
    /// Broadcast hub for the chat room.
    pub chat: Arc<ChatHub>,
}
