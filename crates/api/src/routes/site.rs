//! Route definitions for the server-rendered site.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{auth, chat, profile, wiki};
use crate::state::AppState;

/// HTML routes. `max_upload_bytes` caps the avatar upload body.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(wiki::home))
        .route("/register", get(auth::show_register).post(auth::register))
        .route("/login", get(auth::show_login).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/wiki", get(wiki::index))
        .route("/wiki/{page_name}", get(wiki::show))
        .route("/create", get(wiki::show_create).post(wiki::create))
        .route(
            "/profile",
            get(profile::show).post(profile::upload_avatar).layer((
                DefaultBodyLimit::disable(),
                RequestBodyLimitLayer::new(max_upload_bytes),
            )),
        )
        .route("/profile/password", post(profile::change_password))
        .route("/chat", get(chat::show_chat))
        .route("/chat/ws", get(chat::chat_ws))
}
