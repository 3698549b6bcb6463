pub mod health;
pub mod site;
pub mod tasks;

use axum::routing::post;
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// Build the HTML site.
///
/// ```text
/// /                       home
/// /register               form, submit
/// /login                  form, submit
/// /logout                 submit
/// /wiki                   index
/// /wiki/{page_name}       show
/// /create                 form, submit (login required)
/// /profile                show, avatar upload (login required)
/// /profile/password       submit (login required)
/// /chat                   page (login required)
/// /chat/ws                WebSocket (login required)
/// ```
pub fn page_routes(config: &ServerConfig) -> Router<AppState> {
    site::router(config.max_upload_bytes)
}

/// Build the `/api` route tree.
///
/// ```text
/// /login                  token exchange (public)
/// /tasks                  list, create (bearer token)
/// /tasks/{id}             delete (bearer token)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::tasks::api_login))
        .nest("/tasks", tasks::router())
}
