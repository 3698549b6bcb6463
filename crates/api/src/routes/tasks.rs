//! Route definitions for the JSON task API.
//!
//! Registered under `/api/tasks`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// ```text
/// GET    /          list_tasks
/// POST   /          create_task
/// DELETE /{id}      delete_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/{id}", delete(tasks::delete_task))
}
