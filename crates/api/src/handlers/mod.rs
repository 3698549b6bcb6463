//! HTTP handlers, one module per resource.
//!
//! HTML handlers answer user-correctable problems with a flash message and a
//! redirect; JSON handlers return [`AppError`](crate::error::AppError).

pub mod auth;
pub mod chat;
pub mod profile;
pub mod tasks;
pub mod wiki;

use axum::http::StatusCode;
use axum::response::Html;
use inkwell_core::flash::FlashMessage;
use inkwell_db::models::user::User;

use crate::error::PageResult;
use crate::middleware::guard::LOGIN_REQUIRED_MESSAGE;
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// Fallback for unmatched routes.
pub async fn not_found(session: Session) -> (StatusCode, Html<String>) {
    let ctx = PageContext::load(&session).await;
    (StatusCode::NOT_FOUND, Html(views::not_found(&ctx)))
}

/// Load the account behind a logged-in session.
///
/// A session can outlive its account (e.g. the in-memory store restarted
/// while the cookie stayed valid). In that case the session is reset and
/// `None` is returned so the caller can send the visitor to `/login`.
pub(crate) async fn session_user(
    state: &AppState,
    session: &Session,
    username: &str,
) -> PageResult<Option<User>> {
    let user = state.store.find_user_by_username(username).await?;
    if user.is_none() {
        tracing::warn!(username, "Session refers to an unknown user; logging out");
        session.destroy().await;
        session.flash(FlashMessage::danger(LOGIN_REQUIRED_MESSAGE)).await;
    }
    Ok(user)
}
