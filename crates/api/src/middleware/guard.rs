//! Login guard for HTML pages.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use inkwell_core::flash::FlashMessage;

use crate::session::Session;

/// Flash shown to anonymous visitors of a guarded page.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to view this page.";

/// The logged-in username.
///
/// Anonymous requests get a danger flash and a `303` redirect to `/login`
/// before the handler runs, so nothing downstream executes.
#[derive(Debug, Clone)]
pub struct RequireLogin(pub String);

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.username().await {
            Some(username) => Ok(RequireLogin(username)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "Anonymous visit to guarded page");
                session.flash(FlashMessage::danger(LOGIN_REQUIRED_MESSAGE)).await;
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}
