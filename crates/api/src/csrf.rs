//! CSRF checks for state-changing form submissions.
//!
//! The token lives in the session and is embedded in every form as a hidden
//! `_csrf` field. Scripts may send it in the `x-csrf-token` header instead.

use axum::http::HeaderMap;
use inkwell_core::session::tokens_match;

use crate::error::PageError;
use crate::session::Session;

/// Name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "_csrf";

/// Header alternative to the form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Reject the request unless the submitted token matches the session's.
pub async fn verify(session: &Session, headers: &HeaderMap, form_token: &str) -> Result<(), PageError> {
    let submitted = if form_token.is_empty() {
        headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    } else {
        form_token
    };

    match session.existing_csrf_token().await {
        Some(expected) if !submitted.is_empty() && tokens_match(&expected, submitted) => Ok(()),
        _ => {
            tracing::warn!("Rejected form submission with invalid CSRF token");
            Err(PageError::Forbidden(
                "Invalid or missing CSRF token. Reload the page and try again.".into(),
            ))
        }
    }
}
