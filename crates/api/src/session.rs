//! Cookie-backed session middleware and the request-scoped [`Session`] handle.
//!
//! [`manage_session`] opens the `session` cookie before the handler runs and
//! re-seals it afterwards, but only when something changed the session. The
//! cookie is encrypted with axum-extra's private jar (AES-256-GCM, cookie
//! name bound as associated data). A cookie that fails to open is treated as
//! an anonymous session.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use inkwell_core::error::CoreError;
use inkwell_core::flash::FlashMessage;
use inkwell_core::session::{generate_csrf_token, SessionData, SessionUser};
use sha2::{Digest, Sha512};
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug)]
struct Inner {
    data: SessionData,
    dirty: bool,
}

/// Mutable view of the current request's session.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { data, dirty: false })),
        }
    }

    /// The logged-in username, if any.
    pub async fn username(&self) -> Option<String> {
        self.inner.lock().await.data.username().map(str::to_owned)
    }

    /// Mark `username` as authenticated.
    pub async fn login(&self, username: &str) {
        let mut inner = self.inner.lock().await;
        inner.data.user = Some(SessionUser {
            username: username.to_string(),
        });
        inner.dirty = true;
    }

    /// Drop every key: identity, pending notices and the CSRF token.
    pub async fn destroy(&self) {
        let mut inner = self.inner.lock().await;
        inner.data = SessionData::default();
        inner.dirty = true;
    }

    /// Queue a flash message for the next rendered page.
    pub async fn flash(&self, message: FlashMessage) {
        let mut inner = self.inner.lock().await;
        inner.data.flash.push(message);
        inner.dirty = true;
    }

    /// Queue validation errors for the next rendered page.
    pub async fn set_errors(&self, errors: Vec<String>) {
        let mut inner = self.inner.lock().await;
        inner.data.errors = errors;
        inner.dirty = true;
    }

    /// Drain pending flash messages and validation errors.
    pub async fn take_notices(&self) -> (Vec<FlashMessage>, Vec<String>) {
        let mut inner = self.inner.lock().await;
        let notices = inner.data.take_notices();
        if !notices.0.is_empty() || !notices.1.is_empty() {
            inner.dirty = true;
        }
        notices
    }

    /// The session's CSRF token, created on first use.
    pub async fn csrf_token(&self) -> String {
        let mut inner = self.inner.lock().await;
        if let Some(token) = &inner.data.csrf_token {
            return token.clone();
        }
        let token = generate_csrf_token();
        inner.data.csrf_token = Some(token.clone());
        inner.dirty = true;
        token
    }

    /// The CSRF token without creating one.
    pub async fn existing_csrf_token(&self) -> Option<String> {
        self.inner.lock().await.data.csrf_token.clone()
    }

    /// A copy of the data if it changed during the request.
    async fn changed(&self) -> Option<SessionData> {
        let inner = self.inner.lock().await;
        inner.dirty.then(|| inner.data.clone())
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::InternalError("Session middleware is not installed".into()))
    }
}

/// Derive the cookie encryption key from the configured secret.
pub fn session_key(secret: &str) -> Result<Key, CoreError> {
    if secret.is_empty() {
        return Err(CoreError::Validation(
            "Session secret must not be empty".into(),
        ));
    }
    // SHA-512 yields exactly the 64 bytes `Key::from` requires.
    Ok(Key::from(Sha512::digest(secret.as_bytes()).as_slice()))
}

/// Read the session from the request's cookies.
pub fn open_session(headers: &HeaderMap, key: &Key, now: i64) -> SessionData {
    PrivateCookieJar::<Key>::from_headers(headers, key.clone())
        .get(SESSION_COOKIE)
        .and_then(|cookie| SessionData::decode(cookie.value(), now))
        .unwrap_or_default()
}

/// Encrypt `data` into a jar carrying the replacement session cookie.
pub fn seal_session(
    data: &SessionData,
    key: &Key,
    config: &ServerConfig,
    now: i64,
) -> Result<PrivateCookieJar, CoreError> {
    let value = data.encode(now, config.session.max_age_secs)?;
    Ok(PrivateCookieJar::<Key>::new(key.clone()).add(session_cookie(value, config)))
}

/// Middleware: open the session cookie, run the handler, re-seal if changed.
pub async fn manage_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let now = chrono::Utc::now().timestamp();

    let data = open_session(request.headers(), &state.cookie_key, now);
    let session = Session::new(data);
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    match session.changed().await {
        Some(data) => match seal_session(&data, &state.cookie_key, &state.config, now) {
            Ok(jar) => (jar, response).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to seal session");
                response
            }
        },
        None => response,
    }
}

fn session_cookie(value: String, config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.is_production())
        .max_age(time::Duration::seconds(config.session.max_age_secs))
        .build()
}
