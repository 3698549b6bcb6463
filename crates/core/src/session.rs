//! Session payload and CSRF tokens.
//!
//! The whole session lives in the cookie as JSON-serialized
//! [`SessionData`]. Encryption is the HTTP layer's concern; this module
//! only stamps and checks the expiry carried inside the payload.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::flash::FlashMessage;

/// Length of generated CSRF tokens.
pub const CSRF_TOKEN_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The logged-in identity stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
}

/// Everything a browser carries between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub flash: Vec<FlashMessage>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
    /// Unix seconds after which the cookie is no longer honoured.
    #[serde(default)]
    pub expires_at: i64,
}

impl SessionData {
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    /// Move out the pending flash messages and validation errors.
    pub fn take_notices(&mut self) -> (Vec<FlashMessage>, Vec<String>) {
        (
            std::mem::take(&mut self.flash),
            std::mem::take(&mut self.errors),
        )
    }

    /// Serialize for the cookie, valid until `now + max_age_secs`.
    pub fn encode(&self, now: i64, max_age_secs: i64) -> Result<String, CoreError> {
        let mut payload = self.clone();
        payload.expires_at = now.saturating_add(max_age_secs);
        serde_json::to_string(&payload)
            .map_err(|e| CoreError::Internal(format!("Session serialization failed: {e}")))
    }

    /// Parse a decrypted cookie value. Malformed or expired payloads yield `None`.
    pub fn decode(value: &str, now: i64) -> Option<Self> {
        let data: SessionData = serde_json::from_str(value).ok()?;
        (data.expires_at > now).then_some(data)
    }
}

// ---------------------------------------------------------------------------
// CSRF tokens
// ---------------------------------------------------------------------------

/// Generate a random alphanumeric CSRF token.
pub fn generate_csrf_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CSRF_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compare two tokens without short-circuiting on the first differing byte.
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    let a = expected.as_bytes();
    let b = submitted.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
