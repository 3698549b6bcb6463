//! Shared response envelope for the JSON API.
//!
//! List and create endpoints answer `{ "data": ... }`; use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!` so the shape is checked at compile
//! time.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
