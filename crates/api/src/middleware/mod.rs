//! Request extractors that gate access.
//!
//! - [`auth::AuthUser`] -- JWT Bearer authentication for the JSON API.
//! - [`guard::RequireLogin`] -- session login for HTML pages.

pub mod auth;
pub mod guard;
