//! Extractors for the JSON API whose rejections use the [`AppError`] envelope.
//!
//! Axum's own `Json` and `Path` reject with plain-text bodies; these wrappers
//! run the same extraction and turn failures into `{"error", "code"}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body. Malformed or incomplete bodies are `400 BAD_REQUEST`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters. Unparseable segments are `400 BAD_REQUEST`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
