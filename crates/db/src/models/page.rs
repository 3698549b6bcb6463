//! Wiki page model and DTOs.

use inkwell_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pages` table joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Page {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub author_id: Option<DbId>,
    pub author_name: Option<String>,
    pub is_markdown: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new page.
#[derive(Debug, Clone)]
pub struct CreatePage {
    pub title: String,
    pub content: String,
    pub author_id: Option<DbId>,
    pub is_markdown: bool,
}
