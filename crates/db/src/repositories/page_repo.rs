//! Repository for the `pages` table.

use sqlx::PgPool;

use crate::models::page::{CreatePage, Page};

/// Select list for pages joined to `users u` for the author name.
const COLUMNS: &str = "p.id, p.title, p.content, p.author_id, u.username AS author_name, \
                       p.is_markdown, p.created_at";

/// Provides create and lookup operations for wiki pages.
pub struct PageRepo;

impl PageRepo {
    /// Insert a new page, returning it with the author's name resolved.
    pub async fn create(pool: &PgPool, input: &CreatePage) -> Result<Page, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                INSERT INTO pages (title, content, author_id, is_markdown)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS} FROM p LEFT JOIN users u ON u.id = p.author_id"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.author_id)
            .bind(input.is_markdown)
            .fetch_one(pool)
            .await
    }

    /// Find a page by its exact title.
    pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Page>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pages p LEFT JOIN users u ON u.id = p.author_id
             WHERE p.title = $1"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// List all pages ordered by title.
    pub async fn list(pool: &PgPool) -> Result<Vec<Page>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pages p LEFT JOIN users u ON u.id = p.author_id
             ORDER BY p.title ASC"
        );
        sqlx::query_as::<_, Page>(&query).fetch_all(pool).await
    }
}
