/// Errors surfaced by every [`Store`](crate::store::Store) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write; the existing row is untouched.
    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl StoreError {
    /// Convert a sqlx error, mapping unique violations to [`StoreError::Duplicate`].
    pub fn from_insert(err: sqlx::Error, entity: &'static str, key: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Duplicate {
                    entity,
                    key: key.to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}
