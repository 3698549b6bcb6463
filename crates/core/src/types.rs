/// Primary key type used by every table.
pub type DbId = i64;

/// UTC timestamp stored alongside rows.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
