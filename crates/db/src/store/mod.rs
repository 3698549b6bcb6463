//! The persistence seam used by the HTTP layer.
//!
//! Handlers talk to an `Arc<dyn Store>` so the same routes run against the
//! in-process [`MemoryStore`] (development, tests) or [`PgStore`]
//! (when `DATABASE_URL` is set).

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use inkwell_core::types::DbId;

use crate::error::StoreError;
use crate::models::page::{CreatePage, Page};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Shared handle stored in application state.
pub type DynStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    // -- users --------------------------------------------------------------

    /// Create a user. A taken username yields [`StoreError::Duplicate`].
    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Returns `false` when no user has `user_id`.
    async fn set_avatar(&self, user_id: DbId, avatar: &str) -> Result<bool, StoreError>;

    /// Returns `false` when no user has `user_id`.
    async fn set_password_hash(&self, user_id: DbId, hash: &str) -> Result<bool, StoreError>;

    // -- pages --------------------------------------------------------------

    /// Create a page. A taken title yields [`StoreError::Duplicate`].
    async fn create_page(&self, input: &CreatePage) -> Result<Page, StoreError>;

    async fn find_page_by_title(&self, title: &str) -> Result<Option<Page>, StoreError>;

    /// All pages ordered by title.
    async fn list_pages(&self) -> Result<Vec<Page>, StoreError>;

    // -- tasks --------------------------------------------------------------

    /// An owner's tasks in creation order.
    async fn list_tasks(&self, owner_id: DbId) -> Result<Vec<Task>, StoreError>;

    async fn create_task(&self, input: &CreateTask) -> Result<Task, StoreError>;

    /// Returns `false` when the task is missing or owned by someone else.
    async fn delete_task(&self, owner_id: DbId, task_id: DbId) -> Result<bool, StoreError>;
}
