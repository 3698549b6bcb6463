use async_trait::async_trait;
use inkwell_core::types::DbId;

use crate::error::StoreError;
use crate::models::page::{CreatePage, Page};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};
use crate::repositories::{PageRepo, TaskRepo, UserRepo};
use crate::store::Store;
use crate::DbPool;

/// [`Store`] backed by PostgreSQL through the repository structs.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_insert(e, "user", &input.username))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn set_avatar(&self, user_id: DbId, avatar: &str) -> Result<bool, StoreError> {
        Ok(UserRepo::update_avatar(&self.pool, user_id, avatar).await?)
    }

    async fn set_password_hash(&self, user_id: DbId, hash: &str) -> Result<bool, StoreError> {
        Ok(UserRepo::update_password(&self.pool, user_id, hash).await?)
    }

    async fn create_page(&self, input: &CreatePage) -> Result<Page, StoreError> {
        PageRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_insert(e, "page", &input.title))
    }

    async fn find_page_by_title(&self, title: &str) -> Result<Option<Page>, StoreError> {
        Ok(PageRepo::find_by_title(&self.pool, title).await?)
    }

    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        Ok(PageRepo::list(&self.pool).await?)
    }

    async fn list_tasks(&self, owner_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(TaskRepo::list_for_owner(&self.pool, owner_id).await?)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, StoreError> {
        Ok(TaskRepo::create(&self.pool, input).await?)
    }

    async fn delete_task(&self, owner_id: DbId, task_id: DbId) -> Result<bool, StoreError> {
        Ok(TaskRepo::delete(&self.pool, owner_id, task_id).await?)
    }
}
