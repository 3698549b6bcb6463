use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use inkwell_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::page::{CreatePage, Page};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    /// Keyed by username.
    users: BTreeMap<String, User>,
    /// Keyed by title.
    pages: BTreeMap<String, Page>,
    /// Keyed by id.
    tasks: BTreeMap<DbId, Task>,
    last_id: DbId,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn user_by_id_mut(&mut self, id: DbId) -> Option<&mut User> {
        self.users.values_mut().find(|u| u.id == id)
    }
}

/// Process-local [`Store`]; contents vanish on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&input.username) {
            return Err(StoreError::Duplicate {
                entity: "user",
                key: input.username.clone(),
            });
        }
        let user = User {
            id: tables.next_id(),
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            avatar: None,
            created_at: Utc::now(),
        };
        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(username).cloned())
    }

    async fn set_avatar(&self, user_id: DbId, avatar: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.user_by_id_mut(user_id) {
            Some(user) => {
                user.avatar = Some(avatar.to_string());
                true
            }
            None => false,
        })
    }

    async fn set_password_hash(&self, user_id: DbId, hash: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.user_by_id_mut(user_id) {
            Some(user) => {
                user.password_hash = hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn create_page(&self, input: &CreatePage) -> Result<Page, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.pages.contains_key(&input.title) {
            return Err(StoreError::Duplicate {
                entity: "page",
                key: input.title.clone(),
            });
        }
        let author_name = input.author_id.and_then(|id| {
            tables
                .users
                .values()
                .find(|u| u.id == id)
                .map(|u| u.username.clone())
        });
        let page = Page {
            id: tables.next_id(),
            title: input.title.clone(),
            content: input.content.clone(),
            author_id: input.author_id,
            author_name,
            is_markdown: input.is_markdown,
            created_at: Utc::now(),
        };
        tables.pages.insert(page.title.clone(), page.clone());
        Ok(page)
    }

    async fn find_page_by_title(&self, title: &str) -> Result<Option<Page>, StoreError> {
        Ok(self.tables.read().await.pages.get(title).cloned())
    }

    async fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        // BTreeMap iteration is already ordered by title.
        Ok(self.tables.read().await.pages.values().cloned().collect())
    }

    async fn list_tasks(&self, owner_id: DbId) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = Task {
            id: tables.next_id(),
            owner_id: input.owner_id,
            title: input.title.clone(),
            completed: false,
            created_at: Utc::now(),
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, owner_id: DbId, task_id: DbId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get(&task_id) {
            Some(task) if task.owner_id == owner_id => {
                tables.tasks.remove(&task_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
