//! User API trait for CRUD operations

use async_trait::async_trait;

use crate::client::models::{User, UserDraft};
use crate::client::pagination::{ListParams, MAX_PAGE_SIZE, Page};
use crate::error::Result;

/// User management operations for the admin API
#[async_trait]
pub trait UserApi: Send + Sync {
    // ========================================================================
    // Read Operations
    // ========================================================================

    /// `GET /user/get/{id}`
    async fn get_user(&self, id: &str) -> Result<User>;

    /// `GET /user/list?limit&offset`
    async fn list_users(&self, params: &ListParams) -> Result<Page<User>>;

    /// Walk every page of `/user/list`.
    async fn list_all_users(&self) -> Result<Vec<User>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let params = ListParams::new().limit(MAX_PAGE_SIZE).offset(offset);
            let page = self.list_users(&params).await?;
            let more = page.has_more(offset, MAX_PAGE_SIZE);
            offset += page.items.len();
            all.extend(page.items);
            if !more {
                return Ok(all);
            }
        }
    }

    // ========================================================================
    // Write Operations
    // ========================================================================

    /// `POST /user/create`. The server assigns the ID.
    async fn create_user(&self, draft: &UserDraft) -> Result<User>;

    /// `PUT /user/update/{id}`. Organization names are a full replacement.
    async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<User>;

    /// `DELETE /user/delete/{id}` (soft delete on the server)
    async fn delete_user(&self, id: &str) -> Result<()>;
}
