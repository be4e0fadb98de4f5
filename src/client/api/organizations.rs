//! Organization API trait for CRUD operations

use async_trait::async_trait;

use crate::client::models::{Organization, OrganizationDraft};
use crate::client::pagination::{ListParams, MAX_PAGE_SIZE, Page};
use crate::error::Result;

/// Organization management operations for the admin API
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    /// `GET /organization/get/{id}`; membership comes back as user IDs.
    async fn get_organization(&self, id: &str) -> Result<Organization>;

    /// `GET /organization/list`; membership comes back as a count.
    async fn list_organizations(&self, params: &ListParams) -> Result<Page<Organization>>;

    /// Walk every page of `/organization/list`.
    async fn list_all_organizations(&self) -> Result<Vec<Organization>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let params = ListParams::new().limit(MAX_PAGE_SIZE).offset(offset);
            let page = self.list_organizations(&params).await?;
            let more = page.has_more(offset, MAX_PAGE_SIZE);
            offset += page.items.len();
            all.extend(page.items);
            if !more {
                return Ok(all);
            }
        }
    }

    async fn create_organization(&self, draft: &OrganizationDraft) -> Result<Organization>;

    async fn update_organization(
        &self,
        id: &str,
        draft: &OrganizationDraft,
    ) -> Result<Organization>;

    async fn delete_organization(&self, id: &str) -> Result<()>;
}
