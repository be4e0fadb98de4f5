//! Generic record API for rules, roles, creatives and keywords

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::client::models::{Record, ResourceKind};
use crate::client::pagination::{ListParams, MAX_PAGE_SIZE, Page};
use crate::error::Result;

/// CRUD over resource kinds the client treats as opaque JSON
#[async_trait]
pub trait RecordApi: Send + Sync {
    async fn get_record(&self, kind: ResourceKind, id: &str) -> Result<Record>;

    async fn list_records(&self, kind: ResourceKind, params: &ListParams) -> Result<Page<Record>>;

    /// Walk every page of `kind`
    async fn list_all_records(&self, kind: ResourceKind) -> Result<Vec<Record>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let params = ListParams::new().limit(MAX_PAGE_SIZE).offset(offset);
            let page = self.list_records(kind, &params).await?;
            let more = page.has_more(offset, MAX_PAGE_SIZE);
            offset += page.items.len();
            all.extend(page.items);
            if !more {
                return Ok(all);
            }
        }
    }

    async fn create_record(&self, kind: ResourceKind, body: &Map<String, Value>) -> Result<Record>;

    async fn update_record(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Record>;

    async fn delete_record(&self, kind: ResourceKind, id: &str) -> Result<()>;
}
