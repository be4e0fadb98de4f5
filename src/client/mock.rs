//! Mock admin API client for testing
//!
//! An in-memory implementation of the API traits. Failures can be queued per
//! operation, either before the write is applied or after it (the gateway
//! case, where the server persisted the change but the caller saw an error).

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::api::{OrganizationApi, RecordApi, UserApi};
use super::models::{
    Membership, Organization, OrganizationDraft, Record, ResourceKind, User, UserDraft,
};
use super::pagination::{ListParams, Page};
use crate::error::{ApiError, Result};

/// A queued failure for one operation
#[derive(Debug)]
enum Failure {
    /// Fail without touching state
    Before(ApiError),
    /// Apply the write, then fail
    After(ApiError),
}

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockAdminClient::new()
///     .with_users(vec![user("u1", "Jane", "jane@x.com")])
///     .await
///     .fail_next("update_user", ApiError::Status(502))
///     .await;
/// ```
#[derive(Default)]
pub struct MockAdminClient {
    users: Arc<Mutex<Vec<User>>>,
    orgs: Arc<Mutex<Vec<Organization>>>,
    records: Arc<Mutex<HashMap<ResourceKind, Vec<Record>>>>,
    failures: Arc<Mutex<HashMap<&'static str, VecDeque<Failure>>>>,
    /// Accept writes without persisting them
    drop_writes: Arc<Mutex<bool>>,
    next_id: Arc<Mutex<u64>>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub get_user: usize,
    pub list_users: usize,
    pub create_user: usize,
    pub update_user: usize,
    pub delete_user: usize,
    pub get_organization: usize,
    pub list_organizations: usize,
    pub create_organization: usize,
    pub update_organization: usize,
    pub delete_organization: usize,
    pub get_record: usize,
    pub list_records: usize,
    pub create_record: usize,
    pub update_record: usize,
    pub delete_record: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.get_user
            + self.list_users
            + self.create_user
            + self.update_user
            + self.delete_user
            + self.get_organization
            + self.list_organizations
            + self.create_organization
            + self.update_organization
            + self.delete_organization
            + self.get_record
            + self.list_records
            + self.create_record
            + self.update_record
            + self.delete_record
    }
}

/// Build a live user for tests
pub fn user(id: &str, name: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        organizations: Vec::new(),
        status: None,
        created_at: Some(Utc::now()),
        updated_at: None,
        deleted_at: None,
        version: 1,
    }
}

/// Build an organization with member IDs for tests
pub fn organization(id: &str, name: &str, members: &[&str]) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
        slug: None,
        users: Some(Membership::Ids(
            members.iter().map(|m| m.to_string()).collect(),
        )),
    }
}

impl MockAdminClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock().await = users;
        self
    }

    pub async fn with_orgs(self, orgs: Vec<Organization>) -> Self {
        *self.orgs.lock().await = orgs;
        self
    }

    pub async fn with_records(self, kind: ResourceKind, records: Vec<Record>) -> Self {
        self.records.lock().await.insert(kind, records);
        self
    }

    /// Fail the next call to `op` without applying it.
    pub async fn fail_next(self, op: &'static str, error: ApiError) -> Self {
        self.push_failure(op, Failure::Before(error)).await;
        self
    }

    /// Apply the next write for `op`, then report `error` to the caller.
    pub async fn fail_after_write(self, op: &'static str, error: ApiError) -> Self {
        self.push_failure(op, Failure::After(error)).await;
        self
    }

    /// Accept every write but never persist it.
    pub async fn dropping_writes(self) -> Self {
        *self.drop_writes.lock().await = true;
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    pub async fn orgs(&self) -> Vec<Organization> {
        self.orgs.lock().await.clone()
    }

    pub async fn records(&self, kind: ResourceKind) -> Vec<Record> {
        self.records
            .lock()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    async fn push_failure(&self, op: &'static str, failure: Failure) {
        self.failures
            .lock()
            .await
            .entry(op)
            .or_default()
            .push_back(failure);
    }

    async fn take_failure(&self, op: &str) -> Option<Failure> {
        self.failures
            .lock()
            .await
            .get_mut(op)
            .and_then(|q| q.pop_front())
    }

    /// Fail early if a `Before` failure is queued; return a deferred error
    /// for `After` failures.
    async fn check(&self, op: &str) -> Result<Option<ApiError>> {
        match self.take_failure(op).await {
            Some(Failure::Before(e)) => Err(e.into()),
            Some(Failure::After(e)) => Ok(Some(e)),
            None => Ok(None),
        }
    }

    async fn is_dropping(&self) -> bool {
        *self.drop_writes.lock().await
    }

    async fn next_id(&self, prefix: &str) -> String {
        let mut n = self.next_id.lock().await;
        *n += 1;
        format!("{}-{}", prefix, n)
    }

    fn finish<T>(value: T, deferred: Option<ApiError>) -> Result<T> {
        match deferred {
            Some(e) => Err(e.into()),
            None => Ok(value),
        }
    }
}

fn page<T: Clone>(items: &[T], params: &ListParams) -> Page<T> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(usize::MAX);
    Page {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: Some(items.len()),
    }
}

// ============================================================================
// UserApi Implementation
// ============================================================================

#[async_trait]
impl UserApi for MockAdminClient {
    async fn get_user(&self, id: &str) -> Result<User> {
        self.call_count.lock().await.get_user += 1;
        self.check("get_user").await?;

        self.users
            .lock()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {}", id)).into())
    }

    async fn list_users(&self, params: &ListParams) -> Result<Page<User>> {
        self.call_count.lock().await.list_users += 1;
        self.check("list_users").await?;

        Ok(page(&self.users.lock().await, params))
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        self.call_count.lock().await.create_user += 1;
        let deferred = self.check("create_user").await?;

        let mut created = user(&self.next_id("user").await, &draft.name, &draft.email);
        created.organizations = draft.organizations.clone();
        if !self.is_dropping().await {
            self.users.lock().await.push(created.clone());
        }
        Self::finish(created, deferred)
    }

    async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<User> {
        self.call_count.lock().await.update_user += 1;
        let deferred = self.check("update_user").await?;

        let mut users = self.users.lock().await;
        let existing = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;

        let mut updated = existing.clone();
        updated.name = draft.name.clone();
        updated.email = draft.email.clone();
        updated.organizations = draft.organizations.clone();
        updated.updated_at = Some(Utc::now());
        updated.version += 1;
        if !self.is_dropping().await {
            *existing = updated.clone();
        }
        Self::finish(updated, deferred)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.call_count.lock().await.delete_user += 1;
        let deferred = self.check("delete_user").await?;

        let mut users = self.users.lock().await;
        let existing = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;
        if !self.is_dropping().await {
            existing.deleted_at = Some(Utc::now());
        }
        Self::finish((), deferred)
    }
}

// ============================================================================
// OrganizationApi Implementation
// ============================================================================

#[async_trait]
impl OrganizationApi for MockAdminClient {
    async fn get_organization(&self, id: &str) -> Result<Organization> {
        self.call_count.lock().await.get_organization += 1;
        self.check("get_organization").await?;

        self.orgs
            .lock()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("organization {}", id)).into())
    }

    async fn list_organizations(&self, params: &ListParams) -> Result<Page<Organization>> {
        self.call_count.lock().await.list_organizations += 1;
        self.check("list_organizations").await?;

        // The list endpoint only reports member counts
        let orgs: Vec<Organization> = self
            .orgs
            .lock()
            .await
            .iter()
            .map(|o| Organization {
                users: Some(Membership::Count(o.member_count())),
                ..o.clone()
            })
            .collect();
        Ok(page(&orgs, params))
    }

    async fn create_organization(&self, draft: &OrganizationDraft) -> Result<Organization> {
        self.call_count.lock().await.create_organization += 1;
        let deferred = self.check("create_organization").await?;

        let created = Organization {
            id: self.next_id("org").await,
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            users: Some(Membership::Ids(draft.users.clone().unwrap_or_default())),
        };
        if !self.is_dropping().await {
            self.orgs.lock().await.push(created.clone());
        }
        Self::finish(created, deferred)
    }

    async fn update_organization(
        &self,
        id: &str,
        draft: &OrganizationDraft,
    ) -> Result<Organization> {
        self.call_count.lock().await.update_organization += 1;
        let deferred = self.check("update_organization").await?;

        let mut orgs = self.orgs.lock().await;
        let existing = orgs
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("organization {}", id)))?;

        let mut updated = existing.clone();
        updated.name = draft.name.clone();
        if draft.slug.is_some() {
            updated.slug = draft.slug.clone();
        }
        if let Some(users) = &draft.users {
            updated.users = Some(Membership::Ids(users.clone()));
        }
        if !self.is_dropping().await {
            *existing = updated.clone();
        }
        Self::finish(updated, deferred)
    }

    async fn delete_organization(&self, id: &str) -> Result<()> {
        self.call_count.lock().await.delete_organization += 1;
        let deferred = self.check("delete_organization").await?;

        let mut orgs = self.orgs.lock().await;
        if !orgs.iter().any(|o| o.id == id) {
            return Err(ApiError::NotFound(format!("organization {}", id)).into());
        }
        if !self.is_dropping().await {
            orgs.retain(|o| o.id != id);
        }
        Self::finish((), deferred)
    }
}

// ============================================================================
// RecordApi Implementation
// ============================================================================

#[async_trait]
impl RecordApi for MockAdminClient {
    async fn get_record(&self, kind: ResourceKind, id: &str) -> Result<Record> {
        self.call_count.lock().await.get_record += 1;
        self.check("get_record").await?;

        self.records(kind)
            .await
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(kind.entity_key(id)).into())
    }

    async fn list_records(&self, kind: ResourceKind, params: &ListParams) -> Result<Page<Record>> {
        self.call_count.lock().await.list_records += 1;
        self.check("list_records").await?;

        Ok(page(&self.records(kind).await, params))
    }

    async fn create_record(&self, kind: ResourceKind, body: &Map<String, Value>) -> Result<Record> {
        self.call_count.lock().await.create_record += 1;
        let deferred = self.check("create_record").await?;

        let mut fields = body.clone();
        let name = fields
            .remove("name")
            .and_then(|v| v.as_str().map(str::to_string));
        fields.remove("id");
        let record = Record {
            id: self.next_id(kind.segment()).await,
            name,
            fields,
        };
        if !self.is_dropping().await {
            self.records
                .lock()
                .await
                .entry(kind)
                .or_default()
                .push(record.clone());
        }
        Self::finish(record, deferred)
    }

    async fn update_record(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Record> {
        self.call_count.lock().await.update_record += 1;
        let deferred = self.check("update_record").await?;

        let mut records = self.records.lock().await;
        let existing = records
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ApiError::NotFound(kind.entity_key(id)))?;

        let mut updated = existing.clone();
        for (key, value) in body {
            match key.as_str() {
                "id" => {}
                "name" => updated.name = value.as_str().map(str::to_string),
                _ => {
                    updated.fields.insert(key.clone(), value.clone());
                }
            }
        }
        if !self.is_dropping().await {
            *existing = updated.clone();
        }
        Self::finish(updated, deferred)
    }

    async fn delete_record(&self, kind: ResourceKind, id: &str) -> Result<()> {
        self.call_count.lock().await.delete_record += 1;
        let deferred = self.check("delete_record").await?;

        let mut records = self.records.lock().await;
        let list = records.entry(kind).or_default();
        if !list.iter().any(|r| r.id == id) {
            return Err(ApiError::NotFound(kind.entity_key(id)).into());
        }
        if !self.is_dropping().await {
            list.retain(|r| r.id != id);
        }
        Self::finish((), deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_list_roundtrip() {
        let mock = MockAdminClient::new();
        let created = mock
            .create_user(&UserDraft::new("Jane", "jane@x.com"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());

        let page = mock.list_users(&ListParams::new()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Jane");
        assert_eq!(page.items[0].email, "jane@x.com");
        assert_eq!(page.items[0].id, created.id);
    }

    #[tokio::test]
    async fn test_fail_after_write_persists() {
        let mock = MockAdminClient::new()
            .fail_after_write("create_user", ApiError::Status(502))
            .await;

        let err = mock
            .create_user(&UserDraft::new("Jane", "jane@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(mock.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_org_list_reports_counts() {
        let mock = MockAdminClient::new()
            .with_orgs(vec![organization("o1", "Acme", &["u1", "u2"])])
            .await;

        let listed = mock.list_organizations(&ListParams::new()).await.unwrap();
        assert_eq!(listed.items[0].users, Some(Membership::Count(2)));

        let single = mock.get_organization("o1").await.unwrap();
        assert_eq!(single.member_ids(), vec!["u1", "u2"]);
    }
}
