//! Verified writes
//!
//! The gateway in front of the admin API intermittently answers `502` for
//! writes the backend has already applied. Every mutation made by the
//! commands goes through [`VerifiedWriter`], which:
//!
//! 1. validates the form locally and refuses to send anything invalid
//! 2. rejects a second mutation of the same entity while one is in flight
//! 3. issues the write, retrying transient failures with [`with_retry`];
//!    before each retry it first checks whether the previous attempt landed
//! 4. reads the entity back by ID and compares it with what was submitted,
//!    falling back to a search of the full listing
//! 5. if the write errored and nothing matching is found, repeats the whole
//!    operation a bounded number of times
//!
//! Deletes check existence first (absent means done, without calling the
//! delete endpoint) and re-check after a failed delete call.

use std::future::Future;

use log::{debug, info, warn};
use serde_json::{Map, Value};

pub mod inflight;
pub mod validate;

pub use inflight::{InFlight, InFlightTicket};

use crate::client::models::{
    Lifecycle, Organization, OrganizationDraft, Record, ResourceKind, User, UserDraft,
};
use crate::client::{AdminApi, RetryPolicy, is_transient, with_retry};
use crate::config::RetrySettings;
use crate::error::{ApiError, Result};
use validate::{validate_name, validate_organization, validate_user};

/// How a delete was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete; the delete endpoint was not called
    AlreadyAbsent,
}

enum Attempt<T> {
    Written(T),
    /// An earlier attempt turned out to have been applied
    Found(T),
}

/// Mutations with local validation, retry and read-back confirmation.
pub struct VerifiedWriter<'a, C> {
    client: &'a C,
    policy: RetryPolicy,
    operation_attempts: u32,
    in_flight: InFlight,
}

impl<'a, C: AdminApi> VerifiedWriter<'a, C> {
    pub fn new(client: &'a C, settings: &RetrySettings) -> Self {
        Self {
            client,
            policy: RetryPolicy::from(settings),
            operation_attempts: settings.operation_attempts,
            in_flight: InFlight::new(),
        }
    }

    /// Share an in-flight set with other writers
    pub fn with_in_flight(mut self, in_flight: InFlight) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn client(&self) -> &'a C {
        self.client
    }

    async fn read<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        with_retry(&self.policy, is_transient, |_| op()).await
    }

    /// Run `write` until `verify` confirms it or the attempts are used up.
    ///
    /// `verify` receives the entity the API returned, or `None` when the write
    /// failed and it has to search on its own.
    async fn write_verified<T, W, WFut, V, VFut>(
        &self,
        what: &str,
        mut write: W,
        verify: V,
    ) -> Result<T>
    where
        W: FnMut() -> WFut,
        WFut: Future<Output = Result<T>>,
        V: Fn(Option<T>) -> VFut,
        VFut: Future<Output = Option<T>>,
    {
        let attempts = self.operation_attempts.max(1);
        let mut operation = 1;

        loop {
            let result = with_retry(&self.policy, is_transient, |attempt| {
                let recheck = (attempt > 1).then(|| verify(None));
                let pending = write();
                async move {
                    if let Some(recheck) = recheck {
                        if let Some(found) = recheck.await {
                            return Ok(Attempt::Found(found));
                        }
                    }
                    pending.await.map(Attempt::Written)
                }
            })
            .await;

            match result {
                Ok(Attempt::Found(found)) => {
                    info!("{} was applied despite the failed response", what);
                    return Ok(found);
                }
                Ok(Attempt::Written(written)) => {
                    return match verify(Some(written)).await {
                        Some(confirmed) => Ok(confirmed),
                        None => {
                            warn!("{} was accepted but does not read back", what);
                            Err(ApiError::Unconfirmed(what.to_string()).into())
                        }
                    };
                }
                Err(err) if err.requires_sign_in() => return Err(err),
                Err(err) => {
                    warn!("{} failed: {}; checking whether it was applied", what, err);
                    if let Some(found) = verify(None).await {
                        info!("{} was applied despite the failed response", what);
                        return Ok(found);
                    }
                    if !err.outcome_unknown() && !is_transient(&err) {
                        debug!("{} was rejected; not repeating", what);
                        return Err(err);
                    }
                    if operation >= attempts {
                        return Err(err);
                    }
                    operation += 1;
                    info!("Repeating {} (attempt {}/{})", what, operation, attempts);
                }
            }
        }
    }

    async fn delete_verified<E, EFut, D, DFut>(
        &self,
        what: &str,
        mut exists: E,
        mut delete: D,
    ) -> Result<DeleteOutcome>
    where
        E: FnMut() -> EFut,
        EFut: Future<Output = Result<bool>>,
        D: FnMut() -> DFut,
        DFut: Future<Output = Result<()>>,
    {
        if !self.read(&mut exists).await? {
            info!("{} is already absent", what);
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        match with_retry(&self.policy, is_transient, |_| delete()).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(err) if err.requires_sign_in() => Err(err),
            Err(err) => {
                warn!("Deleting {} failed: {}; checking whether it is gone", what, err);
                match self.read(&mut exists).await {
                    Ok(false) => Ok(DeleteOutcome::Deleted),
                    _ => Err(err),
                }
            }
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    async fn confirm_user(&self, id: Option<&str>, draft: &UserDraft) -> Option<User> {
        if let Some(id) = id {
            match self.read(|| self.client.get_user(id)).await {
                Ok(user) if user.lifecycle() == Lifecycle::Live && draft.is_applied_to(&user) => {
                    return Some(user);
                }
                Ok(_) => debug!("Read-back of user {} differs from the submitted form", id),
                Err(err) => debug!("Read-back of user {} failed: {}", id, err),
            }
        }

        match self.read(|| self.client.list_all_users()).await {
            Ok(users) => users.into_iter().find(|u| {
                u.lifecycle() == Lifecycle::Live
                    && id.is_none_or(|id| u.id == id)
                    && u.matches_identity(&draft.name, &draft.email)
            }),
            Err(err) => {
                debug!("Listing users for verification failed: {}", err);
                None
            }
        }
    }

    /// Create a user. `known` are the rows already loaded, used for the
    /// duplicate email check.
    pub async fn create_user(&self, draft: &UserDraft, known: &[User]) -> Result<User> {
        validate_user(draft, known, None)?;
        let _ticket = self
            .in_flight
            .acquire(format!("user:new:{}", draft.email.to_lowercase()))?;

        let client = self.client;
        self.write_verified(
            "user create",
            move || client.create_user(draft),
            move |written: Option<User>| async move {
                let id = written.map(|u| u.id);
                self.confirm_user(id.as_deref(), draft).await
            },
        )
        .await
    }

    pub async fn update_user(&self, id: &str, draft: &UserDraft, known: &[User]) -> Result<User> {
        validate_user(draft, known, Some(id))?;
        let key = ResourceKind::User.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.write_verified(
            &key,
            move || client.update_user(id, draft),
            move |_: Option<User>| self.confirm_user(Some(id), draft),
        )
        .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<DeleteOutcome> {
        let key = ResourceKind::User.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.delete_verified(
            &key,
            move || async move {
                match client.get_user(id).await {
                    Ok(user) => Ok(user.lifecycle() == Lifecycle::Live),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            move || client.delete_user(id),
        )
        .await
    }

    // ========================================================================
    // Organizations
    // ========================================================================

    async fn confirm_organization(
        &self,
        id: Option<&str>,
        draft: &OrganizationDraft,
    ) -> Option<Organization> {
        if let Some(id) = id {
            match self.read(|| self.client.get_organization(id)).await {
                Ok(org) if draft.is_applied_to(&org) => return Some(org),
                Ok(_) => debug!("Read-back of organization {} differs", id),
                Err(err) => debug!("Read-back of organization {} failed: {}", id, err),
            }
        }

        // Listings only carry member counts, so membership changes need the
        // read-back above
        if draft.users.is_some() && id.is_some() {
            return None;
        }

        match self.read(|| self.client.list_all_organizations()).await {
            Ok(orgs) => orgs
                .into_iter()
                .find(|o| id.is_none_or(|id| o.id == id) && o.name == draft.name),
            Err(err) => {
                debug!("Listing organizations for verification failed: {}", err);
                None
            }
        }
    }

    pub async fn create_organization(&self, draft: &OrganizationDraft) -> Result<Organization> {
        validate_organization(draft)?;
        let _ticket = self
            .in_flight
            .acquire(format!("organization:new:{}", draft.name))?;

        let client = self.client;
        self.write_verified(
            "organization create",
            move || client.create_organization(draft),
            move |written: Option<Organization>| async move {
                let id = written.map(|o| o.id);
                self.confirm_organization(id.as_deref(), draft).await
            },
        )
        .await
    }

    pub async fn update_organization(
        &self,
        id: &str,
        draft: &OrganizationDraft,
    ) -> Result<Organization> {
        validate_organization(draft)?;
        let key = ResourceKind::Organization.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.write_verified(
            &key,
            move || client.update_organization(id, draft),
            move |_: Option<Organization>| self.confirm_organization(Some(id), draft),
        )
        .await
    }

    pub async fn delete_organization(&self, id: &str) -> Result<DeleteOutcome> {
        let key = ResourceKind::Organization.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.delete_verified(
            &key,
            move || async move {
                match client.get_organization(id).await {
                    Ok(_) => Ok(true),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            move || client.delete_organization(id),
        )
        .await
    }

    // ========================================================================
    // Membership
    // ========================================================================

    async fn load_pair(&self, org_id: &str, user_id: &str) -> Result<(User, Organization)> {
        let user = self.read(|| self.client.get_user(user_id)).await?;
        let org = self.read(|| self.client.get_organization(org_id)).await?;
        Ok((user, org))
    }

    fn member_ids(org: &Organization) -> Result<Vec<String>> {
        match &org.users {
            None => Ok(Vec::new()),
            Some(membership) => membership.ids().map(<[String]>::to_vec).ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "organization {} did not include member IDs",
                    org.id
                ))
                .into()
            }),
        }
    }

    /// Write the user half, then the organization half. The two writes are
    /// not atomic; a failure of the second reports both entity keys.
    async fn apply_membership(
        &self,
        user: &User,
        user_draft: &UserDraft,
        org: &Organization,
        members: Vec<String>,
    ) -> Result<(User, Organization)> {
        let updated_user = self.update_user(&user.id, user_draft, &[]).await?;

        let org_draft = OrganizationDraft {
            users: Some(members),
            ..OrganizationDraft::from(org)
        };
        match self.update_organization(&org.id, &org_draft).await {
            Ok(updated_org) => Ok((updated_user, updated_org)),
            Err(err) => Err(ApiError::PartialWrite {
                done: ResourceKind::User.entity_key(&user.id),
                failed: ResourceKind::Organization.entity_key(&org.id),
                reason: err.to_string(),
            }
            .into()),
        }
    }

    pub async fn add_member(&self, org_id: &str, user_id: &str) -> Result<(User, Organization)> {
        let (user, org) = self.load_pair(org_id, user_id).await?;

        let mut user_draft = UserDraft::from(&user);
        if !user_draft.organizations.contains(&org.name) {
            user_draft.organizations.push(org.name.clone());
        }
        let mut members = Self::member_ids(&org)?;
        if !members.iter().any(|m| m == user_id) {
            members.push(user_id.to_string());
        }

        self.apply_membership(&user, &user_draft, &org, members)
            .await
    }

    pub async fn remove_member(&self, org_id: &str, user_id: &str) -> Result<(User, Organization)> {
        let (user, org) = self.load_pair(org_id, user_id).await?;

        let mut user_draft = UserDraft::from(&user);
        user_draft.organizations.retain(|name| name != &org.name);
        let mut members = Self::member_ids(&org)?;
        members.retain(|m| m != user_id);

        self.apply_membership(&user, &user_draft, &org, members)
            .await
    }

    // ========================================================================
    // Generic records
    // ========================================================================

    fn validate_record(body: &Map<String, Value>) -> Result<()> {
        if let Some(name) = body.get("name") {
            validate_name(name.as_str().unwrap_or_default())?;
        }
        Ok(())
    }

    async fn confirm_record(
        &self,
        kind: ResourceKind,
        id: Option<&str>,
        body: &Map<String, Value>,
    ) -> Option<Record> {
        if let Some(id) = id {
            match self.read(|| self.client.get_record(kind, id)).await {
                Ok(record) if record.contains(body) => return Some(record),
                Ok(_) => debug!("Read-back of {} differs", kind.entity_key(id)),
                Err(err) => debug!("Read-back of {} failed: {}", kind.entity_key(id), err),
            }
        }

        match self.read(|| self.client.list_all_records(kind)).await {
            Ok(records) => records
                .into_iter()
                .find(|r| id.is_none_or(|id| r.id == id) && r.contains(body)),
            Err(err) => {
                debug!("Listing {} records for verification failed: {}", kind, err);
                None
            }
        }
    }

    pub async fn create_record(
        &self,
        kind: ResourceKind,
        body: &Map<String, Value>,
    ) -> Result<Record> {
        Self::validate_record(body)?;
        let _ticket = self.in_flight.acquire(format!(
            "{}:new:{}",
            kind,
            Value::Object(body.clone())
        ))?;

        let client = self.client;
        let what = format!("{} create", kind);
        self.write_verified(
            &what,
            move || client.create_record(kind, body),
            move |written: Option<Record>| async move {
                let id = written.map(|r| r.id);
                self.confirm_record(kind, id.as_deref(), body).await
            },
        )
        .await
    }

    pub async fn update_record(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Record> {
        Self::validate_record(body)?;
        let key = kind.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.write_verified(
            &key,
            move || client.update_record(kind, id, body),
            move |_: Option<Record>| self.confirm_record(kind, Some(id), body),
        )
        .await
    }

    pub async fn delete_record(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome> {
        let key = kind.entity_key(id);
        let _ticket = self.in_flight.acquire(key.clone())?;

        let client = self.client;
        self.delete_verified(
            &key,
            move || async move {
                match client.get_record(kind, id).await {
                    Ok(_) => Ok(true),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(err),
                }
            },
            move || client.delete_record(kind, id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockAdminClient, organization, user};
    use crate::client::{ListParams, UserApi};
    use crate::error::{Error, ValidationError};
    use serde_json::json;

    fn writer(mock: &MockAdminClient) -> VerifiedWriter<'_, MockAdminClient> {
        VerifiedWriter::new(mock, &RetrySettings::default())
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_502_is_retried_exactly_once() {
        let mock = MockAdminClient::new()
            .fail_next("create_user", ApiError::Status(502))
            .await;

        let created = writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap();

        assert_eq!(created.email, "jane@x.com");
        assert_eq!(mock.call_counts().await.create_user, 2);
        assert_eq!(mock.users().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_matching_read_back_resolves_without_more_writes() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .fail_after_write("update_user", ApiError::Status(502))
            .await;

        let updated = writer(&mock)
            .update_user("u1", &UserDraft::new("Jane Doe", "jane@x.com"), &[])
            .await
            .unwrap();

        assert_eq!(updated.name, "Jane Doe");
        let counts = mock.call_counts().await;
        assert_eq!(counts.update_user, 1);
        assert_eq!(counts.get_user, 1);
        assert_eq!(counts.list_users, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persisted_create_is_not_resubmitted() {
        let mock = MockAdminClient::new()
            .fail_after_write("create_user", ApiError::Status(502))
            .await;

        writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap();

        assert_eq!(mock.call_counts().await.create_user, 1);
        assert_eq!(mock.users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_blocks_before_any_request() {
        let mock = MockAdminClient::new();
        let known = vec![user("u1", "Jane", "jane@x.com")];

        let err = writer(&mock)
            .create_user(&UserDraft::new("Janet", "JANE@x.com"), &known)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Validation(ValidationError::DuplicateEmail(_))
        ));
        assert_eq!(mock.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_blocks_before_any_request() {
        let mock = MockAdminClient::new();
        let w = writer(&mock);

        assert!(w.create_user(&UserDraft::new("", "jane@x.com"), &[]).await.is_err());
        assert!(w.create_user(&UserDraft::new("Jane", "jane@x"), &[]).await.is_err());
        assert!(
            w.create_organization(&OrganizationDraft::default())
                .await
                .is_err()
        );
        assert_eq!(mock.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_create_then_list_returns_submitted_values() {
        let mock = MockAdminClient::new();
        let draft = UserDraft::new("Jane", "jane@x.com").organizations(vec!["Acme".into()]);

        let created = writer(&mock).create_user(&draft, &[]).await.unwrap();
        let listed = mock.list_users(&ListParams::new()).await.unwrap();

        assert!(!created.id.is_empty());
        let row = listed.items.iter().find(|u| u.id == created.id).unwrap();
        assert_eq!(row.name, "Jane");
        assert_eq!(row.email, "jane@x.com");
        assert_eq!(row.organizations, vec!["Acme".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_write_is_unconfirmed() {
        let mock = MockAdminClient::new().dropping_writes().await;

        let err = writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Unconfirmed(_))));
        assert_eq!(mock.call_counts().await.create_user, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_whole_operation_repeats_when_unconfirmed() {
        let mut mock = MockAdminClient::new();
        for _ in 0..3 {
            mock = mock.fail_next("create_user", ApiError::Status(502)).await;
        }

        let created = writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap();

        assert_eq!(created.name, "Jane");
        // Three failed attempts, then a second operation that succeeds
        assert_eq!(mock.call_counts().await.create_user, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_attempts_are_bounded() {
        let mut mock = MockAdminClient::new();
        for _ in 0..6 {
            mock = mock.fail_next("create_user", ApiError::Status(502)).await;
        }

        let err = writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(mock.call_counts().await.create_user, 6);
        assert!(mock.users().await.is_empty());
    }

    #[tokio::test]
    async fn test_client_rejection_is_not_repeated() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .fail_next("update_user", ApiError::Status(409))
            .await
            .fail_next("update_user", ApiError::Status(409))
            .await;

        let err = writer(&mock)
            .update_user("u1", &UserDraft::new("Jane Doe", "jane@x.com"), &[])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 409");
        assert_eq!(mock.call_counts().await.update_user, 1);
        assert_eq!(mock.users().await[0].name, "Jane");
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_repeats_operation() {
        let mock = MockAdminClient::new()
            .fail_next("create_user", ApiError::Network("connection reset".into()))
            .await;

        let created = writer(&mock)
            .create_user(&UserDraft::new("Jane", "jane@x.com"), &[])
            .await
            .unwrap();

        assert_eq!(created.name, "Jane");
        assert_eq!(mock.call_counts().await.create_user, 2);
    }

    #[tokio::test]
    async fn test_rejected_session_is_not_retried() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .fail_next("update_user", ApiError::Unauthorized)
            .await;

        let err = writer(&mock)
            .update_user("u1", &UserDraft::new("Jane Doe", "jane@x.com"), &[])
            .await
            .unwrap_err();

        assert!(err.requires_sign_in());
        let counts = mock.call_counts().await;
        assert_eq!(counts.update_user, 1);
        assert_eq!(counts.get_user, 0);
    }

    #[tokio::test]
    async fn test_concurrent_mutation_is_rejected() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await;
        let in_flight = InFlight::new();
        let _held = in_flight.acquire("user:u1").unwrap();

        let err = writer(&mock)
            .with_in_flight(in_flight.clone())
            .delete_user("u1")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::InFlight(_))));
        assert_eq!(mock.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_delete_of_missing_user_skips_delete_call() {
        let mock = MockAdminClient::new();

        let outcome = writer(&mock).delete_user("ghost").await.unwrap();

        assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
        let counts = mock.call_counts().await;
        assert_eq!(counts.get_user, 1);
        assert_eq!(counts.delete_user, 0);
    }

    #[tokio::test]
    async fn test_delete_of_soft_deleted_user_skips_delete_call() {
        let mut gone = user("u1", "Jane", "jane@x.com");
        gone.deleted_at = Some(chrono::Utc::now());
        let mock = MockAdminClient::new().with_users(vec![gone]).await;

        let outcome = writer(&mock).delete_user("u1").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
        assert_eq!(mock.call_counts().await.delete_user, 0);
    }

    #[tokio::test]
    async fn test_failed_delete_that_landed_is_success() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .fail_after_write("delete_user", ApiError::Status(500))
            .await;

        let outcome = writer(&mock).delete_user("u1").await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(mock.call_counts().await.delete_user, 1);
    }

    #[tokio::test]
    async fn test_failed_delete_still_present_is_error() {
        let mock = MockAdminClient::new()
            .with_orgs(vec![organization("o1", "Acme", &[])])
            .await
            .fail_next("delete_organization", ApiError::Status(500))
            .await;

        let err = writer(&mock).delete_organization("o1").await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(mock.orgs().await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_member_updates_both_records() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .with_orgs(vec![organization("o1", "Acme", &["u9"])])
            .await;

        let (updated_user, updated_org) = writer(&mock).add_member("o1", "u1").await.unwrap();

        assert_eq!(updated_user.organizations, vec!["Acme".to_string()]);
        assert_eq!(updated_org.member_ids(), vec!["u9", "u1"]);
        assert_eq!(mock.orgs().await[0].member_ids(), vec!["u9", "u1"]);
    }

    #[tokio::test]
    async fn test_remove_member_updates_both_records() {
        let mut member = user("u1", "Jane", "jane@x.com");
        member.organizations = vec!["Acme".into(), "Globex".into()];
        let mock = MockAdminClient::new()
            .with_users(vec![member])
            .await
            .with_orgs(vec![organization("o1", "Acme", &["u1", "u2"])])
            .await;

        writer(&mock).remove_member("o1", "u1").await.unwrap();

        assert_eq!(mock.users().await[0].organizations, vec!["Globex".to_string()]);
        assert_eq!(mock.orgs().await[0].member_ids(), vec!["u2"]);
    }

    #[tokio::test]
    async fn test_membership_reports_the_half_that_failed() {
        let mock = MockAdminClient::new()
            .with_users(vec![user("u1", "Jane", "jane@x.com")])
            .await
            .with_orgs(vec![organization("o1", "Acme", &[])])
            .await
            .fail_next("update_organization", ApiError::Status(500))
            .await
            .fail_next("update_organization", ApiError::Status(500))
            .await;

        let err = writer(&mock).add_member("o1", "u1").await.unwrap_err();

        match err {
            Error::Api(ApiError::PartialWrite { done, failed, .. }) => {
                assert_eq!(done, "user:u1");
                assert_eq!(failed, "organization:o1");
            }
            other => panic!("expected a partial write, got {other:?}"),
        }
        // The user half stays applied
        assert_eq!(mock.users().await[0].organizations, vec!["Acme".to_string()]);
        assert!(mock.orgs().await[0].member_ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_organization_create_confirmed_by_name() {
        let mock = MockAdminClient::new()
            .fail_after_write("create_organization", ApiError::Status(502))
            .await;

        let org = writer(&mock)
            .create_organization(&OrganizationDraft {
                name: "Acme".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(org.name, "Acme");
        assert_eq!(mock.call_counts().await.create_organization, 1);
    }

    #[tokio::test]
    async fn test_record_create_and_delete() {
        let mock = MockAdminClient::new();
        let w = writer(&mock);

        let rule = w
            .create_record(
                ResourceKind::Rule,
                &body(json!({ "name": "No gambling", "priority": 3 })),
            )
            .await
            .unwrap();
        assert_eq!(rule.name.as_deref(), Some("No gambling"));
        assert_eq!(rule.fields["priority"], json!(3));

        assert_eq!(
            w.delete_record(ResourceKind::Rule, &rule.id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            w.delete_record(ResourceKind::Rule, &rule.id).await.unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
        assert_eq!(mock.call_counts().await.delete_record, 1);
    }

    #[tokio::test]
    async fn test_record_with_blank_name_is_rejected() {
        let mock = MockAdminClient::new();
        let err = writer(&mock)
            .create_record(ResourceKind::Keyword, &body(json!({ "name": " " })))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(ValidationError::EmptyName)));
        assert_eq!(mock.call_counts().await.total(), 0);
    }
}
