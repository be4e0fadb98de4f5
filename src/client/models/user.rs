//! User models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Names of the organizations this user belongs to (not IDs)
    #[serde(default)]
    pub organizations: Vec<String>,

    /// Business status, when the API reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency counter
    #[serde(default)]
    pub version: i64,
}

/// Record lifecycle, derived from `deleted_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Live,
    SoftDeleted,
}

/// Active/inactive business status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl User {
    pub fn lifecycle(&self) -> Lifecycle {
        if self.deleted_at.is_some() {
            Lifecycle::SoftDeleted
        } else {
            Lifecycle::Live
        }
    }

    /// True when name and email equal the submitted form (email case-insensitive)
    pub fn matches_identity(&self, name: &str, email: &str) -> bool {
        self.name == name && self.email.eq_ignore_ascii_case(email)
    }
}

/// Body for `POST /user/create` and `PUT /user/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub organizations: Vec<String>,

    /// Expected version for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn organizations(mut self, orgs: Vec<String>) -> Self {
        self.organizations = orgs;
        self
    }

    /// Compare the fields this draft was meant to change against a read-back.
    ///
    /// Organization order is ignored.
    pub fn is_applied_to(&self, user: &User) -> bool {
        if !user.matches_identity(&self.name, &self.email) {
            return false;
        }
        let mut wanted = self.organizations.clone();
        let mut actual = user.organizations.clone();
        wanted.sort();
        actual.sort();
        wanted == actual
    }
}

impl From<&User> for UserDraft {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            organizations: user.organizations.clone(),
            version: Some(user.version),
        }
    }
}
