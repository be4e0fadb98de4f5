//! Organization models

use serde::{Deserialize, Serialize};

/// Organization resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization ID
    pub id: String,

    /// Organization name
    pub name: String,

    /// URL slug (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Members; the shape depends on the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Membership>,
}

/// Organization membership.
///
/// `GET /organization/get/{id}` returns the member user IDs, while the list
/// endpoint only returns a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Membership {
    Ids(Vec<String>),
    Count(usize),
}

impl Membership {
    pub fn count(&self) -> usize {
        match self {
            Membership::Ids(ids) => ids.len(),
            Membership::Count(n) => *n,
        }
    }

    pub fn ids(&self) -> Option<&[String]> {
        match self {
            Membership::Ids(ids) => Some(ids),
            Membership::Count(_) => None,
        }
    }
}

impl Organization {
    pub fn member_count(&self) -> usize {
        self.users.as_ref().map(Membership::count).unwrap_or(0)
    }

    /// Member IDs, empty when only a count was returned
    pub fn member_ids(&self) -> Vec<String> {
        self.users
            .as_ref()
            .and_then(|m| m.ids())
            .map(|ids| ids.to_vec())
            .unwrap_or_default()
    }
}

/// Body for `POST /organization/create` and `PUT /organization/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDraft {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Complete member ID list; `None` leaves membership untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
}

impl OrganizationDraft {
    pub fn is_applied_to(&self, org: &Organization) -> bool {
        if org.name != self.name {
            return false;
        }
        if self.slug.is_some() && org.slug != self.slug {
            return false;
        }
        match &self.users {
            None => true,
            Some(wanted) => {
                let mut wanted = wanted.clone();
                let mut actual = org.member_ids();
                wanted.sort();
                actual.sort();
                wanted == actual
            }
        }
    }
}

impl From<&Organization> for OrganizationDraft {
    fn from(org: &Organization) -> Self {
        Self {
            name: org.name.clone(),
            slug: org.slug.clone(),
            users: org.users.as_ref().and_then(|m| m.ids()).map(|ids| ids.to_vec()),
        }
    }
}
