//! Organization display model

use serde::Serialize;
use tabled::Tabled;

use super::common::NONE;
use crate::client::models::Organization;

/// Organization display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OrgDisplay {
    #[tabled(rename = "ORG ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "SLUG")]
    pub slug: String,

    #[tabled(rename = "MEMBERS")]
    pub members: usize,
}

impl From<&Organization> for OrgDisplay {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id.clone(),
            name: org.name.clone(),
            slug: org.slug.clone().unwrap_or_else(|| NONE.to_string()),
            members: org.member_count(),
        }
    }
}

impl From<Organization> for OrgDisplay {
    fn from(org: Organization) -> Self {
        OrgDisplay::from(&org)
    }
}
