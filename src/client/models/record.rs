//! Generic records for rules, roles, creatives and keywords

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource kinds served by the admin API.
///
/// Every kind exposes the same `/{segment}/create|update|delete|get|list`
/// endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Organization,
    Rule,
    Role,
    Creative,
    Keyword,
}

impl ResourceKind {
    /// Path segment used by the REST endpoints
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Organization => "organization",
            ResourceKind::Rule => "rule",
            ResourceKind::Role => "role",
            ResourceKind::Creative => "creative",
            ResourceKind::Keyword => "keyword",
        }
    }

    pub fn list_path(&self) -> String {
        format!("/{}/list", self.segment())
    }

    pub fn get_path(&self, id: &str) -> String {
        format!("/{}/get/{}", self.segment(), id)
    }

    pub fn create_path(&self) -> String {
        format!("/{}/create", self.segment())
    }

    pub fn update_path(&self, id: &str) -> String {
        format!("/{}/update/{}", self.segment(), id)
    }

    pub fn delete_path(&self, id: &str) -> String {
        format!("/{}/delete/{}", self.segment(), id)
    }

    /// Key identifying one entity, used by the in-flight guard
    pub fn entity_key(&self, id: &str) -> String {
        format!("{}:{}", self.segment(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// A record whose schema the client does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Every other field, kept verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// True when every field of `draft` has the same value on this record
    pub fn contains(&self, draft: &Map<String, Value>) -> bool {
        draft.iter().all(|(key, value)| match key.as_str() {
            "id" => self.id == value.as_str().unwrap_or_default(),
            "name" => self.name.as_deref() == value.as_str(),
            _ => self.fields.get(key) == Some(value),
        })
    }
}
