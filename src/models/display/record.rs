//! Display model for rules, roles, creatives and keywords

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use super::common::{NONE, truncate_string};
use crate::client::models::Record;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RecordDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    /// Remaining fields as `key=value` pairs
    #[tabled(rename = "FIELDS")]
    pub fields: String,
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&Record> for RecordDisplay {
    fn from(record: &Record) -> Self {
        let fields = record
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, render(v)))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: record.id.clone(),
            name: record.name.clone().unwrap_or_else(|| NONE.to_string()),
            fields: if fields.is_empty() {
                NONE.to_string()
            } else {
                truncate_string(&fields, 60)
            },
        }
    }
}

impl From<Record> for RecordDisplay {
    fn from(record: Record) -> Self {
        RecordDisplay::from(&record)
    }
}
