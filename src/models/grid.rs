//! Client-side filter, sort and paging over loaded rows
//!
//! List commands fetch a resource list once and then narrow it locally, the
//! same way the console's table widget does.

use std::cmp::Ordering;

use serde_json::Value;

use crate::client::models::{Organization, Record, User};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A row the grid can filter and sort.
pub trait GridRow {
    /// Column names accepted by `--sort-by`
    fn columns() -> &'static [&'static str];

    /// Text of one column, `None` for unknown columns
    fn cell(&self, column: &str) -> Option<String>;

    /// Text matched by `--filter`
    fn haystack(&self) -> String {
        Self::columns()
            .iter()
            .filter_map(|c| self.cell(c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What to show of a loaded list.
#[derive(Debug, Clone, Default)]
pub struct GridQuery {
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub order: SortOrder,
    /// 0-indexed
    pub page: usize,
    /// Rows per page; `None` shows everything
    pub page_size: Option<usize>,
}

/// One page of filtered rows.
#[derive(Debug, Clone)]
pub struct GridPage<T> {
    pub rows: Vec<T>,
    /// Rows matching the filter, across all pages
    pub matched: usize,
    pub page: usize,
    pub pages: usize,
}

fn compare_cells(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_lowercase().cmp(&b.to_lowercase()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl GridQuery {
    pub fn apply<T: GridRow>(&self, rows: Vec<T>) -> GridPage<T> {
        let needle = self
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<T> = match needle {
            Some(needle) => rows
                .into_iter()
                .filter(|r| r.haystack().to_lowercase().contains(&needle))
                .collect(),
            None => rows,
        };

        if let Some(column) = &self.sort_by {
            rows.sort_by(|a, b| {
                let ord = compare_cells(a.cell(column), b.cell(column));
                match self.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let matched = rows.len();
        match self.page_size.filter(|size| *size > 0) {
            Some(size) => {
                let pages = matched.div_ceil(size).max(1);
                let rows = rows
                    .into_iter()
                    .skip(self.page.saturating_mul(size))
                    .take(size)
                    .collect();
                GridPage {
                    rows,
                    matched,
                    page: self.page,
                    pages,
                }
            }
            None => GridPage {
                rows,
                matched,
                page: 0,
                pages: 1,
            },
        }
    }
}

impl GridRow for User {
    fn columns() -> &'static [&'static str] {
        &["id", "name", "email", "organizations", "status", "updated_at"]
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "organizations" => Some(self.organizations.join(", ")),
            "status" => self
                .status
                .map(|s| format!("{:?}", s).to_lowercase()),
            "created_at" => self.created_at.map(|t| t.to_rfc3339()),
            "updated_at" => self.updated_at.map(|t| t.to_rfc3339()),
            _ => None,
        }
    }
}

impl GridRow for Organization {
    fn columns() -> &'static [&'static str] {
        &["id", "name", "slug", "members"]
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "slug" => self.slug.clone(),
            "members" => Some(self.member_count().to_string()),
            _ => None,
        }
    }
}

impl GridRow for Record {
    fn columns() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn cell(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.clone()),
            "name" => self.name.clone(),
            other => self.fields.get(other).map(|v| match v {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            }),
        }
    }

    fn haystack(&self) -> String {
        let mut text = format!("{} {}", self.id, self.name.as_deref().unwrap_or_default());
        for value in self.fields.values() {
            text.push(' ');
            text.push_str(&value.to_string());
        }
        text
    }
}
