//! Pagination helpers for list requests
//!
//! The admin API pages with `limit`/`offset` query parameters.

use serde::Deserialize;

/// Largest page the client asks for when walking a full list.
pub const MAX_PAGE_SIZE: usize = 500;

/// Pagination parameters for list requests.
///
/// # Example
/// ```ignore
/// let params = ListParams::new().limit(50).offset(100);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Convert to query string parameters.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        params.push(("limit", self.limit.unwrap_or(MAX_PAGE_SIZE).to_string()));
        params.push(("offset", self.offset.unwrap_or(0).to_string()));
        params
    }
}

/// List response body.
///
/// Endpoints answer either with a bare array or with an envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Envelope {
        #[serde(alias = "items")]
        data: Vec<T>,
        #[serde(default)]
        total: Option<usize>,
    },
}

/// One page of results with the server-reported total, if any.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<usize>,
}

impl<T> From<ListBody<T>> for Page<T> {
    fn from(body: ListBody<T>) -> Self {
        match body {
            ListBody::Bare(items) => Page { items, total: None },
            ListBody::Envelope { data, total } => Page { items: data, total },
        }
    }
}

impl<T> Page<T> {
    /// Whether another page should be requested after this one.
    ///
    /// Without a total, a full page means there may be more. An empty page
    /// always ends the walk, whatever total the server reports.
    pub fn has_more(&self, offset: usize, limit: usize) -> bool {
        if self.items.is_empty() {
            return false;
        }
        match self.total {
            Some(total) => offset + self.items.len() < total,
            None => self.items.len() >= limit && limit > 0,
        }
    }
}
