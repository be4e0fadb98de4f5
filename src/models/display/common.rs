//! Common display utilities and helpers

use chrono::{DateTime, Utc};

/// Placeholder for absent values
pub const NONE: &str = "--";

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional timestamp as `YYYY-MM-DD HH:MM`
pub fn format_datetime(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NONE.to_string())
}
