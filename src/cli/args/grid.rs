//! Client-side grid arguments for list commands

use clap::Args;

use super::SortDir;
use crate::models::{GridQuery, SortOrder};

/// Filter, sort and page arguments applied to a loaded list.
///
/// Flatten into any list command:
/// ```ignore
/// List {
///     #[command(flatten)]
///     grid: GridArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct GridArgs {
    /// Only show rows containing this text (case-insensitive)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction (asc, desc)
    #[arg(long, value_enum, hide_possible_values = true)]
    pub sort_dir: Option<SortDir>,

    /// Page number (0-indexed)
    #[arg(long, short = 'p')]
    pub page: Option<usize>,

    /// Rows per page
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl GridArgs {
    /// Build the grid query; `default_page_size` applies when `--page` is
    /// given without `--limit`.
    pub fn to_query(&self, default_page_size: usize) -> GridQuery {
        let page_size = match (self.limit, self.page) {
            (Some(limit), _) => Some(limit),
            (None, Some(_)) => Some(default_page_size),
            (None, None) => None,
        };

        GridQuery {
            filter: self.filter.clone(),
            sort_by: self.sort_by.clone(),
            order: match self.sort_dir {
                Some(SortDir::Desc) => SortOrder::Desc,
                _ => SortOrder::Asc,
            },
            page: self.page.unwrap_or(0),
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_shows_everything() {
        let query = GridArgs::default().to_query(100);
        assert!(query.page_size.is_none());
        assert_eq!(query.page, 0);
        assert_eq!(query.order, SortOrder::Asc);
    }

    #[test]
    fn test_page_without_limit_uses_default_size() {
        let args = GridArgs {
            page: Some(2),
            ..Default::default()
        };
        let query = args.to_query(50);
        assert_eq!(query.page_size, Some(50));
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_sort_direction() {
        let args = GridArgs {
            sort_by: Some("email".into()),
            sort_dir: Some(SortDir::Desc),
            limit: Some(10),
            ..Default::default()
        };
        let query = args.to_query(100);
        assert_eq!(query.sort_by.as_deref(), Some("email"));
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.page_size, Some(10));
    }
}
