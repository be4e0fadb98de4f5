//! Display models and client-side grid operations for CLI output

pub mod display;
pub mod grid;

pub use display::{OrgDisplay, RecordDisplay, UserDisplay};
pub use grid::{GridPage, GridQuery, GridRow, SortOrder};
