//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod common;
mod org;
mod record;
mod user;

pub use org::OrgDisplay;
pub use record::RecordDisplay;
pub use user::UserDisplay;
