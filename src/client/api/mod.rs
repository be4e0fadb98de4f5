//! API trait definitions split by resource
//!
//! - [`UserApi`] - user CRUD
//! - [`OrganizationApi`] - organization CRUD
//! - [`RecordApi`] - rules, roles, creatives and keywords
//!
//! The [`AdminApi`](super::AdminApi) super-trait combines all three.

mod organizations;
mod records;
mod users;

pub use organizations::OrganizationApi;
pub use records::RecordApi;
pub use users::UserApi;
