//! Admin REST API client

pub mod api;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod retry;

pub use api::{OrganizationApi, RecordApi, UserApi};
pub use http::AdminClient;
#[cfg(test)]
pub use mock::MockAdminClient;
pub use pagination::{ListParams, Page};
pub use retry::{RetryPolicy, is_transient, with_retry};

/// Full admin API surface.
///
/// Implemented automatically for anything that implements the per-resource
/// traits, so commands can take a single `&dyn AdminApi` or generic `C: AdminApi`.
pub trait AdminApi: UserApi + OrganizationApi + RecordApi {}

impl<T: UserApi + OrganizationApi + RecordApi> AdminApi for T {}
