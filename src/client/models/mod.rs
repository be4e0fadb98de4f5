//! Admin API data models
//!
//! Models are organized by resource type.

mod auth;
mod org;
mod record;
mod user;

pub use auth::{SessionTokens, SignInOutcome};
pub use org::{Membership, Organization, OrganizationDraft};
pub use record::{Record, ResourceKind};
pub use user::{AccountStatus, Lifecycle, User, UserDraft};
