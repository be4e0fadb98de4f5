//! Authentication: identity provider, session lifecycle and route guard

use async_trait::async_trait;

use crate::client::models::{SessionTokens, SignInOutcome};
use crate::error::Result;

pub mod guard;
#[cfg(test)]
pub mod mock;
pub mod provider;
pub mod session;
pub mod store;
pub mod token;

pub use guard::{GuardState, Navigation, Route, RouteGuard};
pub use provider::HttpIdentityProvider;
pub use session::{SessionEvent, SessionService, SignOutReason};
pub use store::{FileSessionStore, SessionStore};

/// Hosted identity provider.
///
/// Each call is an opaque request that either returns or fails with an
/// [`AuthError`](crate::error::AuthError).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for tokens or a password challenge
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome>;

    /// Obtain a fresh access token using the refresh token
    async fn refresh(&self, tokens: &SessionTokens) -> Result<SessionTokens>;

    /// Answer a forced password change challenge
    async fn complete_new_password(
        &self,
        email: &str,
        session: &str,
        new_password: &str,
    ) -> Result<SessionTokens>;

    /// Confirm an account with the emailed verification code
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()>;

    /// Request a password reset code
    async fn forgot_password(&self, email: &str) -> Result<()>;

    /// Set a new password using a reset code
    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()>;
}
