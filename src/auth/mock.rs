//! Mock identity provider for testing

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::IdentityProvider;
use crate::client::models::{SessionTokens, SignInOutcome};
use crate::error::{AuthError, Result};

/// Scripted identity provider.
#[derive(Default)]
pub struct MockIdentityProvider {
    /// Outcomes handed out by `sign_in`, in order
    sign_ins: Arc<Mutex<VecDeque<Result<SignInOutcome>>>>,
    /// Errors returned by `refresh`, consumed one per call
    refresh_errors: Arc<Mutex<VecDeque<AuthError>>>,
    /// Lifetime of tokens issued by refresh and new-password
    lifetime: Arc<Mutex<Option<chrono::Duration>>>,
    pub calls: Arc<Mutex<ProviderCalls>>,
}

#[derive(Default, Debug, Clone)]
pub struct ProviderCalls {
    pub sign_in: usize,
    pub refresh: usize,
    pub complete_new_password: usize,
    pub confirm_sign_up: usize,
    pub forgot_password: usize,
    pub confirm_forgot_password: usize,
}

/// Tokens expiring at `expires_at`
pub fn tokens_expiring(expires_at: DateTime<Utc>) -> SessionTokens {
    SessionTokens {
        access_token: format!("access-{}", expires_at.timestamp()),
        id_token: Some("id".to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_at,
        email: Some("admin@example.com".to_string()),
    }
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn signing_in(self, outcome: Result<SignInOutcome>) -> Self {
        self.sign_ins.lock().await.push_back(outcome);
        self
    }

    pub async fn failing_refresh(self, error: AuthError) -> Self {
        self.refresh_errors.lock().await.push_back(error);
        self
    }

    pub async fn issuing_for(self, lifetime: chrono::Duration) -> Self {
        *self.lifetime.lock().await = Some(lifetime);
        self
    }

    pub async fn calls(&self) -> ProviderCalls {
        self.calls.lock().await.clone()
    }

    async fn fresh_tokens(&self) -> SessionTokens {
        let lifetime = self
            .lifetime
            .lock()
            .await
            .unwrap_or_else(|| chrono::Duration::hours(2));
        tokens_expiring(Utc::now() + lifetime)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<SignInOutcome> {
        self.calls.lock().await.sign_in += 1;
        match self.sign_ins.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => Ok(SignInOutcome::SignedIn(self.fresh_tokens().await)),
        }
    }

    async fn refresh(&self, _tokens: &SessionTokens) -> Result<SessionTokens> {
        self.calls.lock().await.refresh += 1;
        if let Some(err) = self.refresh_errors.lock().await.pop_front() {
            return Err(err.into());
        }
        Ok(self.fresh_tokens().await)
    }

    async fn complete_new_password(
        &self,
        _email: &str,
        _session: &str,
        _new_password: &str,
    ) -> Result<SessionTokens> {
        self.calls.lock().await.complete_new_password += 1;
        Ok(self.fresh_tokens().await)
    }

    async fn confirm_sign_up(&self, _email: &str, _code: &str) -> Result<()> {
        self.calls.lock().await.confirm_sign_up += 1;
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> Result<()> {
        self.calls.lock().await.forgot_password += 1;
        Ok(())
    }

    async fn confirm_forgot_password(
        &self,
        _email: &str,
        _code: &str,
        _new_password: &str,
    ) -> Result<()> {
        self.calls.lock().await.confirm_forgot_password += 1;
        Ok(())
    }
}
