//! Session lifecycle
//!
//! [`SessionService`] owns the signed-in state for one application run. It is
//! constructed once by the command context and handed to whatever needs it
//! (route guard, commands, the interactive shell). Two timers run while a
//! session exists:
//!
//! - the refresh timer renews the access token `refresh_buffer` before it
//!   expires, then waits for the next expiry; a failed refresh signs out
//! - the inactivity timer signs out when no input was recorded for
//!   `inactivity_timeout`; every [`SessionService::touch`] rearms it
//!
//! Both are aborted on sign-out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::guard::Route;
use super::store::SessionStore;
use super::IdentityProvider;
use crate::client::models::{SessionTokens, SignInOutcome};
use crate::config::SessionSettings;
use crate::error::{AuthError, Result};
use crate::verify::validate::validate_password;

/// Shortest wait between two token refreshes
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    UserRequested,
    Inactivity,
    RefreshFailed,
    /// The API rejected the token
    Rejected,
}

/// Notifications for whoever drives the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn,
    Refreshed,
    SignedOut(SignOutReason),
    Redirect(Route),
}

#[derive(Default)]
struct Timers {
    refresh: Option<JoinHandle<()>>,
    inactivity: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
        if let Some(handle) = self.inactivity.take() {
            handle.abort();
        }
    }
}

struct Challenge {
    email: String,
    session: String,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    settings: SessionSettings,
    events: broadcast::Sender<SessionEvent>,
    timers: Mutex<Timers>,
    challenge: Mutex<Option<Challenge>>,
}

/// Signed-in state, token storage and session timers.
#[derive(Clone)]
pub struct SessionService {
    inner: Arc<Inner>,
}

impl SessionService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        settings: SessionSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Inner {
                provider,
                store,
                settings,
                events,
                timers: Mutex::new(Timers::default()),
                challenge: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Tokens currently stored, without revalidation
    pub fn current_tokens(&self) -> Result<Option<SessionTokens>> {
        self.inner.store.load()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn refresh_buffer(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.inner.settings.refresh_buffer_secs as i64)
    }

    // ========================================================================
    // Sign-in flows
    // ========================================================================

    /// Sign in with email and password.
    ///
    /// On success the tokens are stored and both timers are armed. A forced
    /// password change leaves the challenge pending for
    /// [`set_new_password`](Self::set_new_password).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome> {
        let outcome = self.inner.provider.sign_in(email, password).await?;

        match &outcome {
            SignInOutcome::SignedIn(tokens) => self.establish(tokens)?,
            SignInOutcome::NewPasswordRequired { session, email } => {
                info!("Password change required for {}", email);
                *self.lock_challenge() = Some(Challenge {
                    email: email.clone(),
                    session: session.clone(),
                });
            }
        }

        Ok(outcome)
    }

    /// Complete a pending forced password change.
    pub async fn set_new_password(&self, new_password: &str) -> Result<SessionTokens> {
        validate_password(new_password)?;

        let challenge = self
            .lock_challenge()
            .take()
            .ok_or(AuthError::NoPendingChallenge)?;

        match self
            .inner
            .provider
            .complete_new_password(&challenge.email, &challenge.session, new_password)
            .await
        {
            Ok(tokens) => {
                self.establish(&tokens)?;
                Ok(tokens)
            }
            Err(err) => {
                // Keep the challenge so the user can try another password
                *self.lock_challenge() = Some(challenge);
                Err(err)
            }
        }
    }

    pub fn has_pending_challenge(&self) -> bool {
        self.lock_challenge().is_some()
    }

    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        self.inner.provider.confirm_sign_up(email, code).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.inner.provider.forgot_password(email).await
    }

    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        self.inner
            .provider
            .confirm_forgot_password(email, code, new_password)
            .await
    }

    fn establish(&self, tokens: &SessionTokens) -> Result<()> {
        self.inner.store.save(tokens)?;
        self.arm_refresh(tokens.expires_at);
        self.arm_inactivity();
        self.emit(SessionEvent::SignedIn);
        info!(
            "Signed in{}",
            tokens
                .email
                .as_deref()
                .map(|e| format!(" as {}", e))
                .unwrap_or_default()
        );
        Ok(())
    }

    // ========================================================================
    // Session state
    // ========================================================================

    /// Clear local session data, cancel timers and redirect to the login route.
    pub fn sign_out(&self, reason: SignOutReason) -> Result<()> {
        self.lock_timers().cancel();
        self.lock_challenge().take();
        self.inner.store.clear()?;

        info!("Signed out ({:?})", reason);
        self.emit(SessionEvent::SignedOut(reason));
        self.emit(SessionEvent::Redirect(Route::Login));
        Ok(())
    }

    /// Whether a usable session exists.
    ///
    /// Looks for stored tokens and revalidates them with the provider when
    /// they are inside the refresh window. A failed refresh signs out.
    pub async fn is_authenticated(&self) -> bool {
        let tokens = match self.inner.store.load() {
            Ok(Some(tokens)) => tokens,
            Ok(None) => return false,
            Err(err) => {
                warn!("Could not read session: {}", err);
                return false;
            }
        };

        if !tokens.expires_within(self.refresh_buffer()) {
            return true;
        }

        debug!("Access token inside refresh window; revalidating");
        match self.inner.provider.refresh(&tokens).await {
            Ok(fresh) => match self.inner.store.save(&fresh) {
                Ok(()) => {
                    self.emit(SessionEvent::Refreshed);
                    true
                }
                Err(err) => {
                    warn!("Could not store refreshed session: {}", err);
                    false
                }
            },
            Err(err) => {
                warn!("Session refresh failed: {}", err);
                let _ = self.sign_out(SignOutReason::RefreshFailed);
                false
            }
        }
    }

    /// Arm both timers for an already stored session.
    ///
    /// Returns false when nothing is stored.
    pub fn resume(&self) -> Result<bool> {
        match self.inner.store.load()? {
            Some(tokens) => {
                self.arm_refresh(tokens.expires_at);
                self.arm_inactivity();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record user input; rearms the inactivity timer while signed in.
    pub fn touch(&self) {
        if self.lock_timers().inactivity.is_some() {
            self.arm_inactivity();
        }
    }

    /// Cancel timers without touching the stored session.
    pub fn shutdown(&self) {
        self.lock_timers().cancel();
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Delay before the next refresh. Tokens that live no longer than the
    /// buffer are renewed at half their remaining lifetime, and never sooner
    /// than [`MIN_REFRESH_INTERVAL`].
    fn until_refresh(&self, expires_at: DateTime<Utc>) -> Duration {
        let remaining = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let buffer = self.refresh_buffer().to_std().unwrap_or(Duration::ZERO);
        let wait = if remaining > buffer {
            remaining - buffer
        } else {
            remaining / 2
        };
        wait.max(MIN_REFRESH_INTERVAL)
    }

    fn arm_refresh(&self, expires_at: DateTime<Utc>) {
        let service = self.clone();
        let handle = tokio::spawn(async move { service.refresh_loop(expires_at).await });

        if let Some(previous) = self.lock_timers().refresh.replace(handle) {
            previous.abort();
        }
    }

    async fn refresh_loop(self, mut expires_at: DateTime<Utc>) {
        loop {
            let wait = self.until_refresh(expires_at);
            debug!("Next token refresh in {:?}", wait);
            tokio::time::sleep(wait).await;

            let tokens = match self.inner.store.load() {
                Ok(Some(tokens)) => tokens,
                _ => return,
            };

            match self.inner.provider.refresh(&tokens).await {
                Ok(fresh) => {
                    if let Err(err) = self.inner.store.save(&fresh) {
                        warn!("Could not store refreshed session: {}", err);
                    }
                    expires_at = fresh.expires_at;
                    self.emit(SessionEvent::Refreshed);
                }
                Err(err) => {
                    warn!("Token refresh failed: {}", err);
                    let _ = self.sign_out(SignOutReason::RefreshFailed);
                    return;
                }
            }
        }
    }

    fn arm_inactivity(&self) {
        let service = self.clone();
        let timeout = self.inner.settings.inactivity_timeout();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            info!("No input for {:?}", timeout);
            if let Err(err) = service.sign_out(SignOutReason::Inactivity) {
                warn!("Sign-out after inactivity failed: {}", err);
            }
        });

        if let Some(previous) = self.lock_timers().inactivity.replace(handle) {
            previous.abort();
        }
    }

    fn lock_timers(&self) -> std::sync::MutexGuard<'_, Timers> {
        self.inner
            .timers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_challenge(&self) -> std::sync::MutexGuard<'_, Option<Challenge>> {
        self.inner
            .challenge
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
