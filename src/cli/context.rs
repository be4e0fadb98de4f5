//! Command execution context
//!
//! Provides a unified context for command execution: configuration with
//! CLI/env overrides applied, the session service, the route guard, and an
//! authenticated API client for protected commands.

use std::sync::Arc;

use log::debug;

use crate::auth::{
    FileSessionStore, HttpIdentityProvider, Navigation, Route, RouteGuard, SessionService,
};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::AdminClient;
use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::verify::VerifiedWriter;

/// Context for command execution.
pub struct CommandContext {
    /// Loaded configuration with overrides applied
    pub config: Config,
    /// Output format (flag > env > config > table)
    pub format: OutputFormat,
    pub session: SessionService,
    pub guard: RouteGuard,
    /// Options the context was built from
    pub options: GlobalOptions,
}

impl CommandContext {
    /// Load config and build the session service.
    ///
    /// # Errors
    /// Returns error if the config cannot be parsed or no identity provider
    /// URL is configured.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?
            .with_overrides(opts.api_url_ref(), opts.auth_url_ref());

        let format = opts
            .format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_name)
            })
            .unwrap_or_default();

        let provider = HttpIdentityProvider::new(config.require_auth_url()?)?;
        let store = FileSessionStore::beside_config(opts.config_ref())?;
        debug!("Session file: {}", store.path().display());

        let session = SessionService::new(
            Arc::new(provider),
            Arc::new(store),
            config.session.clone(),
        );
        let guard = RouteGuard::new(&session);

        Ok(Self {
            config,
            format,
            session,
            guard,
            options: opts.clone(),
        })
    }

    /// Pass `route` through the guard and return a client carrying the
    /// session token.
    ///
    /// # Errors
    /// `AuthError::NotAuthenticated` naming the requested route when the
    /// guard redirects to the login route.
    pub async fn enter(&self, route: Route) -> Result<AdminClient> {
        match self.guard.navigate(route).await {
            Navigation::Render(route) => {
                debug!("Rendering {}", route);
                let tokens = self
                    .session
                    .current_tokens()?
                    .ok_or(AuthError::SessionExpired)?;
                let client = AdminClient::new(self.config.require_api_url()?)?;
                client.set_token(tokens.access_token).await;
                Ok(client)
            }
            Navigation::Redirect { to, from } => {
                debug!("Redirecting {} to {}", from, to);
                Err(AuthError::NotAuthenticated {
                    from: from.to_string(),
                }
                .into())
            }
        }
    }

    /// Writer using the configured retry settings
    pub fn writer<'a>(&self, client: &'a AdminClient) -> VerifiedWriter<'a, AdminClient> {
        VerifiedWriter::new(client, &self.config.retry)
    }

    pub fn page_size(&self) -> usize {
        self.config.preferences.page_size
    }
}
