//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For every option the precedence is: CLI flag > environment variable >
/// config file > default. This struct captures the CLI/env layer; config file
/// values are merged in `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format; `None` defers to the config file
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.adminctl/config.yaml)
    pub config: Option<String>,

    /// Admin API base URL override
    pub api_url: Option<String>,

    /// Identity provider base URL override
    pub auth_url: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_url: cli.api_url.clone(),
            auth_url: cli.auth_url.clone(),
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn api_url_ref(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    pub fn auth_url_ref(&self) -> Option<&str> {
        self.auth_url.as_deref()
    }
}
