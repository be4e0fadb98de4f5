//! Status command implementation

use chrono::Utc;
use colored::Colorize;

use crate::auth::{FileSessionStore, SessionStore};
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Show configuration and stored session without contacting any server
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "adminctl Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not created yet)".dimmed()
        );
    }

    let config = Config::load_at(opts.config_ref())?
        .with_overrides(opts.api_url_ref(), opts.auth_url_ref());

    println!();
    match config.api_url.as_deref() {
        Some(url) => println!("{} API: {}", "✓".green(), url.cyan()),
        None => {
            println!("{} API URL not configured", "✗".red());
            println!("  → Set api_url in the config file or ADMINCTL_API_URL");
        }
    }
    match config.auth_url.as_deref() {
        Some(url) => println!("{} Identity provider: {}", "✓".green(), url.cyan()),
        None => {
            println!("{} Identity provider URL not configured", "✗".red());
            println!("  → Set auth_url in the config file or ADMINCTL_AUTH_URL");
        }
    }

    let store = FileSessionStore::beside_config(opts.config_ref())?;
    match store.load()? {
        Some(tokens) => {
            let who = tokens.email.as_deref().unwrap_or("unknown user");
            let remaining = tokens.expires_at.signed_duration_since(Utc::now());
            if remaining.num_seconds() <= 0 {
                println!(
                    "{} Session for {} expired (will refresh on next command)",
                    "⚠".yellow(),
                    who
                );
            } else {
                println!(
                    "{} Signed in as {} (token expires in {}h {}m)",
                    "✓".green(),
                    who.bold(),
                    remaining.num_hours(),
                    remaining.num_minutes() % 60
                );
            }
        }
        None => {
            println!("{} Not signed in", "○".dimmed());
            println!("  → Run 'adminctl login' to start a session");
        }
    }

    println!(
        "{} Inactivity timeout: {} min, refresh {} s before expiry",
        "○".dimmed(),
        config.session.inactivity_timeout_secs / 60,
        config.session.refresh_buffer_secs
    );
    println!();

    Ok(())
}
