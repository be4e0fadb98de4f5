//! adminctl - command-line admin console

use clap::Parser;
use log::debug;

mod auth;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod verify;

use auth::{FileSessionStore, SessionStore};
use cli::{Cli, CommandContext, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Completion { shell } => {
            cli::completions::print(shell);
            Ok(())
        }
        Commands::Status => cli::status::run(&opts),
        Commands::Logout => match CommandContext::new(&opts) {
            Ok(ctx) => cli::auth::logout(&ctx),
            Err(err) => {
                // No identity provider configured; the local file is all there is
                debug!("Clearing session without a context: {}", err);
                FileSessionStore::beside_config(opts.config_ref())?.clear()
            }
        },
        command => {
            let ctx = CommandContext::new(&opts)?;
            let result = cli::execute(&ctx, command).await;

            if let Err(err) = &result {
                if matches!(err, error::Error::Api(error::ApiError::Unauthorized)) {
                    debug!("API rejected the session token; clearing it");
                    ctx.session.sign_out(auth::SignOutReason::Rejected)?;
                }
            }
            result
        }
    }
}
