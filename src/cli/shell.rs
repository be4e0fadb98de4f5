//! Interactive shell
//!
//! Keeps one session alive across many commands. The refresh timer renews the
//! token in the background, every input line rearms the inactivity timer, and
//! a sign-out for any reason ends the shell.

use std::io::Write;

use clap::Parser;
use colored::Colorize;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::{Route, SessionEvent, SignOutReason};
use crate::cli::{Cli, CommandContext, Commands};
use crate::error::{AuthError, Result};

/// Split a line into arguments, honouring single and double quotes.
pub fn split_args(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unclosed quote {}", q));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

fn prompt() {
    print!("{} ", "adminctl>".cyan().bold());
    let _ = std::io::stdout().flush();
}

fn describe(reason: SignOutReason) -> &'static str {
    match reason {
        SignOutReason::UserRequested => "Signed out",
        SignOutReason::Inactivity => "Signed out after inactivity",
        SignOutReason::RefreshFailed => "Session could not be renewed",
        SignOutReason::Rejected => "Session was rejected by the API",
    }
}

/// Handle one input line. Returns false when the shell should exit.
async fn dispatch(ctx: &CommandContext, line: &str) -> bool {
    let args = match split_args(line) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err);
            return true;
        }
    };

    match args.first().map(String::as_str) {
        None => return true,
        Some("exit" | "quit") => return false,
        Some("logout") => {
            if let Err(err) = ctx.session.sign_out(SignOutReason::UserRequested) {
                eprintln!("{} {}", "✗".red(), err);
            }
            return true;
        }
        _ => {}
    }

    let cli = match Cli::try_parse_from(std::iter::once("adminctl".to_string()).chain(args)) {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version output also arrive here
            let _ = err.print();
            return true;
        }
    };

    if matches!(cli.command, Commands::Shell) {
        eprintln!("Already in the shell.");
        return true;
    }

    if let Err(err) = Box::pin(super::execute(ctx, cli.command)).await {
        if err.requires_sign_in() {
            let _ = ctx.session.sign_out(SignOutReason::Rejected);
        }
        eprintln!("{} {}", "Error:".red(), err);
    }
    true
}

pub async fn run(ctx: &CommandContext) -> Result<()> {
    if !ctx.session.is_authenticated().await || !ctx.session.resume()? {
        return Err(AuthError::NotAuthenticated {
            from: "shell".to_string(),
        }
        .into());
    }

    let mut events = ctx.session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!(
        "Signed in. Idle sessions end after {} minutes. Type 'exit' to leave.",
        ctx.session.settings().inactivity_timeout_secs / 60
    );
    prompt();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(SessionEvent::SignedOut(reason)) => {
                    eprintln!("\n{} {}", "○".dimmed(), describe(reason));
                }
                Ok(SessionEvent::Redirect(Route::Login)) => {
                    eprintln!("Run 'adminctl login' to start a new session.");
                    break;
                }
                Ok(event) => debug!("Session event: {:?}", event),
                Err(RecvError::Lagged(skipped)) => debug!("Missed {} session events", skipped),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                ctx.session.touch();
                if !dispatch(ctx, &line).await {
                    break;
                }
                prompt();
            }
        }
    }

    ctx.session.shutdown();
    Ok(())
}
