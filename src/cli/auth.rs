//! Sign-in, sign-out and account recovery commands

use std::io::{self, BufRead};

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use log::debug;

use crate::auth::{Route, SignOutReason};
use crate::cli::CommandContext;
use crate::client::models::SignInOutcome;
use crate::error::{Error, Result};

fn prompt_email() -> Result<String> {
    let email: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Email")
        .interact_text()?;
    Ok(email.trim().to_string())
}

fn read_password(from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let password = line.trim_end_matches(['\r', '\n']).to_string();
        if password.is_empty() {
            return Err(Error::Other("No password on stdin".to_string()));
        }
        return Ok(password);
    }

    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?)
}

fn prompt_new_password() -> Result<String> {
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?)
}

/// Sign in, completing a forced password change when the provider asks for one
pub async fn login(ctx: &CommandContext, email: Option<String>, password_stdin: bool) -> Result<()> {
    ctx.guard.navigate(Route::Login).await;

    let email = match email {
        Some(email) => email,
        None => prompt_email()?,
    };
    let password = read_password(password_stdin)?;

    let tokens = match ctx.session.sign_in(&email, &password).await? {
        SignInOutcome::SignedIn(tokens) => tokens,
        SignInOutcome::NewPasswordRequired { .. } => {
            if password_stdin {
                return Err(Error::Other(
                    "A new password is required; run `adminctl login` interactively".to_string(),
                ));
            }
            eprintln!("{} A new password is required for {}", "!".yellow(), email);
            debug!("Routing to {}", Route::NewPassword);

            loop {
                let new_password = prompt_new_password()?;
                match ctx.session.set_new_password(&new_password).await {
                    Ok(tokens) => break tokens,
                    Err(Error::Validation(err)) => eprintln!("{} {}", "✗".red(), err),
                    Err(err) => return Err(err),
                }
            }
        }
    };

    // Timers only matter inside `adminctl shell`
    ctx.session.shutdown();

    eprintln!(
        "{} Signed in as {} (session valid until {})",
        "✓".green(),
        tokens.email.as_deref().unwrap_or(&email).bold(),
        tokens.expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub fn logout(ctx: &CommandContext) -> Result<()> {
    ctx.session.sign_out(SignOutReason::UserRequested)?;
    eprintln!("{} Signed out", "✓".green());
    Ok(())
}

pub async fn forgot_password(ctx: &CommandContext, email: &str) -> Result<()> {
    ctx.guard.navigate(Route::ForgotPassword).await;
    ctx.session.forgot_password(email).await?;
    eprintln!("{} Reset code sent to {}", "✓".green(), email);
    eprintln!(
        "  → Run {} to choose a new password",
        format!("adminctl password reset {} --code <CODE>", email).cyan()
    );
    Ok(())
}

pub async fn reset_password(ctx: &CommandContext, email: &str, code: &str) -> Result<()> {
    ctx.guard.navigate(Route::ResetPassword).await;
    let new_password = prompt_new_password()?;
    ctx.session.reset_password(email, code, &new_password).await?;
    eprintln!("{} Password updated. You can now sign in.", "✓".green());
    Ok(())
}

pub async fn verify_email(ctx: &CommandContext, email: &str, code: &str) -> Result<()> {
    ctx.guard.navigate(Route::VerifyEmail).await;
    ctx.session.confirm_sign_up(email, code).await?;
    eprintln!("{} Email confirmed for {}", "✓".green(), email);
    Ok(())
}
