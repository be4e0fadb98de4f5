//! User management commands

use colored::Colorize;
use log::debug;

use crate::auth::Route;
use crate::cli::handlers::{confirm_delete, print_grid};
use crate::cli::{CommandContext, GridArgs, OutputFormat, UserCommands};
use crate::client::models::{Lifecycle, User, UserDraft};
use crate::client::{AdminApi, UserApi};
use crate::error::Result;
use crate::models::UserDisplay;
use crate::output::{Detail, Formattable};
use crate::verify::{DeleteOutcome, VerifiedWriter};

pub async fn run(ctx: &CommandContext, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::List { grid, all } => list(ctx, &grid, all).await,
        UserCommands::Get { id } => get(ctx, &id).await,
        UserCommands::Create {
            name,
            email,
            organizations,
        } => {
            let client = ctx.enter(Route::Users).await?;
            let draft = UserDraft::new(name, email).organizations(organizations);
            let user = create(&ctx.writer(&client), &draft).await?;
            report(ctx, "created", &user)
        }
        UserCommands::Update {
            id,
            name,
            email,
            organizations,
        } => {
            let client = ctx.enter(Route::User(id.clone())).await?;
            let changes = UserChanges {
                name,
                email,
                organizations,
            };
            let user = update(&ctx.writer(&client), &id, changes).await?;
            report(ctx, "updated", &user)
        }
        UserCommands::Delete { id, yes } => delete(ctx, &id, yes).await,
    }
}

async fn list(ctx: &CommandContext, grid: &GridArgs, all: bool) -> Result<()> {
    let client = ctx.enter(Route::Users).await?;
    let mut users = client.list_all_users().await?;
    if !all {
        users.retain(|u| u.lifecycle() == Lifecycle::Live);
    }
    print_grid::<User, UserDisplay>(ctx, users, grid, "users")
}

async fn get(ctx: &CommandContext, id: &str) -> Result<()> {
    let client = ctx.enter(Route::User(id.to_string())).await?;
    let user = client.get_user(id).await?;
    Detail(UserDisplay::from(&user)).print(ctx.format)
}

/// Fields given on the command line; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub organizations: Option<Vec<String>>,
}

impl UserChanges {
    fn apply(self, mut draft: UserDraft) -> UserDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(orgs) = self.organizations {
            draft.organizations = orgs;
        }
        draft
    }
}

/// Create a user after checking the email against every known user
pub async fn create<C: AdminApi>(writer: &VerifiedWriter<'_, C>, draft: &UserDraft) -> Result<User> {
    let known = writer.client().list_all_users().await?;
    debug!("Checking {} against {} known users", draft.email, known.len());
    writer.create_user(draft, &known).await
}

/// Merge `changes` into the stored user and write the result
pub async fn update<C: AdminApi>(
    writer: &VerifiedWriter<'_, C>,
    id: &str,
    changes: UserChanges,
) -> Result<User> {
    let current = writer.client().get_user(id).await?;
    let known = writer.client().list_all_users().await?;
    let draft = changes.apply(UserDraft::from(&current));
    writer.update_user(id, &draft, &known).await
}

async fn delete(ctx: &CommandContext, id: &str, yes: bool) -> Result<()> {
    let client = ctx.enter(Route::User(id.to_string())).await?;

    let label = match client.get_user(id).await {
        Ok(user) => format!("user \"{}\" <{}>", user.name, user.email),
        Err(err) if err.is_not_found() => format!("user {}", id),
        Err(err) => return Err(err),
    };
    if !confirm_delete(&label, yes)? {
        return Ok(());
    }

    let outcome = ctx.writer(&client).delete_user(id).await?;
    report_deleted(ctx, "user", id, outcome)
}

fn report(ctx: &CommandContext, verb: &str, user: &User) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => Detail(UserDisplay::from(user)).print(ctx.format),
        OutputFormat::Table => {
            eprintln!(
                "{} User {}: {} <{}> (ID: {})",
                "✓".green(),
                verb,
                user.name,
                user.email,
                user.id
            );
            Ok(())
        }
    }
}

/// Shared delete report for every resource
pub fn report_deleted(
    ctx: &CommandContext,
    resource: &str,
    id: &str,
    outcome: DeleteOutcome,
) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "data": {
                    "deleted": true,
                    "already_absent": outcome == DeleteOutcome::AlreadyAbsent,
                    "resource": resource,
                    "id": id,
                },
                "meta": {
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => match outcome {
            DeleteOutcome::Deleted => eprintln!("{} Deleted {} {}", "✓".green(), resource, id),
            DeleteOutcome::AlreadyAbsent => eprintln!(
                "{} {} {} was already gone; nothing to delete",
                "○".dimmed(),
                resource,
                id
            ),
        },
    }
    Ok(())
}
