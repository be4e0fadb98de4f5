//! Organization management commands

use colored::Colorize;

use crate::auth::Route;
use crate::cli::handlers::{confirm_delete, print_grid};
use crate::cli::user::report_deleted;
use crate::cli::{CommandContext, OrgCommands, OutputFormat};
use crate::client::models::{Organization, OrganizationDraft, User};
use crate::client::{AdminApi, OrganizationApi, UserApi};
use crate::error::Result;
use crate::models::{OrgDisplay, UserDisplay};
use crate::output::{Detail, Formattable};
use crate::verify::VerifiedWriter;

pub async fn run(ctx: &CommandContext, cmd: OrgCommands) -> Result<()> {
    match cmd {
        OrgCommands::List { grid } => {
            let client = ctx.enter(Route::Organizations).await?;
            let orgs = client.list_all_organizations().await?;
            print_grid::<Organization, OrgDisplay>(ctx, orgs, &grid, "organizations")
        }
        OrgCommands::Get { id } => get(ctx, &id).await,
        OrgCommands::Create { name, slug } => {
            let client = ctx.enter(Route::Organizations).await?;
            let draft = OrganizationDraft {
                name,
                slug,
                users: None,
            };
            let org = ctx.writer(&client).create_organization(&draft).await?;
            report(ctx, "created", &org)
        }
        OrgCommands::Update { id, name, slug } => {
            let client = ctx.enter(Route::Organization(id.clone())).await?;
            let org = rename(&ctx.writer(&client), &id, name, slug).await?;
            report(ctx, "updated", &org)
        }
        OrgCommands::Delete { id, yes } => {
            let client = ctx.enter(Route::Organization(id.clone())).await?;
            let label = match client.get_organization(&id).await {
                Ok(org) => format!(
                    "organization \"{}\" ({} members)",
                    org.name,
                    org.member_count()
                ),
                Err(err) if err.is_not_found() => format!("organization {}", id),
                Err(err) => return Err(err),
            };
            if !confirm_delete(&label, yes)? {
                return Ok(());
            }
            let outcome = ctx.writer(&client).delete_organization(&id).await?;
            report_deleted(ctx, "organization", &id, outcome)
        }
        OrgCommands::AddUser { org_id, user_id } => {
            let client = ctx
                .enter(Route::OrganizationUser {
                    org_id: org_id.clone(),
                    user_id: user_id.clone(),
                })
                .await?;
            let (user, org) = ctx.writer(&client).add_member(&org_id, &user_id).await?;
            report_membership(ctx, "added to", &user, &org)
        }
        OrgCommands::RemoveUser { org_id, user_id } => {
            let client = ctx
                .enter(Route::OrganizationUser {
                    org_id: org_id.clone(),
                    user_id: user_id.clone(),
                })
                .await?;
            let (user, org) = ctx.writer(&client).remove_member(&org_id, &user_id).await?;
            report_membership(ctx, "removed from", &user, &org)
        }
    }
}

async fn get(ctx: &CommandContext, id: &str) -> Result<()> {
    let client = ctx.enter(Route::Organization(id.to_string())).await?;
    let org = client.get_organization(id).await?;
    let members = members_of(&client, &org).await?;

    match ctx.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "data": {
                    "organization": org,
                    "members": members,
                },
                "meta": {
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        OutputFormat::Table => {
            Detail(OrgDisplay::from(&org)).print(ctx.format)?;
            println!();
            println!("{}", "Members".bold());
            let rows: Vec<UserDisplay> = members.iter().map(UserDisplay::from).collect();
            rows.print(ctx.format)
        }
    }
}

/// Users whose IDs are listed on the organization
pub async fn members_of<C: AdminApi>(client: &C, org: &Organization) -> Result<Vec<User>> {
    let ids = org.member_ids();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut users = client.list_all_users().await?;
    users.retain(|u| ids.contains(&u.id));
    Ok(users)
}

/// Change name or slug, leaving membership untouched
pub async fn rename<C: AdminApi>(
    writer: &VerifiedWriter<'_, C>,
    id: &str,
    name: Option<String>,
    slug: Option<String>,
) -> Result<Organization> {
    let current = writer.client().get_organization(id).await?;
    let draft = OrganizationDraft {
        name: name.unwrap_or(current.name),
        slug: slug.or(current.slug),
        users: None,
    };
    writer.update_organization(id, &draft).await
}

fn report(ctx: &CommandContext, verb: &str, org: &Organization) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => Detail(OrgDisplay::from(org)).print(ctx.format),
        OutputFormat::Table => {
            eprintln!(
                "{} Organization {}: {} (ID: {})",
                "✓".green(),
                verb,
                org.name,
                org.id
            );
            Ok(())
        }
    }
}

fn report_membership(ctx: &CommandContext, verb: &str, user: &User, org: &Organization) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "data": { "user": user, "organization": org },
                "meta": {
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            eprintln!(
                "{} {} {} \"{}\" ({} members)",
                "✓".green(),
                user.email,
                verb,
                org.name,
                org.member_count()
            );
        }
    }
    Ok(())
}
