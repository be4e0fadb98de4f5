//! Commands for rules, roles, creatives and keywords

use colored::Colorize;
use serde_json::{Map, Value};

use crate::auth::Route;
use crate::cli::handlers::{confirm_delete, print_grid};
use crate::cli::user::report_deleted;
use crate::cli::{CommandContext, OutputFormat, RecordCommands};
use crate::client::RecordApi;
use crate::client::models::{Record, ResourceKind};
use crate::error::{Error, Result};
use crate::models::RecordDisplay;
use crate::output::{Detail, Formattable};

/// Route a record command is checked against
fn route_for(kind: ResourceKind, id: Option<&str>) -> Route {
    let id = id.map(str::to_string);
    match kind {
        ResourceKind::Rule => Route::Rules(id),
        ResourceKind::Keyword => Route::Keywords(id),
        ResourceKind::Role => Route::Roles,
        ResourceKind::Creative => Route::Creatives,
        ResourceKind::User => id.map(Route::User).unwrap_or(Route::Users),
        ResourceKind::Organization => id.map(Route::Organization).unwrap_or(Route::Organizations),
    }
}

/// Parse `key=value` pairs; values that are valid JSON keep their type.
pub fn parse_fields(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut body = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::Other(format!("Expected KEY=VALUE, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Other(format!("Empty field name in '{}'", pair)));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        body.insert(key.to_string(), value);
    }
    Ok(body)
}

pub async fn run(ctx: &CommandContext, kind: ResourceKind, cmd: RecordCommands) -> Result<()> {
    match cmd {
        RecordCommands::List { grid } => {
            let client = ctx.enter(route_for(kind, None)).await?;
            let records = client.list_all_records(kind).await?;
            print_grid::<Record, RecordDisplay>(ctx, records, &grid, &format!("{}s", kind))
        }
        RecordCommands::Get { id } => {
            let client = ctx.enter(route_for(kind, Some(&id))).await?;
            let record = client.get_record(kind, &id).await?;
            match ctx.format {
                // Full record, not the truncated display row
                OutputFormat::Json => println!("{}", crate::output::json::format_json(&record)?),
                OutputFormat::Table => Detail(RecordDisplay::from(&record)).print(ctx.format)?,
            }
            Ok(())
        }
        RecordCommands::Create { fields } => {
            let body = parse_fields(&fields)?;
            let client = ctx.enter(route_for(kind, None)).await?;
            let record = ctx.writer(&client).create_record(kind, &body).await?;
            report(ctx, kind, "created", &record)
        }
        RecordCommands::Update { id, fields } => {
            let body = parse_fields(&fields)?;
            let client = ctx.enter(route_for(kind, Some(&id))).await?;
            let record = ctx.writer(&client).update_record(kind, &id, &body).await?;
            report(ctx, kind, "updated", &record)
        }
        RecordCommands::Delete { id, yes } => {
            let client = ctx.enter(route_for(kind, Some(&id))).await?;
            if !confirm_delete(&format!("{} {}", kind, id), yes)? {
                return Ok(());
            }
            let outcome = ctx.writer(&client).delete_record(kind, &id).await?;
            report_deleted(ctx, kind.segment(), &id, outcome)
        }
    }
}

fn report(ctx: &CommandContext, kind: ResourceKind, verb: &str, record: &Record) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => println!("{}", crate::output::json::format_json(record)?),
        OutputFormat::Table => eprintln!(
            "{} {} {}: {} (ID: {})",
            "✓".green(),
            kind,
            verb,
            record.name.as_deref().unwrap_or("--"),
            record.id
        ),
    }
    Ok(())
}
