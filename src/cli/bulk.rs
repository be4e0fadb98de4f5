//! Bulk user upload
//!
//! Every row is validated locally before any request is sent, including
//! duplicate emails within the file. Valid rows are then created through the
//! verified writer with bounded concurrency.

use std::collections::HashSet;
use std::path::Path;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::auth::Route;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::models::{User, UserDraft};
use crate::client::{AdminApi, UserApi};
use crate::error::{Error, Result, ValidationError};
use crate::output::Formattable;
use crate::verify::VerifiedWriter;
use crate::verify::validate::validate_user;

/// One row of the upload file
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRow {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organizations: Vec<String>,
}

/// Result of one row
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RowReport {
    /// 1-indexed position in the file
    #[tabled(rename = "ROW")]
    pub row: usize,

    #[tabled(rename = "EMAIL")]
    pub email: String,

    /// created, invalid or failed
    #[tabled(rename = "RESULT")]
    pub result: String,

    /// User ID or error message
    #[tabled(rename = "DETAIL")]
    pub detail: String,
}

impl RowReport {
    fn is_created(&self) -> bool {
        self.result == "created"
    }
}

/// Read rows from a `.json` file or, for any other extension, YAML
pub fn read_rows(path: &Path) -> Result<Vec<UploadRow>> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Other(format!("Invalid upload file {}: {}", path.display(), e)))
    }
}

/// Split rows into drafts worth sending and reports for rejected rows.
fn check_rows(rows: Vec<UploadRow>, known: &[User]) -> (Vec<(usize, UserDraft)>, Vec<RowReport>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let draft = UserDraft::new(row.name.trim(), row.email.trim()).organizations(row.organizations);
        let checked = validate_user(&draft, known, None).and_then(|()| {
            if seen.insert(draft.email.to_lowercase()) {
                Ok(())
            } else {
                Err(ValidationError::DuplicateEmail(draft.email.clone()))
            }
        });

        match checked {
            Ok(()) => accepted.push((index + 1, draft)),
            Err(err) => rejected.push(RowReport {
                row: index + 1,
                email: draft.email,
                result: "invalid".to_string(),
                detail: err.to_string(),
            }),
        }
    }

    (accepted, rejected)
}

/// Validate every row, then create the valid ones.
pub async fn upload<C: AdminApi>(
    writer: &VerifiedWriter<'_, C>,
    rows: Vec<UploadRow>,
    concurrency: usize,
    progress: &ProgressBar,
) -> Result<Vec<RowReport>> {
    let known = writer.client().list_all_users().await?;
    let (accepted, mut reports) = check_rows(rows, &known);
    debug!(
        "{} rows accepted, {} rejected before upload",
        accepted.len(),
        reports.len()
    );

    progress.set_length(accepted.len() as u64);
    let known = &known;
    let created: Vec<RowReport> = stream::iter(accepted)
        .map(|(row, draft)| async move {
            let result = writer.create_user(&draft, known).await;
            progress.inc(1);
            match result {
                Ok(user) => RowReport {
                    row,
                    email: draft.email,
                    result: "created".to_string(),
                    detail: user.id,
                },
                Err(err) => RowReport {
                    row,
                    email: draft.email,
                    result: "failed".to_string(),
                    detail: err.to_string(),
                },
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    progress.finish_and_clear();

    reports.extend(created);
    reports.sort_by_key(|r| r.row);
    Ok(reports)
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} users {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

pub async fn run(ctx: &CommandContext, file: &str, concurrency: usize) -> Result<()> {
    let rows = read_rows(Path::new(file))?;
    let total = rows.len();
    let client = ctx.enter(Route::BulkUpload).await?;

    let progress = match ctx.format {
        OutputFormat::Table => progress_bar(),
        OutputFormat::Json => ProgressBar::hidden(),
    };
    let reports = upload(&ctx.writer(&client), rows, concurrency, &progress).await?;

    let created = reports.iter().filter(|r| r.is_created()).count();
    reports.print(ctx.format)?;

    if created == total {
        eprintln!("{} Created {} of {} users", "✓".green(), created, total);
        Ok(())
    } else {
        Err(Error::Other(format!(
            "{} of {} rows were not created",
            total - created,
            total
        )))
    }
}
