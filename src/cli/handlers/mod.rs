//! Shared command handlers

mod list;

pub use list::{apply_grid, print_grid};

use colored::Colorize;
use dialoguer::Confirm;

use crate::error::Result;

/// Ask before deleting unless `--yes` was given. Returns false when cancelled.
pub fn confirm_delete(what: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    eprintln!("{} Delete {}? This cannot be undone.", "⚠".yellow(), what);
    let confirmed = Confirm::new()
        .with_prompt("Confirm deletion?")
        .default(false)
        .interact()?;

    if !confirmed {
        eprintln!("Cancelled.");
    }
    Ok(confirmed)
}
