//! Generic list command handler
//!
//! Every list command follows the same flow:
//! 1. Pass the route guard and get a client
//! 2. Fetch every row of the resource
//! 3. Filter, sort and page locally
//! 4. Convert to the display type and print

use colored::Colorize;
use log::debug;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CommandContext, GridArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::models::{GridPage, GridRow};
use crate::output::Formattable;

/// Apply grid arguments to loaded rows.
///
/// # Errors
/// Rejects a `--sort-by` column the row type does not have.
pub fn apply_grid<T: GridRow>(rows: Vec<T>, grid: &GridArgs, page_size: usize) -> Result<GridPage<T>> {
    if let Some(column) = grid.sort_by.as_deref() {
        if !T::columns().contains(&column) {
            return Err(Error::Other(format!(
                "Cannot sort by '{}'. Columns: {}",
                column,
                T::columns().join(", ")
            )));
        }
    }
    Ok(grid.to_query(page_size).apply(rows))
}

/// Print one grid page, with a page footer on stderr for tables.
pub fn print_grid<T, D>(
    ctx: &CommandContext,
    rows: Vec<T>,
    grid: &GridArgs,
    resource_name: &str,
) -> Result<()>
where
    T: GridRow,
    D: for<'a> From<&'a T> + Tabled + Serialize,
{
    let total = rows.len();
    let page = apply_grid(rows, grid, ctx.page_size())?;
    debug!(
        "{} {}: {} matched, page {}/{}",
        total, resource_name, page.matched, page.page.saturating_add(1), page.pages
    );

    let display: Vec<D> = page.rows.iter().map(D::from).collect();
    display.print(ctx.format)?;

    if ctx.format == OutputFormat::Table && page.pages > 1 {
        eprintln!(
            "{}",
            format!(
                "Page {} of {} ({} of {} {} matched). --page counts from 0.",
                page.page.saturating_add(1),
                page.pages,
                page.matched,
                total,
                resource_name
            )
            .dimmed()
        );
    }

    Ok(())
}
