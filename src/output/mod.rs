//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;
pub mod table;

/// Types that can be rendered in every output format
pub trait Formattable {
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }
}

impl<T: Tabled + Serialize> Formattable for Vec<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(table::format_table(self)),
            OutputFormat::Json => Ok(json::format_json_list(self)?),
        }
    }
}

/// A single entity: a vertical table, or a bare JSON object under `data`
pub struct Detail<T>(pub T);

impl<T: Tabled + Serialize> Formattable for Detail<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(table::format_detail(&self.0)),
            OutputFormat::Json => Ok(json::format_json(&self.0)?),
        }
    }
}
