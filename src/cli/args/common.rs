//! Common CLI types shared across commands

/// Sort direction for list commands
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SortDir {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Rounded table, one row per entry
    #[default]
    Table,
    /// JSON with a `meta` block, for scripts
    Json,
}

impl OutputFormat {
    /// Parse a format name stored in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}
