//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Rotate, Style, object::Rows},
};

/// Format rows as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format one entity with its columns as rows
pub fn format_detail<T: Tabled>(item: &T) -> String {
    let mut table = Table::new(std::iter::once(item));
    table.with(Rotate::Left).with(Style::rounded());
    table.to_string()
}
