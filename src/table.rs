//! Markdown table rendering for comparison reports
//!
//! Layout is delegated to `tabled`'s markdown style. The first column is always
//! left-aligned; any other column whose body cells all parse as numbers is
//! right-aligned.

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

/// Escape pipes so a cell cannot break the table layout
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

fn is_numeric_column(rows: &[Vec<String>], column: usize) -> bool {
    !rows.is_empty()
        && rows
            .iter()
            .all(|row| row[column].trim().parse::<f64>().is_ok())
}

/// Render rows under the given headers as a markdown table
///
/// Missing cells are rendered empty, extra cells are dropped. The result ends
/// with a newline.
pub fn render_table(rows: Vec<Vec<String>>, headers: &[&str]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|mut row| {
            row.resize(headers.len(), String::new());
            row.iter().map(|cell| escape_cell(cell)).collect()
        })
        .collect();

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| escape_cell(h)));
    for row in &rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    table.with(Style::markdown());
    for column in 1..headers.len() {
        if is_numeric_column(&rows, column) {
            table.modify(Columns::single(column), Alignment::right());
        }
    }

    format!("{}\n", table)
}
