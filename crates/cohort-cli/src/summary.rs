//! Run summary rendering.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("Output: {}", summary.output_path.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Operation"),
        header_cell("Column"),
        header_cell("Rows"),
        header_cell("Attached"),
        header_cell("Missing"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(&summary.operation),
        Cell::new(&summary.output_column),
        Cell::new(summary.rows),
        Cell::new(summary.attached),
        count_cell(summary.missing),
    ]);
    println!("{table}");
}

pub fn print_summary_json(summary: &RunSummary) -> serde_json::Result<()> {
    let rendered = serde_json::to_string_pretty(summary)?;
    println!("{rendered}");
    Ok(())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Missing counts render dimmed at zero and highlighted otherwise.
fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
