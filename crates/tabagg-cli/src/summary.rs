//! End-of-run report: per-file outcomes and where the workbook went.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabagg_core::{FileOutcome, FileReport};

use crate::pipeline::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Folder: {}", summary.input_dir.display());
    println!("Columns: {}", summary.columns.join(", "));
    println!("{}", file_table(&summary.files));
    println!("Rows aggregated: {}", summary.total_rows);
    match (&summary.output_path, summary.dry_run) {
        (Some(path), _) => println!("Output: {}", path.display()),
        (None, true) => println!("Dry run: no output written."),
        (None, _) => println!("No output written."),
    }
    println!("Processing complete.");
}

/// Per-file outcome table, in processing order, with a totals row.
pub fn file_table(files: &[FileReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Rows"),
        header_cell("Detail"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if let Some(column) = table.column_mut(2) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let mut total_rows = 0usize;
    for file in files {
        let (status, rows, detail) = match &file.outcome {
            FileOutcome::Processed { rows } => {
                total_rows += rows;
                (
                    Cell::new("processed").fg(Color::Green),
                    Cell::new(rows),
                    dim_cell("-"),
                )
            }
            FileOutcome::Skipped { missing } => (
                Cell::new("skipped").fg(Color::Yellow),
                dim_cell("-"),
                Cell::new(format!("missing: {}", missing.join(", "))),
            ),
            FileOutcome::Unreadable { reason } => (
                Cell::new("unreadable").fg(Color::Red),
                dim_cell("-"),
                Cell::new(reason),
            ),
        };
        table.add_row(vec![Cell::new(&file.file_name), status, rows, detail]);
    }

    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
