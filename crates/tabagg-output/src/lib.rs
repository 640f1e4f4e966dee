//! Output generation for the tabular aggregator.
//!
//! The aggregated table is written as a single-sheet XLSX workbook. Writes go
//! through a temporary file so an interrupted run never leaves a truncated
//! workbook behind.

mod common;
mod xlsx;

pub use common::{ensure_output_dir, write_atomic};
pub use xlsx::{XLSX_MAX_COLUMNS, XLSX_MAX_ROWS, render_xlsx, write_xlsx};
