//! Table ingestion for the aggregator.
//!
//! This crate finds candidate input files in a folder and loads each one
//! (delimited text or spreadsheet) into a Polars DataFrame.
//!
//! # Features
//!
//! - **File Discovery**: List `.csv`, `.xlsx` and `.xls` files directly inside a folder
//! - **CSV Loading**: Comma or semicolon separated, chosen per file from the header line
//! - **Spreadsheet Loading**: First worksheet of a workbook via calamine
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabagg_ingest::{list_table_files, read_table};
//!
//! let files = list_table_files(Path::new("exports"))?;
//! let table = read_table(&files[0])?;
//! println!("{} has columns {:?}", table.file_name, table.column_names());
//! ```

mod csv;
mod discovery;
mod error;
mod reader;
mod spreadsheet;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::{
    DELIMITED_EXTENSIONS, SPREADSHEET_EXTENSIONS, TableFormat, file_name_of, list_table_files,
};

// === Table Reading ===
pub use csv::{MAX_TABLE_FILE_SIZE, detect_separator, read_csv_table};
pub use reader::read_table;
pub use spreadsheet::read_spreadsheet_table;
pub use table::{SourceTable, normalize_column_names};
