//! Delimited text reading utilities.

mod header;
mod reader;

pub use header::detect_separator;
pub use reader::{MAX_TABLE_FILE_SIZE, check_file_size, read_csv_table};
