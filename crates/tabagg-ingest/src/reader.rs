//! Format dispatch for loading a single input file.

use std::path::Path;

use crate::csv::{check_file_size, read_csv_table};
use crate::discovery::TableFormat;
use crate::error::{IngestError, Result};
use crate::spreadsheet::read_spreadsheet_table;
use crate::table::SourceTable;

/// Loads one input file into a [`SourceTable`].
///
/// The `Err` arm is the "unreadable" outcome: every parse, encoding, and I/O
/// failure is reported through [`IngestError`] and never panics.
pub fn read_table(path: &Path) -> Result<SourceTable> {
    let format = TableFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    check_file_size(path)?;

    let data = match format {
        TableFormat::Delimited => read_csv_table(path)?,
        TableFormat::Spreadsheet => read_spreadsheet_table(path)?,
    };

    let table = SourceTable::new(path, format, data);
    tracing::debug!(
        file = %table.file_name,
        rows = table.row_count(),
        columns = table.data.width(),
        "Loaded table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_table_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "id,name\n1,alpha\n2,beta\n").unwrap();

        let table = read_table(&path).unwrap();

        assert_eq!(table.file_name, "a.csv");
        assert_eq!(table.format, TableFormat::Delimited);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_read_table_csv_with_blank_first_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.csv");
        std::fs::write(&path, "\nid,name\n1,a\n").unwrap();

        let table = read_table(&path).unwrap();

        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_read_table_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "id,name\n").unwrap();

        let result = read_table(&path);
        assert!(matches!(result, Err(IngestError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_read_table_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_table(&dir.path().join("gone.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_read_table_malformed_csv_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, [0x69, 0x64, 0x0A, 0xC3, 0x28, 0x0A]).unwrap();

        assert!(read_table(&path).is_err());
    }
}
