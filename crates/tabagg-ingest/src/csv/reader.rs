//! Delimited text reading with per-file separator detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use polars::prelude::{CsvParseOptions, CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};
use crate::table::normalize_column_names;

use super::header::{detect_separator, split_fields, strip_bom};

/// Maximum file size for table loading (500 MB default).
pub const MAX_TABLE_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Header row of a delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CsvHeader {
    /// Byte offset of the header line (leading blank lines are skipped).
    offset: usize,
    /// Field separator detected from the header line.
    separator: u8,
    /// Column names as declared (trimmed, quotes removed).
    columns: Vec<String>,
}

fn open_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_TABLE_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        // UTF-16 LE BOM
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        // UTF-16 BE BOM
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    // UTF-8 BOM is acceptable (stripped from the header)
    Ok(())
}

/// Finds the header: the first line that is not blank once a UTF-8 BOM is
/// removed. Returns its byte offset and text without the line ending.
fn read_header_line(path: &Path) -> Result<Option<(usize, String)>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut reader = BufReader::new(file);
    let mut offset = 0usize;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes = reader.read_line(&mut line).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                IngestError::UnsupportedEncoding {
                    path: path.to_path_buf(),
                    encoding: "non-UTF-8",
                }
            } else {
                IngestError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if bytes == 0 {
            return Ok(None);
        }

        let text = strip_bom(line.trim_end_matches(['\r', '\n']));
        if !text.trim().is_empty() {
            return Ok(Some((offset, text.to_string())));
        }
        offset += bytes;
    }
}

/// Reads the header line of a delimited file and detects its separator.
fn read_csv_header(path: &Path) -> Result<CsvHeader> {
    let Some((offset, line)) = read_header_line(path)? else {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    };

    let separator = detect_separator(&line);
    let columns = split_fields(&line, separator);
    Ok(CsvHeader {
        offset,
        separator,
        columns,
    })
}

/// Reads a delimited file into a Polars DataFrame.
///
/// Blank lines before the header are ignored. The separator is chosen from
/// the header line (see [`detect_separator`]); column types are inferred by
/// Polars over the whole file. Column names come from the header as split
/// here, so quoting and trimming match separator detection.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    validate_encoding(path)?;
    let header = read_csv_header(path)?;
    tracing::debug!(
        path = %path.display(),
        separator = %char::from(header.separator),
        columns = header.columns.len(),
        skipped_bytes = header.offset,
        "Detected CSV header"
    );

    let separator = header.separator;
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts: CsvParseOptions| opts.with_separator(separator));
    let parsed = if header.offset == 0 {
        options
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(SerReader::finish)
    } else {
        let bytes = std::fs::read(path).map_err(|e| open_error(path, e))?;
        let body = bytes.get(header.offset..).unwrap_or_default().to_vec();
        options.into_reader_with_file_handle(Cursor::new(body)).finish()
    };
    let mut df = parsed.map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let names = if df.width() == header.columns.len() {
        normalize_column_names(&header.columns)
    } else {
        tracing::warn!(
            path = %path.display(),
            header = header.columns.len(),
            parsed = df.width(),
            "Header field count differs from parsed columns; using parsed names"
        );
        normalize_column_names(df.get_column_names().into_iter().map(|n| n.as_str()))
    };
    df.set_column_names(names)?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_read_csv_header_comma() {
        let file = create_temp_csv("A,B,C\n1,2,3\n");
        let header = read_csv_header(file.path()).unwrap();

        assert_eq!(header.separator, b',');
        assert_eq!(header.columns, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_csv_header_semicolon_with_bom() {
        let file = create_temp_csv("\u{feff}A;B;C\r\n1;2;3\r\n");
        let header = read_csv_header(file.path()).unwrap();

        assert_eq!(header.separator, b';');
        assert_eq!(header.columns, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_csv_header_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_header(file.path());

        assert!(matches!(result, Err(IngestError::EmptyTable { .. })));
    }

    #[test]
    fn test_read_csv_header_only_blank_lines() {
        let file = create_temp_csv("\n  \r\n\n");
        let result = read_csv_header(file.path());

        assert!(matches!(result, Err(IngestError::EmptyTable { .. })));
    }

    #[test]
    fn test_read_csv_header_skips_leading_blank_lines() {
        let file = create_temp_csv("\n \r\nid;name\n1;a\n");
        let header = read_csv_header(file.path()).unwrap();

        assert_eq!(header.offset, 4);
        assert_eq!(header.separator, b';');
        assert_eq!(header.columns, vec!["id", "name"]);
    }

    #[test]
    fn test_read_csv_table_leading_blank_line() {
        let file = create_temp_csv("\nid,name\n1,a\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "name"]);
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.column("name").unwrap().str().unwrap().get(0),
            Some("a")
        );
    }

    #[test]
    fn test_read_csv_table_quoted_header_names() {
        let file = create_temp_csv("\"id\",\"full, name\"\n1,\"Doe, J\"\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "full, name"]);
    }

    #[test]
    fn test_read_csv_table_comma() {
        let file = create_temp_csv("id,name\n1,alpha\n2,beta\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "name"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_read_csv_table_semicolon() {
        let file = create_temp_csv("id;name;extra\n1;alpha;x\n2;beta;y\n3;gamma;z\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "name", "extra"]);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_read_csv_table_header_only() {
        let file = create_temp_csv("id,name\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "name"]);
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_read_csv_table_trims_header_names() {
        let file = create_temp_csv(" id , name \n1,a\n");
        let df = read_csv_table(file.path()).unwrap();

        assert_eq!(names(&df), vec!["id", "name"]);
    }

    #[test]
    fn test_validate_encoding_rejects_utf16() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(&[0xFF, 0xFE, b'a', 0x00]).unwrap();

        let result = validate_encoding(file.path());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            })
        ));
    }

    #[test]
    fn test_check_file_size_with_limit() {
        let file = create_temp_csv("id,name\n1,alpha\n");
        assert!(check_file_size_with_limit(file.path(), 1024).is_ok());
        assert!(matches!(
            check_file_size_with_limit(file.path(), 4),
            Err(IngestError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_check_file_size_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = check_file_size(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
