//! Spreadsheet (XLSX/XLS) reading via calamine.
//!
//! Only the first worksheet is read. Its first row is the header row; every
//! following row is data. Column types are derived from the cells:
//!
//! - all non-empty cells whole numbers → `Int64`
//! - all non-empty cells numeric → `Float64`
//! - all non-empty cells boolean → `Boolean`
//! - anything else → `String` (dates rendered as ISO text)

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDateTime, Timelike};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::{IngestError, Result};
use crate::table::normalize_column_names;

static EMPTY: Data = Data::Empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

fn parse_error(path: &Path, message: impl ToString) -> IngestError {
    IngestError::SpreadsheetParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Reads the first worksheet of a workbook into a Polars DataFrame.
pub fn read_spreadsheet_table(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| parse_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyTable {
            path: path.to_path_buf(),
        })?
        .map_err(|e| parse_error(path, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    };
    let names = normalize_column_names(
        header_row
            .iter()
            .map(|cell| cell_to_text(cell).unwrap_or_default()),
    );
    let body: Vec<&[Data]> = rows.collect();

    let columns: Vec<Column> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    tracing::debug!(
        path = %path.display(),
        columns = columns.len(),
        rows = body.len(),
        "Read first worksheet"
    );
    Ok(DataFrame::new(columns)?)
}

fn is_whole(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < 9.0e15
}

fn classify(cells: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;
    for cell in cells {
        let cell_kind = match cell {
            Data::Empty | Data::Error(_) => continue,
            Data::Int(_) => CellKind::Int,
            Data::Float(v) if is_whole(*v) => CellKind::Int,
            Data::Float(_) => CellKind::Float,
            Data::Bool(_) => CellKind::Bool,
            _ => return CellKind::Text,
        };
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Int | CellKind::Float), CellKind::Int | CellKind::Float) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }
    kind.unwrap_or(CellKind::Text)
}

fn build_column(name: &str, cells: &[&Data]) -> Column {
    match classify(cells) {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v),
                    Data::Float(v) => Some(*v as i64),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values).into_column()
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|cell| cell_to_text(cell)).collect();
            Series::new(name.into(), values).into_column()
        }
    }
}

/// Renders a cell as text; `None` for empty and error cells.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::Bool(v) => Some(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(format_datetime)
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.hour() == 0 && value.minute() == 0 && value.second() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_workbook(dir: &TempDir, name: &str, build: impl FnOnce(&mut Workbook)) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut workbook = Workbook::new();
        build(&mut workbook);
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_spreadsheet_typed_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(&dir, "b.xlsx", |wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "id").unwrap();
            ws.write_string(0, 1, "name").unwrap();
            ws.write_string(0, 2, "score").unwrap();
            for (row, (id, name, score)) in [(1.0, "a", 1.5), (2.0, "b", 2.0), (3.0, "c", 3.25)]
                .into_iter()
                .enumerate()
            {
                let row = row as u32 + 1;
                ws.write_number(row, 0, id).unwrap();
                ws.write_string(row, 1, name).unwrap();
                ws.write_number(row, 2, score).unwrap();
            }
        });

        let df = read_spreadsheet_table(&path).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_read_spreadsheet_mixed_column_is_text() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(&dir, "mixed.xlsx", |wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "code").unwrap();
            ws.write_number(1, 0, 7.0).unwrap();
            ws.write_string(2, 0, "X7").unwrap();
        });

        let df = read_spreadsheet_table(&path).unwrap();
        let codes = df.column("code").unwrap();

        assert_eq!(codes.dtype(), &DataType::String);
        let values: Vec<Option<&str>> = codes.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("7"), Some("X7")]);
    }

    #[test]
    fn test_read_spreadsheet_blank_cells_are_null() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(&dir, "gaps.xlsx", |wb| {
            let ws = wb.add_worksheet();
            ws.write_string(0, 0, "id").unwrap();
            ws.write_string(0, 1, "note").unwrap();
            ws.write_number(1, 0, 1.0).unwrap();
            ws.write_number(2, 0, 2.0).unwrap();
            ws.write_string(2, 1, "late").unwrap();
        });

        let df = read_spreadsheet_table(&path).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column("note").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_spreadsheet_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let result = read_spreadsheet_table(&path);
        assert!(matches!(result, Err(IngestError::SpreadsheetParse { .. })));
    }

    #[test]
    fn test_classify() {
        let int = Data::Int(1);
        let whole = Data::Float(2.0);
        let frac = Data::Float(2.5);
        let text = Data::String("x".to_string());
        assert_eq!(classify(&[&int, &whole, &EMPTY]), CellKind::Int);
        assert_eq!(classify(&[&int, &frac]), CellKind::Float);
        assert_eq!(classify(&[&int, &text]), CellKind::Text);
        assert_eq!(classify(&[&EMPTY]), CellKind::Text);
    }

    #[test]
    fn test_format_datetime() {
        let midnight = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let afternoon = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(format_datetime(midnight), "2024-01-15");
        assert_eq!(format_datetime(afternoon), "2024-01-15 13:05:09");
    }
}
