//! XLSX workbook generation for the aggregated table.

use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::{Column, DataFrame, DataType};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::common::write_atomic;

/// Maximum number of rows in a worksheet (header included).
pub const XLSX_MAX_ROWS: usize = 1_048_576;

/// Maximum number of columns in a worksheet.
pub const XLSX_MAX_COLUMNS: usize = 16_384;

/// Render a DataFrame as a single-sheet workbook in memory.
///
/// Row 0 holds the column names in bold. Numeric columns become number
/// cells, except integers beyond 2^53 and non-finite floats, which are
/// written as text. Boolean columns become boolean cells, everything else
/// text. Nulls stay blank.
pub fn render_xlsx(df: &DataFrame) -> Result<Vec<u8>> {
    if df.height() + 1 > XLSX_MAX_ROWS {
        bail!(
            "{} rows exceed the worksheet limit of {}",
            df.height(),
            XLSX_MAX_ROWS - 1
        );
    }
    if df.width() > XLSX_MAX_COLUMNS {
        bail!(
            "{} columns exceed the worksheet limit of {XLSX_MAX_COLUMNS}",
            df.width()
        );
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (idx, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(idx).context("column index")?;
        worksheet
            .write_string_with_format(0, col, column.name().as_str(), &header_format)
            .with_context(|| format!("write header {}", column.name()))?;
        write_column(worksheet, col, column)
            .with_context(|| format!("write column {}", column.name()))?;
    }

    workbook.save_to_buffer().context("serialize workbook")
}

/// Write a DataFrame to `path` as an XLSX workbook, replacing any existing file.
pub fn write_xlsx(df: &DataFrame, path: &Path) -> Result<()> {
    let bytes = render_xlsx(df)?;
    write_atomic(path, &bytes)?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Wrote workbook"
    );
    Ok(())
}

/// Largest magnitude an integer can have and still be stored exactly as an
/// XLSX number (IEEE 754 double).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
    )
}

fn is_float(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Writes an integer as a number, or as text when a double would round it.
fn write_i64(worksheet: &mut Worksheet, row: u32, col: u16, value: i64) -> Result<()> {
    if value.unsigned_abs() <= MAX_EXACT_INTEGER {
        worksheet.write_number(row, col, value as f64)?;
    } else {
        worksheet.write_string(row, col, value.to_string())?;
    }
    Ok(())
}

fn write_u64(worksheet: &mut Worksheet, row: u32, col: u16, value: u64) -> Result<()> {
    if value <= MAX_EXACT_INTEGER {
        worksheet.write_number(row, col, value as f64)?;
    } else {
        worksheet.write_string(row, col, value.to_string())?;
    }
    Ok(())
}

fn data_row(idx: usize) -> Result<u32> {
    u32::try_from(idx + 1).context("row index")
}

fn write_column(worksheet: &mut Worksheet, col: u16, column: &Column) -> Result<()> {
    let dtype = column.dtype();
    if is_integer(dtype) {
        let values = column.cast(&DataType::Int64)?;
        for (idx, value) in values.i64()?.into_iter().enumerate() {
            if let Some(v) = value {
                write_i64(worksheet, data_row(idx)?, col, v)?;
            }
        }
    } else if dtype == &DataType::UInt64 {
        for (idx, value) in column.u64()?.into_iter().enumerate() {
            if let Some(v) = value {
                write_u64(worksheet, data_row(idx)?, col, v)?;
            }
        }
    } else if is_float(dtype) {
        let values = column.cast(&DataType::Float64)?;
        for (idx, value) in values.f64()?.into_iter().enumerate() {
            match value {
                Some(v) if v.is_finite() => {
                    worksheet.write_number(data_row(idx)?, col, v)?;
                }
                Some(v) => {
                    worksheet.write_string(data_row(idx)?, col, v.to_string())?;
                }
                None => {}
            }
        }
    } else if dtype == &DataType::Boolean {
        for (idx, value) in column.bool()?.into_iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_boolean(data_row(idx)?, col, v)?;
            }
        }
    } else {
        let values = column.cast(&DataType::String)?;
        for (idx, value) in values.str()?.into_iter().enumerate() {
            if let Some(v) = value {
                worksheet.write_string(data_row(idx)?, col, v)?;
            }
        }
    }
    Ok(())
}
