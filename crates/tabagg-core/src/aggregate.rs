//! Row aggregation across input files.
//!
//! Every file is read once, checked against the selection, restricted to the
//! selected columns and tagged with its file name. Files that lack any
//! selected column or cannot be read are skipped; the run continues.

use std::path::PathBuf;

use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series};
use tracing::{debug, info, info_span, warn};

use tabagg_ingest::{SourceTable, file_name_of, read_table};

use crate::config::RunConfig;
use crate::error::Result;
use crate::selection::{ColumnSelection, missing_columns};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Rows were extracted.
    Processed { rows: usize },
    /// Selected columns absent from this file; nothing extracted.
    Skipped { missing: Vec<String> },
    /// The file could not be loaded or restricted.
    Unreadable { reason: String },
}

/// Outcome for one file, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: FileOutcome,
}

/// Result of an aggregation pass.
#[derive(Debug)]
pub struct AggregateReport {
    /// One entry per enumerated file.
    pub files: Vec<FileReport>,
    /// Stacked batches, or `None` when no file was processed.
    pub output: Option<DataFrame>,
}

impl AggregateReport {
    pub fn processed_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Processed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn unreadable_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Unreadable { .. }))
    }

    /// Rows in the aggregated output.
    pub fn total_rows(&self) -> usize {
        self.output.as_ref().map_or(0, DataFrame::height)
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Restricts a table to the selection and appends the source column.
pub fn build_batch(
    table: &SourceTable,
    selection: &ColumnSelection,
    source_column: &str,
) -> Result<DataFrame> {
    let mut batch = table.data.select(selection.iter())?;
    let source = Series::new(
        source_column.into(),
        vec![table.file_name.as_str(); batch.height()],
    )
    .into_column();
    batch.with_column(source)?;
    Ok(batch)
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Type a column must have so that all batches can be stacked.
///
/// Null-typed columns adopt the others' type; mixed numeric types widen to
/// Float64; anything else falls back to String.
fn common_dtype(dtypes: &[DataType]) -> DataType {
    let typed: Vec<&DataType> = dtypes.iter().filter(|d| **d != DataType::Null).collect();
    match typed.first() {
        None => DataType::String,
        Some(first) if typed.iter().all(|d| d == first) => (*first).clone(),
        _ if typed.iter().all(|d| is_numeric(d)) => DataType::Float64,
        _ => DataType::String,
    }
}

fn harmonize_dtypes(batches: &mut [DataFrame]) -> Result<()> {
    let Some(first) = batches.first() else {
        return Ok(());
    };
    let names: Vec<String> = first
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    for name in &names {
        let mut dtypes = Vec::with_capacity(batches.len());
        for batch in batches.iter() {
            dtypes.push(batch.column(name)?.dtype().clone());
        }
        if dtypes.windows(2).all(|pair| pair[0] == pair[1]) {
            continue;
        }

        let target = common_dtype(&dtypes);
        debug!(column = %name, dtype = ?target, "Widening column type across files");
        for batch in batches.iter_mut() {
            if batch.column(name)?.dtype() == &target {
                continue;
            }
            let cast = batch.column(name)?.cast(&target)?;
            batch.with_column(cast)?;
        }
    }

    Ok(())
}

/// Stacks batches row-wise in order. `None` when there are no batches.
pub fn concat_batches(mut batches: Vec<DataFrame>) -> Result<Option<DataFrame>> {
    harmonize_dtypes(&mut batches)?;

    let mut iter = batches.into_iter();
    let Some(mut combined) = iter.next() else {
        return Ok(None);
    };
    for batch in iter {
        combined.vstack_mut(&batch)?;
    }
    Ok(Some(combined))
}

/// Aggregates `files` in order. See [`aggregate_with_progress`].
pub fn aggregate(
    files: &[PathBuf],
    selection: &ColumnSelection,
    config: &RunConfig,
    reference: Option<SourceTable>,
) -> Result<AggregateReport> {
    aggregate_with_progress(files, selection, config, reference, |_| {})
}

/// Aggregates `files` in order, calling `on_file` after each one.
///
/// `reference` is the table already loaded for schema discovery; it is used
/// in place of re-reading the file at the same path. The output is `None`
/// only when no file was processed; processed files without data rows still
/// yield a header-only frame.
pub fn aggregate_with_progress<F>(
    files: &[PathBuf],
    selection: &ColumnSelection,
    config: &RunConfig,
    mut reference: Option<SourceTable>,
    mut on_file: F,
) -> Result<AggregateReport>
where
    F: FnMut(&FileReport),
{
    let span = info_span!(
        "aggregate",
        dir = %config.input_dir().display(),
        files = files.len()
    );
    let _guard = span.enter();

    let mut batches = Vec::new();
    let mut reports = Vec::with_capacity(files.len());

    for path in files {
        let file_name = file_name_of(path);
        let cached = if reference.as_ref().is_some_and(|t| t.path == *path) {
            reference.take()
        } else {
            None
        };
        let loaded = match cached {
            Some(table) => Ok(table),
            None => read_table(path),
        };

        let outcome = match loaded {
            Err(err) => {
                warn!(file = %file_name, error = %err, "Skipping unreadable file");
                FileOutcome::Unreadable {
                    reason: err.to_string(),
                }
            }
            Ok(table) => {
                let missing = missing_columns(selection.columns(), &table.column_names());
                if !missing.is_empty() {
                    warn!(file = %file_name, missing = ?missing, "Skipping file with missing columns");
                    FileOutcome::Skipped { missing }
                } else {
                    match build_batch(&table, selection, &config.source_column) {
                        Ok(batch) => {
                            let rows = batch.height();
                            info!(file = %file_name, rows, "Processed file");
                            batches.push(batch);
                            FileOutcome::Processed { rows }
                        }
                        Err(err) => {
                            warn!(file = %file_name, error = %err, "Skipping file");
                            FileOutcome::Unreadable {
                                reason: err.to_string(),
                            }
                        }
                    }
                }
            }
        };

        let report = FileReport { file_name, outcome };
        on_file(&report);
        reports.push(report);
    }

    let output = concat_batches(batches)?;
    info!(
        rows = output.as_ref().map_or(0, DataFrame::height),
        "Aggregation complete"
    );

    Ok(AggregateReport {
        files: reports,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::validate_selection;
    use polars::prelude::{Column, DataFrame};
    use std::path::Path;
    use tabagg_ingest::TableFormat;

    fn string_column(name: &str, values: &[&str]) -> Column {
        Series::new(name.into(), values.to_vec()).into_column()
    }

    fn table(file: &str, columns: Vec<Column>) -> SourceTable {
        SourceTable::new(
            Path::new(file),
            TableFormat::Delimited,
            DataFrame::new(columns).unwrap(),
        )
    }

    fn selection(names: &[&str], schema: &SourceTable) -> ColumnSelection {
        validate_selection(
            names.iter().map(ToString::to_string).collect(),
            &schema.column_names(),
        )
        .unwrap()
    }

    fn source_values(df: &DataFrame) -> Vec<String> {
        df.column("Source_name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_build_batch_restricts_and_tags() {
        let t = table(
            "a.csv",
            vec![
                string_column("id", &["1", "2"]),
                string_column("name", &["x", "y"]),
                string_column("extra", &["p", "q"]),
            ],
        );
        let sel = selection(&["name", "id"], &t);

        let batch = build_batch(&t, &sel, "Source_name").unwrap();

        let names: Vec<String> = batch
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["name", "id", "Source_name"]);
        assert_eq!(source_values(&batch), vec!["a.csv", "a.csv"]);
    }

    #[test]
    fn test_concat_batches_preserves_order() {
        let a = table("a.csv", vec![string_column("id", &["1", "2"])]);
        let b = table("b.csv", vec![string_column("id", &["3"])]);
        let sel = selection(&["id"], &a);

        let combined = concat_batches(vec![
            build_batch(&a, &sel, "Source_name").unwrap(),
            build_batch(&b, &sel, "Source_name").unwrap(),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(combined.height(), 3);
        assert_eq!(source_values(&combined), vec!["a.csv", "a.csv", "b.csv"]);
    }

    #[test]
    fn test_concat_batches_empty() {
        assert!(concat_batches(Vec::new()).unwrap().is_none());
    }

    #[test]
    fn test_concat_widens_mixed_types() {
        let ints = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2]).into_column(),
        ])
        .unwrap();
        let floats = DataFrame::new(vec![
            Series::new("id".into(), vec![2.5f64]).into_column(),
        ])
        .unwrap();
        let text = DataFrame::new(vec![string_column("id", &["x"])]).unwrap();

        let numeric = concat_batches(vec![ints.clone(), floats]).unwrap().unwrap();
        assert_eq!(numeric.column("id").unwrap().dtype(), &DataType::Float64);

        let mixed = concat_batches(vec![ints, text]).unwrap().unwrap();
        assert_eq!(mixed.column("id").unwrap().dtype(), &DataType::String);
        assert_eq!(mixed.height(), 3);
    }

    #[test]
    fn test_common_dtype() {
        assert_eq!(
            common_dtype(&[DataType::Null, DataType::Int64]),
            DataType::Int64
        );
        assert_eq!(
            common_dtype(&[DataType::Int64, DataType::Float64]),
            DataType::Float64
        );
        assert_eq!(
            common_dtype(&[DataType::Boolean, DataType::Int64]),
            DataType::String
        );
        assert_eq!(common_dtype(&[DataType::Null]), DataType::String);
    }

    #[test]
    fn test_report_counts() {
        let report = AggregateReport {
            files: vec![
                FileReport {
                    file_name: "a.csv".into(),
                    outcome: FileOutcome::Processed { rows: 2 },
                },
                FileReport {
                    file_name: "b.csv".into(),
                    outcome: FileOutcome::Skipped {
                        missing: vec!["id".into()],
                    },
                },
                FileReport {
                    file_name: "c.csv".into(),
                    outcome: FileOutcome::Unreadable {
                        reason: "bad".into(),
                    },
                },
            ],
            output: None,
        };

        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.unreadable_count(), 1);
        assert_eq!(report.total_rows(), 0);
    }
}
