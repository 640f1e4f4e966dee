//! Aggregation run with explicit stages.
//!
//! 1. **Discover**: list the table files in the input folder
//! 2. **Reference**: read the first file to learn the selectable columns
//! 3. **Select**: take the `--columns` list or ask interactively
//! 4. **Aggregate**: extract and tag rows from every file
//! 5. **Output**: write `processed/output.xlsx` unless there is nothing to write

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use tabagg_core::{
    ColumnSelection, FileOutcome, FileReport, Prompt, RunConfig, SelectionOutcome,
    aggregate_with_progress, resolve_selection, select_columns,
};
use tabagg_ingest::{file_name_of, list_table_files, read_table};
use tabagg_output::{ensure_output_dir, write_xlsx};

/// Where the column selection comes from.
#[derive(Debug, Clone, Copy)]
pub enum ColumnSource<'a> {
    /// Ask on the prompt, re-asking until the answer is valid.
    Interactive,
    /// A fixed answer (same syntax as the prompt); invalid input is an error.
    Fixed(&'a str),
}

/// Everything the summary needs about a finished run.
#[derive(Debug)]
pub struct RunSummary {
    pub input_dir: PathBuf,
    /// Output header: the selection followed by the source column.
    pub columns: Vec<String>,
    pub files: Vec<FileReport>,
    pub total_rows: usize,
    /// Written workbook; `None` for dry runs and when nothing qualified.
    pub output_path: Option<PathBuf>,
    pub dry_run: bool,
}

/// How a run ended without error.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    Cancelled,
}

fn output_columns(selection: &ColumnSelection, source_column: &str) -> Vec<String> {
    let mut columns: Vec<String> = selection.columns().to_vec();
    if !columns.iter().any(|c| c == source_column) {
        columns.push(source_column.to_string());
    }
    columns
}

fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn describe(report: &FileReport) -> String {
    match &report.outcome {
        FileOutcome::Processed { rows } => {
            format!("Processing file: {} ({rows} rows)", report.file_name)
        }
        FileOutcome::Skipped { missing } => format!(
            "Skipping {}: missing columns {}",
            report.file_name,
            missing.join(", ")
        ),
        FileOutcome::Unreadable { reason } => {
            format!("Skipping {}: could not be read ({reason})", report.file_name)
        }
    }
}

/// Runs discovery, selection, aggregation and output for one folder.
///
/// Environment problems (missing folder, no table files, unreadable first
/// file), an invalid fixed column list, and write failures are errors.
/// Per-file problems are reported in the summary and do not stop the run.
pub fn run_aggregation<P: Prompt>(
    config: &RunConfig,
    columns: ColumnSource<'_>,
    prompt: &mut P,
) -> Result<RunOutcome> {
    let dir = config.input_dir();
    let run_span = info_span!("run", dir = %dir.display());
    let _run_guard = run_span.enter();

    // Stage 1: discover
    let files = list_table_files(dir)?;
    if files.is_empty() {
        bail!(
            "no table files (.csv, .xlsx, .xls) found in {}",
            dir.display()
        );
    }
    prompt.show(&format!("Found {} files.", files.len()));

    // Stage 2: reference schema from the first file
    let reference = read_table(&files[0]).with_context(|| {
        format!(
            "could not read the first file {} to determine columns",
            file_name_of(&files[0])
        )
    })?;
    let schema = reference.column_names();

    // Stage 3: select
    let selection = match columns {
        ColumnSource::Fixed(text) => resolve_selection(text, &schema, config)?,
        ColumnSource::Interactive => match select_columns(prompt, &schema, config)? {
            SelectionOutcome::Selected(selection) => selection,
            SelectionOutcome::Cancelled => return Ok(RunOutcome::Cancelled),
        },
    };
    info!(columns = ?selection.columns(), "Columns selected");

    // Stage 4: aggregate
    let started = Instant::now();
    let bar = progress_bar(files.len());
    let report = aggregate_with_progress(&files, &selection, config, Some(reference), |file| {
        bar.set_message(file.file_name.clone());
        bar.suspend(|| prompt.show(&describe(file)));
        bar.inc(1);
    })?;
    bar.finish_and_clear();
    info!(
        processed = report.processed_count(),
        skipped = report.skipped_count(),
        unreadable = report.unreadable_count(),
        duration_ms = started.elapsed().as_millis(),
        "aggregation finished"
    );

    // Stage 5: output
    let total_rows = report.total_rows();
    let output_path = match &report.output {
        None => {
            prompt.show("No files processed, no data to aggregate.");
            None
        }
        Some(_) if config.dry_run => None,
        Some(df) => {
            ensure_output_dir(dir, &config.output_subdir)?;
            let path = config.output_path();
            write_xlsx(df, &path).with_context(|| format!("write {}", path.display()))?;
            Some(path)
        }
    };

    Ok(RunOutcome::Completed(RunSummary {
        input_dir: dir.to_path_buf(),
        columns: output_columns(&selection, &config.source_column),
        files: report.files,
        total_rows,
        output_path,
        dry_run: config.dry_run,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabagg_core::validate_selection;

    #[test]
    fn test_output_columns_appends_source() {
        let schema = vec!["id".to_string(), "name".to_string()];
        let selection = validate_selection(schema.clone(), &schema).unwrap();

        assert_eq!(
            output_columns(&selection, "Source_name"),
            vec!["id", "name", "Source_name"]
        );
    }

    #[test]
    fn test_output_columns_source_already_selected() {
        let schema = vec!["Source_name".to_string(), "id".to_string()];
        let selection = validate_selection(schema.clone(), &schema).unwrap();

        assert_eq!(
            output_columns(&selection, "Source_name"),
            vec!["Source_name", "id"]
        );
    }

    #[test]
    fn test_describe_skipped() {
        let report = FileReport {
            file_name: "c.csv".into(),
            outcome: FileOutcome::Skipped {
                missing: vec!["id".into(), "name".into()],
            },
        };
        assert_eq!(describe(&report), "Skipping c.csv: missing columns id, name");
    }
}
