//! Run configuration passed explicitly to every stage.

use std::path::{Path, PathBuf};

/// Subdirectory of the input folder that receives the output.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "processed";

/// File name of the aggregated workbook.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "output.xlsx";

/// Companion list consulted when the column prompt is left empty.
pub const DEFAULT_COMPANION_FILE_NAME: &str = "columns.txt";

/// Column appended to every batch with the originating file name.
pub const SOURCE_COLUMN: &str = "Source_name";

/// Settings for one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Folder whose table files are aggregated.
    pub input_dir: PathBuf,
    /// Output subdirectory name, relative to `input_dir`.
    pub output_subdir: String,
    /// Output workbook file name.
    pub output_file_name: String,
    /// Companion column list file name, relative to `input_dir`.
    pub companion_file_name: String,
    /// Name of the appended source column.
    pub source_column: String,
    /// Aggregate and report without writing the workbook.
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            companion_file_name: DEFAULT_COMPANION_FILE_NAME.to_string(),
            source_column: SOURCE_COLUMN.to_string(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, enable: bool) -> Self {
        self.dry_run = enable;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// `<input_dir>/processed`
    pub fn output_dir(&self) -> PathBuf {
        self.input_dir.join(&self.output_subdir)
    }

    /// `<input_dir>/processed/output.xlsx`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(&self.output_file_name)
    }

    /// `<input_dir>/columns.txt`
    pub fn companion_path(&self) -> PathBuf {
        self.input_dir.join(&self.companion_file_name)
    }
}
