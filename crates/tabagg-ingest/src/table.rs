//! In-memory table loaded from one input file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use crate::discovery::{TableFormat, file_name_of};

/// A fully loaded input file.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// File name (last path component), used for Source_name tagging.
    pub file_name: String,
    /// Full path the table was read from.
    pub path: PathBuf,
    /// Format the file was parsed as.
    pub format: TableFormat,
    /// Parsed contents; column names come from the file's header row.
    pub data: DataFrame,
}

impl SourceTable {
    pub fn new(path: &Path, format: TableFormat, data: DataFrame) -> Self {
        Self {
            file_name: file_name_of(path),
            path: path.to_path_buf(),
            format,
            data,
        }
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of data rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.data.height()
    }
}

/// Normalizes raw header names.
///
/// Names are trimmed and stripped of a UTF-8 BOM. Blank names become
/// `Unnamed: <index>`; repeated names get a `_duplicated_<n>` suffix so the
/// frame keeps unique column names.
pub fn normalize_column_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;
    let mut names = Vec::new();

    for (index, name) in raw.into_iter().enumerate() {
        let trimmed = name.as_ref().trim_start_matches('\u{feff}').trim();
        let mut candidate = if trimmed.is_empty() {
            format!("Unnamed: {index}")
        } else {
            trimmed.to_string()
        };
        while seen.contains(&candidate) {
            candidate = format!("{trimmed}_duplicated_{duplicates}");
            duplicates += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
