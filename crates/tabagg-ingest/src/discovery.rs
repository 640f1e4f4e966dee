//! Input file discovery for an aggregation folder.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extensions read as delimited text.
pub const DELIMITED_EXTENSIONS: &[&str] = &["csv"];

/// Extensions read as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Physical format of an input table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma- or semicolon-separated text.
    Delimited,
    /// Excel workbook (first worksheet is read).
    Spreadsheet,
}

impl TableFormat {
    /// Classifies a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if DELIMITED_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        {
            Some(Self::Delimited)
        } else if SPREADSHEET_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        {
            Some(Self::Spreadsheet)
        } else {
            None
        }
    }
}

/// Lists all table files (CSV, XLSX, XLS) directly inside a directory.
///
/// Subdirectories are not descended into. Returns files sorted by filename.
pub fn list_table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        if TableFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }

    // Sort by filename
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(dir = %dir.display(), count = files.len(), "Listed table files");
    Ok(files)
}

/// Returns the final path component as a displayable string.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
