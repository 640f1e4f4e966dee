//! Column selection: parsing, validation, and the interactive loop.
//!
//! The pure pieces ([`parse_selection_input`], [`validate_selection`],
//! [`resolve_selection`]) carry all of the rules; [`select_columns`] only
//! drives a [`Prompt`] until they produce a valid selection.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::SelectionError;
use crate::prompt::{Prompt, PromptResponse};

/// Token selecting every column of the reference schema.
pub const ALL_SENTINEL: &str = "ALL";

/// Question shown when asking for columns.
pub const COLUMN_QUESTION: &str = "To select ALL the columns, type ALL or enter the column names to keep \
     (comma-separated, leave empty to use columns.txt): ";

/// A validated, ordered list of column names to extract from every file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<String>,
}

impl ColumnSelection {
    /// Column names in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

/// Interpretation of one line typed at the column prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    /// `ALL` in any letter case.
    All,
    /// Empty line: read the companion list file instead.
    FromCompanionFile,
    /// Explicit comma-separated names.
    Columns(Vec<String>),
}

/// Result of the interactive selection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(ColumnSelection),
    Cancelled,
}

/// Classifies a raw prompt answer.
pub fn parse_selection_input(line: &str) -> SelectionInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        SelectionInput::FromCompanionFile
    } else if trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        SelectionInput::All
    } else {
        SelectionInput::Columns(parse_column_list(trimmed))
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
///
/// Line breaks count as separators so a list spread over several lines
/// parses the same as one line.
pub fn parse_column_list(text: &str) -> Vec<String> {
    text.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Selected names absent from `schema`, in selection order.
pub fn missing_columns<S: AsRef<str>>(selection: &[S], schema: &[String]) -> Vec<String> {
    let available: HashSet<&str> = schema.iter().map(String::as_str).collect();
    selection
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !available.contains(name))
        .map(ToString::to_string)
        .collect()
}

/// Checks every name against the reference schema.
///
/// All missing names are reported together. Repeated names keep their first
/// position only, since a table cannot hold two columns with the same name.
pub fn validate_selection(
    names: Vec<String>,
    schema: &[String],
) -> Result<ColumnSelection, SelectionError> {
    if names.is_empty() {
        return Err(SelectionError::Empty);
    }

    let missing = missing_columns(&names, schema);
    if !missing.is_empty() {
        return Err(SelectionError::MissingColumns(missing));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        if seen.insert(name.clone()) {
            columns.push(name);
        } else {
            warn!(column = %name, "Column selected more than once; keeping the first");
        }
    }
    Ok(ColumnSelection { columns })
}

/// Reads the companion column list.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_companion_columns(path: &Path) -> Result<Option<Vec<String>>, SelectionError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let names = parse_column_list(contents.trim_start_matches('\u{feff}'));
            debug!(path = %path.display(), count = names.len(), "Loaded column list");
            Ok(Some(names))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SelectionError::CompanionRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Turns one prompt answer into a validated selection.
pub fn resolve_selection(
    line: &str,
    schema: &[String],
    config: &RunConfig,
) -> Result<ColumnSelection, SelectionError> {
    match parse_selection_input(line) {
        SelectionInput::All => validate_selection(schema.to_vec(), schema),
        SelectionInput::Columns(names) => validate_selection(names, schema),
        SelectionInput::FromCompanionFile => {
            let path = config.companion_path();
            match load_companion_columns(&path)? {
                Some(names) => validate_selection(names, schema),
                None => Err(SelectionError::CompanionMissing { path }),
            }
        }
    }
}

/// Asks for columns until a valid selection is given or the user cancels.
pub fn select_columns<P: Prompt>(
    prompt: &mut P,
    schema: &[String],
    config: &RunConfig,
) -> io::Result<SelectionOutcome> {
    prompt.show(
        "\nIf you want to select ALL columns, type ALL. Else you can choose amongst the available columns:",
    );
    prompt.show(&schema.join(", "));

    loop {
        let line = match prompt.ask(COLUMN_QUESTION)? {
            PromptResponse::Line(line) => line,
            PromptResponse::Interrupted => return Ok(SelectionOutcome::Cancelled),
        };

        match resolve_selection(&line, schema, config) {
            Ok(selection) => {
                debug!(columns = ?selection.columns(), "Column selection accepted");
                return Ok(SelectionOutcome::Selected(selection));
            }
            Err(err) => {
                warn!(error = %err, "Column selection rejected");
                prompt.show(&format!("Error: {err}"));
                match err {
                    SelectionError::CompanionMissing { .. } => {
                        prompt.show("Enter the column names or ALL instead.");
                    }
                    _ => prompt.show("Please check the spelling and try again."),
                }
            }
        }
    }
}
