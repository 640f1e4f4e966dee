//! Terminal interaction: stdin prompts and Ctrl-C handling.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tabagg_core::{Prompt, PromptResponse};

/// Question shown when no folder was given on the command line.
pub const FOLDER_QUESTION: &str = "Enter the path to the folder containing the files: ";

/// Message printed when the user cancels at a prompt.
pub const CANCELLED_MESSAGE: &str = "Cancelled. No output was written.";

/// Message printed on Ctrl-C, which may arrive after the workbook is written.
pub const INTERRUPTED_MESSAGE: &str = "Cancelled.";

/// Prompt reading answers from standard input.
///
/// End of input (Ctrl-D) is reported as an interruption.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<PromptResponse> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => Ok(PromptResponse::Interrupted),
            Ok(_) => Ok(PromptResponse::Line(
                line.trim_end_matches(['\r', '\n']).to_string(),
            )),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(PromptResponse::Interrupted),
            Err(e) => Err(e),
        }
    }

    fn show(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Exit immediately and quietly on Ctrl-C.
///
/// Output is written atomically, so exiting at any point leaves a complete
/// workbook (old or new) or none.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\n{INTERRUPTED_MESSAGE}");
        std::process::exit(0);
    })
    .context("install Ctrl-C handler")
}

/// Cleans a typed or pasted folder path: whitespace and surrounding quotes
/// (as added by drag-and-drop in most terminals) are removed.
pub fn normalize_path_input(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    PathBuf::from(unquoted)
}

/// Returns the folder from the command line, or asks for it.
///
/// `Ok(None)` means the user cancelled.
pub fn resolve_input_dir<P: Prompt>(arg: Option<PathBuf>, prompt: &mut P) -> io::Result<Option<PathBuf>> {
    if let Some(path) = arg {
        return Ok(Some(path));
    }
    match prompt.ask(FOLDER_QUESTION)? {
        PromptResponse::Line(line) => Ok(Some(normalize_path_input(&line))),
        PromptResponse::Interrupted => Ok(None),
    }
}
