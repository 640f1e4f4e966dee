//! Column selection and aggregation for the tabular aggregator.
//!
//! - [`selection`]: turn user input (or `columns.txt`) into a validated
//!   [`ColumnSelection`] against a reference schema
//! - [`aggregate`]: extract the selection from every input file, tag rows
//!   with `Source_name`, and stack the batches
//! - [`RunConfig`]: the explicit settings threaded through both

pub mod aggregate;
pub mod config;
mod error;
pub mod prompt;
pub mod selection;

pub use aggregate::{
    AggregateReport, FileOutcome, FileReport, aggregate, aggregate_with_progress, build_batch,
    concat_batches,
};
pub use config::{RunConfig, SOURCE_COLUMN};
pub use error::{CoreError, Result, SelectionError};
#[cfg(any(test, feature = "test-util"))]
pub use prompt::ScriptedPrompt;
pub use prompt::{Prompt, PromptResponse};
pub use selection::{
    ALL_SENTINEL, ColumnSelection, SelectionInput, SelectionOutcome, parse_column_list,
    parse_selection_input, resolve_selection, select_columns, validate_selection,
};
