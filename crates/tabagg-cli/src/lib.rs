//! CLI library components for the tabular aggregator.

pub mod console;
pub mod logging;
pub mod pipeline;
pub mod summary;
