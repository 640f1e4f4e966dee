//! Diagnostics setup on top of `tracing-subscriber`.
//!
//! Prompts and the run summary go straight to stdout; only diagnostics pass
//! through here, so the default level is `warn` to keep the interactive
//! session readable.
//!
//! | Level   | What shows up                                        |
//! |---------|------------------------------------------------------|
//! | `error` | failures that end the run                            |
//! | `warn`  | skipped or unreadable files, rejected column lists   |
//! | `info`  | per-file row counts, output location, timings        |
//! | `debug` | separator detection, loaded column lists             |

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Targets that follow the configured level; everything else stays at warn.
const WORKSPACE_CRATES: &[&str] = &[
    "tabagg",
    "tabagg_cli",
    "tabagg_core",
    "tabagg_ingest",
    "tabagg_output",
];

/// Event layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level applied to the workspace crates.
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the computed directives.
    pub use_env_filter: bool,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of stderr. File output is timestamped.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_target: false,
            with_ansi: true,
            format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

/// Installs the global subscriber.
///
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(event_layer(config, writer))
        .try_init()
        .map_err(io::Error::other)
}

fn event_layer<S>(config: &LogConfig, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let to_file = config.log_file.is_some();
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target)
        .with_ansi(config.with_ansi && !to_file);

    match (config.format, to_file) {
        (LogFormat::Json, _) => layer.json().with_ansi(false).boxed(),
        (LogFormat::Compact, true) => layer.compact().boxed(),
        (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => layer.boxed(),
        (LogFormat::Pretty, false) => layer.without_time().boxed(),
    }
}

/// `warn` for dependencies, `level` for the workspace crates.
fn default_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(WORKSPACE_CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let computed = || EnvFilter::new(default_directives(config.level_filter));
    if !config.use_env_filter {
        return computed();
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| computed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_quiet() {
        let config = LogConfig::default();
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_directives_scope_level_to_workspace() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("tabagg_core=debug"));
        assert!(directives.contains("tabagg_ingest=debug"));
        assert!(!directives.contains("polars"));
    }

    #[test]
    fn test_quiet_silences_workspace() {
        assert!(default_directives(LevelFilter::OFF).contains("tabagg_cli=off"));
    }

    #[test]
    fn test_explicit_level_ignores_env() {
        let config = LogConfig {
            level_filter: LevelFilter::INFO,
            use_env_filter: false,
            ..LogConfig::default()
        };
        assert!(build_env_filter(&config).to_string().contains("tabagg_output=info"));
    }
}
