//! Tabular aggregator CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tabagg_cli::console::{
    CANCELLED_MESSAGE, StdinPrompt, install_interrupt_handler, resolve_input_dir,
};
use tabagg_cli::logging::{LogConfig, LogFormat, init_logging};
use tabagg_cli::pipeline::{ColumnSource, RunOutcome, run_aggregation};
use tabagg_cli::summary::print_summary;
use tabagg_core::RunConfig;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = install_interrupt_handler() {
        tracing::warn!(error = %error, "Ctrl-C will terminate without a message");
    }
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let mut prompt = StdinPrompt;
    let folder = match resolve_input_dir(cli.folder, &mut prompt) {
        Ok(Some(folder)) => folder,
        Ok(None) => {
            println!("{CANCELLED_MESSAGE}");
            return 0;
        }
        Err(error) => {
            eprintln!("error: {error}");
            return 1;
        }
    };

    let config = RunConfig::new(folder).with_dry_run(cli.dry_run);
    let columns = match cli.columns.as_deref() {
        Some(list) => ColumnSource::Fixed(list),
        None => ColumnSource::Interactive,
    };

    match run_aggregation(&config, columns, &mut prompt) {
        Ok(RunOutcome::Completed(summary)) => {
            print_summary(&summary);
            0
        }
        Ok(RunOutcome::Cancelled) => {
            println!("{CANCELLED_MESSAGE}");
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
