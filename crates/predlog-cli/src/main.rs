//! predlog command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use predlog_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use predlog_cli::commands::{run_align, run_audit, run_describe, run_reconcile};
use predlog_cli::config::load_config;
use predlog_cli::logging::{LogConfig, LogFormat, init_logging};
use predlog_cli::summary::{print_alignment, print_analytics, print_quality, print_reconcile};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => return fail(&error),
    };
    match &cli.command {
        Command::Reconcile(args) => match run_reconcile(args, &config) {
            Ok(outcome) => {
                let code = if args.json {
                    print_json(&outcome)
                } else {
                    print_reconcile(&outcome);
                    0
                };
                code.max(i32::from(outcome.sink_failed()))
            }
            Err(error) => fail(&error),
        },
        Command::Audit(args) => match run_audit(args, &config) {
            Ok(report) if args.json => print_json(&report),
            Ok(report) => {
                print_quality(&report);
                0
            }
            Err(error) => fail(&error),
        },
        Command::Describe(args) => match run_describe(args, &config) {
            Ok(summary) if args.json => print_json(&summary),
            Ok(summary) => {
                print_analytics(&summary);
                0
            }
            Err(error) => fail(&error),
        },
        Command::Align(args) => match run_align(args, &config) {
            Ok(outcome) => {
                print_alignment(&outcome);
                0
            }
            Err(error) => fail(&error),
        },
    }
}

fn fail(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(error) => fail(&error.into()),
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
