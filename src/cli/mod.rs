//! CLI module for csv2influx.
//!
//! This module handles command-line argument parsing, logging setup and
//! dispatch to the conversion command.

pub mod convert;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use env_logger::Env;

include!("definition.rs");

/// Version string with git hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Run the CLI application
pub fn run() {
    let matches = Cli::command().version(VERSION).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = convert::run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Default log filter for the given verbosity flags; `RUST_LOG` wins.
fn log_filter(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(quiet, verbose)))
        .format_timestamp_secs()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false, 0), "info");
        assert_eq!(log_filter(false, 1), "debug");
        assert_eq!(log_filter(false, 3), "trace");
        assert_eq!(log_filter(true, 0), "warn");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["csv2influx", "--field-columns", "speed:int"]);
        assert!(cli.files.is_empty());
        assert_eq!(cli.measurement, "sample_measurement");
        assert_eq!(cli.precision, PrecisionArg::N);
        assert_eq!(cli.delimiter, ",");
        assert_eq!(cli.timeout, 30);
        assert!(!cli.strict);
    }

    #[test]
    fn test_cli_requires_field_columns() {
        assert!(Cli::try_parse_from(["csv2influx", "data.csv"]).is_err());
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["csv2influx", "--field-columns", "v:float", "-q", "-v"])
            .is_err());
    }

    #[test]
    fn test_cli_underscore_aliases() {
        let cli = Cli::parse_from([
            "csv2influx",
            "--field_columns",
            "v:float",
            "--tag_columns",
            "host",
            "--output_path",
            "out/",
            "--load_url",
            "http://localhost:8086/write?db=x",
        ]);
        assert_eq!(cli.field_columns, "v:float");
        assert_eq!(cli.tag_columns.as_deref(), Some("host"));
        assert_eq!(cli.output_path.as_deref(), Some("out/"));
        assert!(cli.load_url.is_some());
    }
}
