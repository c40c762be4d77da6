//! # rangekpi CLI Library
//!
//! Command-line interface for the rangekpi range classification engine.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line
//! arguments and executes the appropriate subcommand.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["rangekpi", "analyze", "--input", "input", "--format", "json"];
//! let code = rangekpi_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `analyze`: Classify every scenario file in the input folder and report KPIs
//! - `report`: Report KPIs for a previously parsed file
//! - `classify`: Classify a single 5-card hand
//! - `export`: Convert a parsed file to CSV, JSON or SQLite
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod input;
pub mod io_utils;
pub mod logging;
mod macros;
pub mod store;
pub mod ui;

use cli::{Commands, RangeKpiCli, COMMANDS};
use commands::{
    handle_analyze_command, handle_cfg_command, handle_classify_command, handle_export_command,
    handle_report_command, AnalyzeArgs,
};

pub use error::{BatchValidationError, CliError};

/// Name of the log file written when `log_to_file` is enabled.
pub const LOG_FILE: &str = "rangekpi.log";

/// Log file for one invocation, or `None` when `log_to_file` is off.
///
/// The file sits in the run's output folder, so `analyze --output` moves it
/// along with the parsed output.
pub fn log_file_path(argv: &[String], cfg: &config::Config) -> Option<PathBuf> {
    if !cfg.log_to_file {
        return None;
    }
    let dir = match RangeKpiCli::try_parse_from(argv) {
        Ok(RangeKpiCli {
            cmd: Commands::Analyze {
                output: Some(output),
                ..
            },
        }) => PathBuf::from(output),
        _ => cfg.output_path(),
    };
    Some(dir.join(LOG_FILE))
}

/// Main entry point for the CLI application.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["rangekpi", "classify", "AhKhQhJhTh"];
/// let code = rangekpi_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match RangeKpiCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "rangekpi range KPI analyzer");
                    write_or_exit!(err, "Usage: rangekpi <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: rangekpi --help");
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Analyze {
            input,
            output,
            format,
            sequential,
        } => handle_analyze_command(
            AnalyzeArgs {
                input,
                output,
                format,
                sequential,
            },
            out,
            err,
        ),
        Commands::Report { file, format } => handle_report_command(file, format, out, err),
        Commands::Classify { hand } => handle_classify_command(&hand, out),
        Commands::Export {
            input,
            format,
            output,
        } => handle_export_command(input, output, format, out, err),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cfg_command_dispatch() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["rangekpi", "cfg"], &mut out, &mut err);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("input_folder"));
    }

    #[test]
    fn test_classify_command_dispatch() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["rangekpi", "classify", "AhKhQhJhTh"], &mut out, &mut err);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("Straight Flush"));
    }

    #[test]
    fn test_unknown_command_lists_commands() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["rangekpi", "plot"], &mut out, &mut err);
        assert_eq!(code, 2);
        let err = String::from_utf8(err).unwrap();
        for c in COMMANDS {
            assert!(err.contains(c), "missing {}", c);
        }
    }

    #[test]
    fn test_command_errors_exit_with_error_code() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["rangekpi", "classify", "AhKh"], &mut out, &mut err);
        assert_eq!(code, exit_code::ERROR);
        assert!(String::from_utf8(err).unwrap().starts_with("Error: "));
    }

    #[test]
    fn test_log_file_follows_analyze_output() {
        let argv =
            |args: &[&str]| -> Vec<String> { args.iter().map(|s| s.to_string()).collect() };
        let mut cfg = config::Config {
            output_folder: "configured".into(),
            ..config::Config::default()
        };
        assert_eq!(log_file_path(&argv(&["rangekpi", "analyze"]), &cfg), None);

        cfg.log_to_file = true;
        assert_eq!(
            log_file_path(&argv(&["rangekpi", "analyze", "--output", "run-out"]), &cfg),
            Some(PathBuf::from("run-out").join(LOG_FILE))
        );
        assert_eq!(
            log_file_path(&argv(&["rangekpi", "report"]), &cfg),
            Some(PathBuf::from("configured").join(LOG_FILE))
        );
        assert_eq!(
            log_file_path(&argv(&["rangekpi", "bogus"]), &cfg),
            Some(PathBuf::from("configured").join(LOG_FILE))
        );
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["rangekpi", "--help"], &mut out, &mut err);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("analyze"));
        assert!(err.is_empty());
    }
}
