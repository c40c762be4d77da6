//! Configuration command handler.
//!
//! Displays the resolved configuration with the source of every value
//! (default, environment, or configuration file).
//!
//! # Example Output
//!
//! ```json
//! {
//!   "input_folder": {
//!     "value": "input",
//!     "source": "default"
//!   },
//!   "parallel": {
//!     "value": true,
//!     "source": "env"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved {
        config, sources, ..
    } = resolved;
    let display = serde_json::json!({
        "input_folder": {
            "value": config.input_folder,
            "source": sources.input_folder,
        },
        "output_folder": {
            "value": config.output_folder,
            "source": sources.output_folder,
        },
        "move_files_to_processed_folder": {
            "value": config.move_files_to_processed_folder,
            "source": sources.move_files_to_processed_folder,
        },
        "add_timestamp_to_processed_files": {
            "value": config.add_timestamp_to_processed_files,
            "source": sources.add_timestamp_to_processed_files,
        },
        "save_cache": {
            "value": config.save_cache,
            "source": sources.save_cache,
        },
        "save_cache_copy_as_csv": {
            "value": config.save_cache_copy_as_csv,
            "source": sources.save_cache_copy_as_csv,
        },
        "log_to_file": {
            "value": config.log_to_file,
            "source": sources.log_to_file,
        },
        "parallel": {
            "value": config.parallel,
            "source": sources.parallel,
        },
        "kpis": {
            "value": config.kpis,
            "source": sources.kpis,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cfg_displays_json_output() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_cfg_command(&mut out, &mut err);
        assert!(result.is_ok(), "cfg command should succeed");

        let output = String::from_utf8(out).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&output).expect("cfg output should be valid JSON");

        for key in [
            "input_folder",
            "output_folder",
            "move_files_to_processed_folder",
            "add_timestamp_to_processed_files",
            "save_cache",
            "save_cache_copy_as_csv",
            "log_to_file",
            "parallel",
            "kpis",
        ] {
            assert!(json[key].get("value").is_some(), "missing value for {}", key);
            assert!(json[key].get("source").is_some(), "missing source for {}", key);
        }
        assert!(String::from_utf8(err).unwrap().is_empty());
    }

    #[test]
    #[serial]
    fn test_cfg_writes_pretty_json() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        if handle_cfg_command(&mut out, &mut err).is_ok() {
            let output = String::from_utf8(out).unwrap();
            assert!(output.contains('\n'), "output should be pretty-printed");
            assert!(output.contains("  "), "output should be indented");
        }
    }
}
