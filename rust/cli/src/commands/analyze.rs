//! Full pipeline over the input folder.
//!
//! Every scenario file is parsed, classified and aggregated; the rows of all
//! files are saved as one parsed file and reported against the configured KPIs.

use std::io::Write;
use std::path::PathBuf;

use rangekpi_engine::aggregate::AggregatedRow;
use rangekpi_engine::errors::PipelineError;
use rangekpi_engine::lookup::{DirectClassifier, MadeHandSource};
use rangekpi_engine::pipeline::{process_file, PipelineOptions};
use rangekpi_engine::range::Action;
use tracing::{info, warn};

use crate::cli::ReportFormat;
use crate::commands::report::report_rows;
use crate::config::{self, RunContext};
use crate::error::{BatchValidationError, CliError};
use crate::input::{discover_scenarios, mark_as_processed, ScenarioFile};
use crate::io_utils::read_text_lossy;
use crate::store;
use crate::ui;

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub input: Option<String>,
    pub output: Option<String>,
    pub format: ReportFormat,
    pub sequential: bool,
}

/// Handles the analyze command.
///
/// Files without any valid row are reported and skipped; the command only
/// fails when no file produced rows.
pub fn handle_analyze_command(
    args: AnalyzeArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources().map_err(|e| {
        let _ = ui::write_error(err, &format!("Invalid configuration: {}", e));
        CliError::Config(format!("Invalid configuration: {}", e))
    })?;
    let cfg = resolved.config;
    let ctx = RunContext::now();

    let input_dir = args.input.map(PathBuf::from).unwrap_or_else(|| cfg.input_path());
    let output_dir = args.output.map(PathBuf::from).unwrap_or_else(|| cfg.output_path());
    let opts = PipelineOptions {
        parallel: cfg.parallel && !args.sequential,
    };

    let files = discover_scenarios(&input_dir)?;
    if files.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "No scenario files found in {}",
            input_dir.display()
        )));
    }
    info!(files = files.len(), input = %input_dir.display(), "Found scenario files");

    let table = if cfg.save_cache {
        Some(store::load_cache(&output_dir)?)
    } else {
        None
    };
    let source: &dyn MadeHandSource = match &table {
        Some(t) => t,
        None => &DirectClassifier,
    };

    let mut rows: Vec<AggregatedRow> = Vec::new();
    let mut actions: Vec<Action> = Vec::new();
    let mut board = None;
    let mut read_files: Vec<&ScenarioFile> = Vec::new();
    let mut skipped_lines: Vec<BatchValidationError<String>> = Vec::new();
    let mut skipped_files: Vec<BatchValidationError<String>> = Vec::new();

    for (index, file) in files.iter().enumerate() {
        let content = match read_text_lossy(&file.path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "Cannot read scenario file");
                skipped_files.push(BatchValidationError {
                    item_context: file.file_name.clone(),
                    message: format!("cannot read file: {}", e),
                });
                continue;
            }
        };
        read_files.push(file);
        match process_file(index, &file.file_name, &file.scenario, &content, opts, source) {
            Ok(report) => {
                for f in &report.failures {
                    skipped_lines.push(BatchValidationError {
                        item_context: format!("{}:{}", file.file_name, f.row.line),
                        message: f.error.clone(),
                    });
                }
                rows.extend(report.rows);
                actions.push(file.scenario.action);
                board.get_or_insert_with(|| file.scenario.board.clone());
            }
            Err(e @ PipelineError::EmptyInputPopulation { .. }) => {
                warn!(file = %file.file_name, "Scenario file produced no rows");
                skipped_files.push(BatchValidationError {
                    item_context: file.file_name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    for e in &skipped_lines {
        ui::display_warning(err, &format!("Skipped line {}", e))?;
    }
    for e in &skipped_files {
        ui::display_warning(err, &format!("Skipped file {}", e))?;
    }

    let Some(board) = board else {
        return Err(CliError::Engine(format!(
            "No valid range entries in {}",
            input_dir.display()
        )));
    };

    let base = store::parsed_base_name(&ctx, &board, &actions);
    let parsed = store::save_parsed(&output_dir, &base, &rows)?;
    writeln!(err, "Saved {} rows to {}", rows.len(), parsed.display())?;
    if cfg.save_cache_copy_as_csv {
        store::write_rows_csv(&rows, &output_dir.join(format!("{}.csv", base)))?;
    }
    if let Some(t) = &table {
        store::save_cache(&output_dir, t)?;
    }
    // inputs leave the input folder only once their rows are saved
    if cfg.move_files_to_processed_folder {
        for file in read_files {
            mark_as_processed(file, &ctx, cfg.add_timestamp_to_processed_files)?;
        }
    }

    report_rows(&rows, &resolved.kpi_set, args.format, out, err)
}
