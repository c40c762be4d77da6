//! KPI report command and the report renderer shared with `analyze`.

use std::io::Write;
use std::path::PathBuf;

use rangekpi_engine::aggregate::AggregatedRow;
use rangekpi_engine::kpi::{partition, KpiSet, Partition};

use crate::cli::ReportFormat;
use crate::config;
use crate::error::CliError;
use crate::store;
use crate::ui;

/// Handles the report command.
///
/// Loads `file`, or the newest parsed file in the configured output folder,
/// and prints its KPI partition.
pub fn handle_report_command(
    file: Option<String>,
    format: ReportFormat,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources().map_err(|e| {
        let _ = ui::write_error(err, &format!("Invalid configuration: {}", e));
        CliError::Config(format!("Invalid configuration: {}", e))
    })?;

    let path = match file {
        Some(f) => PathBuf::from(f),
        None => {
            let dir = resolved.config.output_path();
            store::newest_parsed(&dir)?.ok_or_else(|| {
                CliError::InvalidInput(format!("No parsed files in {}", dir.display()))
            })?
        }
    };
    let rows = store::load_parsed(&path)?;
    writeln!(err, "Report for {}", path.display())?;
    report_rows(&rows, &resolved.kpi_set, format, out, err)
}

/// Partitions `rows` and prints the result.
pub fn report_rows(
    rows: &[AggregatedRow],
    kpis: &KpiSet,
    format: ReportFormat,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if kpis.is_empty() {
        ui::display_warning(err, "No KPIs configured; nothing to report")?;
    }
    let partition = partition(rows, kpis)?;
    match format {
        ReportFormat::Json => {
            let s = serde_json::to_string_pretty(&partition).map_err(std::io::Error::other)?;
            writeln!(out, "{}", s)?;
        }
        ReportFormat::Text => render_text(&partition, out)?,
    }
    Ok(())
}

fn one_line(label: &str) -> String {
    label.replace('\n', " ")
}

/// Writes one line per KPI bucket and then the bet-size distribution.
pub fn render_text(partition: &Partition, out: &mut dyn Write) -> std::io::Result<()> {
    let Some(first) = partition.buckets.first() else {
        writeln!(out, "Unclassified rows: {}", partition.unclassified.len())?;
        return Ok(());
    };
    let width = partition
        .buckets
        .iter()
        .map(|b| one_line(&b.label).len())
        .max()
        .unwrap_or(0)
        .max(3);

    write!(out, "{:<width$}  {:>8}", "KPI", "rows")?;
    for action in first.actions.keys() {
        write!(out, "  {:>8}", action.to_string())?;
    }
    writeln!(out)?;
    for bucket in &partition.buckets {
        write!(out, "{:<width$}  {:>8}", one_line(&bucket.label), bucket.rows.len())?;
        for share in bucket.actions.values() {
            write!(out, "  {:>8}", ui::percent(*share))?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Unclassified rows: {}", partition.unclassified.len())?;

    let Some(sizes) = partition.bet_sizes.first() else {
        return Ok(());
    };
    if sizes.sizes.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    write!(out, "{:<width$}", "Bet sizes")?;
    for action in sizes.sizes.keys() {
        write!(out, "  {:>8}", action.to_string())?;
    }
    writeln!(out)?;
    for bucket in &partition.bet_sizes {
        write!(out, "{:<width$}", one_line(&bucket.label))?;
        for share in bucket.sizes.values() {
            write!(out, "  {:>8}", ui::percent(*share))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
