//! Parsed-file export command.
//!
//! Converts a parsed file into CSV, a JSON array or a SQLite database.

use std::io::Write;
use std::path::Path;

use rangekpi_engine::aggregate::AggregatedRow;
use rangekpi_engine::kpi::{partition, KpiBucket, KpiSet};

use crate::config;
use crate::error::CliError;
use crate::io_utils::{ensure_parent_dir, write_text_auto};
use crate::store::{self, CsvRow};
use crate::ui;

/// Handles the export command.
///
/// # Arguments
///
/// * `input` - Parsed file (`.json.zst` or `.json`)
/// * `output` - Path to output file
/// * `format` - Output format ("csv", "json", or "sqlite")
pub fn handle_export_command(
    input: String,
    output: String,
    format: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let rows = store::load_parsed(Path::new(&input)).inspect_err(|e| {
        let _ = ui::write_error(err, &e.to_string());
    })?;
    let output_path = Path::new(&output);

    match format.as_str() {
        f if f.eq_ignore_ascii_case("csv") => store::write_rows_csv(&rows, output_path)?,
        f if f.eq_ignore_ascii_case("json") => export_json(&rows, output_path)?,
        f if f.eq_ignore_ascii_case("sqlite") => {
            let kpis = config::load_with_sources()
                .map_err(|e| CliError::Config(format!("Invalid configuration: {}", e)))?
                .kpi_set;
            export_sqlite(&rows, &kpis, output_path, err)?
        }
        _ => {
            return Err(CliError::InvalidInput(format!(
                "Unsupported format: {}",
                format
            )));
        }
    }
    writeln!(out, "Exported {} rows to {}", rows.len(), output)?;
    Ok(())
}

fn export_json(rows: &[AggregatedRow], output: &Path) -> Result<(), CliError> {
    let s = serde_json::to_string_pretty(rows)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize JSON: {}", e)))?;
    write_text_auto(output, &s).map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Export to SQLite: a `rows` table and, with KPIs configured, a `buckets`
/// table holding one line per KPI and action.
fn export_sqlite(
    rows: &[AggregatedRow],
    kpis: &KpiSet,
    output: &Path,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    enum ExportAttemptError {
        Busy(String),
        Fatal(String),
    }

    fn sqlite_busy(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(info, _)
                if matches!(
                    info.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }

    fn classify(context: &str) -> impl Fn(rusqlite::Error) -> ExportAttemptError + '_ {
        move |e| {
            if sqlite_busy(&e) {
                ExportAttemptError::Busy(format!("{}: {}", context, e))
            } else {
                ExportAttemptError::Fatal(format!("Failed to {}: {}", context, e))
            }
        }
    }

    fn export_sqlite_attempt(
        rows: &[AggregatedRow],
        buckets: &[KpiBucket],
        output: &Path,
    ) -> Result<(), ExportAttemptError> {
        ensure_parent_dir(output).map_err(ExportAttemptError::Fatal)?;

        let mut conn = rusqlite::Connection::open(output).map_err(classify("open database"))?;
        let tx = conn.transaction().map_err(classify("start transaction"))?;

        tx.execute_batch(
            "DROP TABLE IF EXISTS rows;
             DROP TABLE IF EXISTS buckets;
             CREATE TABLE rows (
                file INTEGER NOT NULL,
                line INTEGER NOT NULL,
                action TEXT NOT NULL,
                weight REAL NOT NULL,
                hole_cards TEXT NOT NULL,
                community_cards TEXT NOT NULL,
                best_hand TEXT NOT NULL,
                best_hand_rank INTEGER NOT NULL,
                is_flush INTEGER NOT NULL,
                is_straight INTEGER NOT NULL,
                is_straight_flush INTEGER NOT NULL,
                is_pair INTEGER NOT NULL,
                is_two_pair INTEGER NOT NULL,
                is_trips INTEGER NOT NULL,
                is_quads INTEGER NOT NULL,
                is_full_house INTEGER NOT NULL,
                pair_rank TEXT NOT NULL,
                full_house_pair_rank TEXT NOT NULL,
                flush_rank TEXT NOT NULL,
                straight_rank TEXT NOT NULL,
                set_rank TEXT NOT NULL,
                flush_draw_tier INTEGER NOT NULL,
                straight_draw_ranks TEXT NOT NULL,
                draw_outs INTEGER NOT NULL,
                PRIMARY KEY (file, line)
             );
             CREATE TABLE buckets (
                position INTEGER NOT NULL,
                display_name TEXT NOT NULL,
                matched_percentage REAL NOT NULL,
                action TEXT NOT NULL,
                share REAL NOT NULL,
                PRIMARY KEY (position, action)
             );",
        )
        .map_err(classify("create schema"))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO rows VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
                )
                .map_err(classify("prepare insert"))?;
            for row in rows {
                let r = CsvRow::from(row);
                stmt.execute(rusqlite::params![
                    r.file as i64,
                    r.line as i64,
                    r.action,
                    r.weight,
                    r.hole_cards,
                    r.community_cards,
                    r.best_hand,
                    r.best_hand_rank,
                    r.is_flush,
                    r.is_straight,
                    r.is_straight_flush,
                    r.is_pair,
                    r.is_two_pair,
                    r.is_trips,
                    r.is_quads,
                    r.is_full_house,
                    r.pair_rank,
                    r.full_house_pair_rank,
                    r.flush_rank,
                    r.straight_rank,
                    r.set_rank,
                    r.flush_draw_tier,
                    r.straight_draw_ranks,
                    r.draw_outs,
                ])
                .map_err(classify("insert row"))?;
            }

            let mut stmt = tx
                .prepare("INSERT INTO buckets VALUES (?1, ?2, ?3, ?4, ?5)")
                .map_err(classify("prepare insert"))?;
            for (position, bucket) in buckets.iter().enumerate() {
                for (action, share) in &bucket.actions {
                    stmt.execute(rusqlite::params![
                        position as i64,
                        bucket.display_name,
                        bucket.matched_percentage,
                        action.to_string(),
                        share,
                    ])
                    .map_err(classify("insert bucket"))?;
                }
            }
        }

        tx.commit().map_err(classify("commit export"))?;
        Ok(())
    }

    let buckets = if kpis.is_empty() || rows.is_empty() {
        Vec::new()
    } else {
        partition(rows, kpis)?.buckets
    };

    let backoff_ms = std::env::var("RANGEKPI_SQLITE_BACKOFF_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let max_attempts = std::env::var("RANGEKPI_SQLITE_MAX_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);

    if max_attempts == 0 {
        ui::write_error(err, "RANGEKPI_SQLITE_MAX_ATTEMPTS must be >= 1 (got 0)")?;
        return Err(CliError::Config(
            "RANGEKPI_SQLITE_MAX_ATTEMPTS must be >= 1".to_string(),
        ));
    }

    for attempt in 1..=max_attempts {
        match export_sqlite_attempt(rows, &buckets, output) {
            Ok(()) => return Ok(()),
            Err(ExportAttemptError::Busy(msg)) => {
                if attempt == max_attempts {
                    ui::write_error(
                        err,
                        &format!("SQLite busy after {} attempt(s): {}", attempt, msg),
                    )?;
                    return Err(CliError::Config(format!(
                        "SQLite busy after {} attempt(s): {}",
                        attempt, msg
                    )));
                }
                std::thread::sleep(std::time::Duration::from_millis(backoff_ms));
            }
            Err(ExportAttemptError::Fatal(msg)) => {
                ui::write_error(err, &msg)?;
                return Err(CliError::Config(msg));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangekpi_engine::lookup::DirectClassifier;
    use rangekpi_engine::pipeline::{process_file, PipelineOptions};
    use rangekpi_engine::range::Scenario;
    use tempfile::tempdir;

    fn rows() -> Vec<AggregatedRow> {
        let scenario = Scenario::from_stem("Th7h2c_check").unwrap();
        process_file(
            0,
            "Th7h2c_check.txt",
            &scenario,
            "1:AhKh\n0.5:7c7d\n0.25:Ts9s\n",
            PipelineOptions::default(),
            &DirectClassifier,
        )
        .unwrap()
        .rows
    }

    #[test]
    fn sqlite_export_writes_all_rows() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("out.sqlite");
        let mut err = Vec::new();
        export_sqlite(&rows(), &KpiSet::default(), &db, &mut err).unwrap();

        let conn = rusqlite::Connection::open(&db).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rows", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);
        let best: String = conn
            .query_row("SELECT best_hand FROM rows WHERE line = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(best, "Three of a Kind");
        let buckets: i64 = conn
            .query_row("SELECT COUNT(*) FROM buckets", [], |r| r.get(0))
            .unwrap();
        assert_eq!(buckets, 0);
    }

    #[test]
    fn json_export_is_an_array_of_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        export_json(&rows(), &path).unwrap();
        let back: Vec<AggregatedRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, rows());
    }
}
