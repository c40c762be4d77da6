//! Per-file classification pipeline: parse, enumerate, classify, aggregate.
//!
//! Rows are independent, so classification may run on the rayon pool. Output
//! order always follows the input line order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate_row, visible_cards, AggregatedRow};
use crate::draws::classify_draws;
use crate::enumerate::enumerate_hands;
use crate::errors::{ParseError, PipelineError};
use crate::hand::HandFeatures;
use crate::lookup::MadeHandSource;
use crate::range::{parse_range_lines, Board, RangeEntry, RowId, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Classify rows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// A source line that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row: RowId,
    pub error: String,
}

impl RowFailure {
    fn new(row: RowId, error: &ParseError) -> Self {
        Self {
            row,
            error: error.to_string(),
        }
    }
}

/// Result of classifying one scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub source_name: String,
    pub rows: Vec<AggregatedRow>,
    pub failures: Vec<RowFailure>,
}

/// Classifies one range entry against the scenario board.
pub fn classify_entry(
    entry: &RangeEntry,
    board: &Board,
    source: &dyn MadeHandSource,
) -> Result<AggregatedRow, ParseError> {
    if let Some(card) = entry.hole_cards.iter().find(|c| board.cards().contains(c)) {
        return Err(ParseError::MalformedRangeLine {
            line: entry.row.line,
            reason: format!("hole card {} is also on the board", card),
        });
    }

    let visible = visible_cards(entry, board);
    let features: Vec<HandFeatures> = enumerate_hands(entry, board)
        .iter()
        .map(|candidate| {
            let made = source.made_hand(&candidate.cards());
            let draws = classify_draws(candidate.hole, candidate.board, &made, &visible);
            HandFeatures { made, draws }
        })
        .collect();

    aggregate_row(entry, board, &features).ok_or_else(|| ParseError::MalformedRangeLine {
        line: entry.row.line,
        reason: "no candidate hands".to_string(),
    })
}

/// Classifies every entry, keeping input order in both outputs.
pub fn classify_entries(
    entries: &[RangeEntry],
    board: &Board,
    source: &dyn MadeHandSource,
    opts: PipelineOptions,
) -> (Vec<AggregatedRow>, Vec<RowFailure>) {
    let results: Vec<Result<AggregatedRow, RowFailure>> = if opts.parallel {
        entries
            .par_iter()
            .map(|e| classify_entry(e, board, source).map_err(|err| RowFailure::new(e.row, &err)))
            .collect()
    } else {
        entries
            .iter()
            .map(|e| classify_entry(e, board, source).map_err(|err| RowFailure::new(e.row, &err)))
            .collect()
    };

    let mut rows = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for r in results {
        match r {
            Ok(row) => rows.push(row),
            Err(f) => failures.push(f),
        }
    }
    (rows, failures)
}

/// Runs the whole pipeline for one scenario file's content.
///
/// Malformed lines are logged and reported in [`FileReport::failures`]; they
/// never abort the file. A file that yields no rows at all is an error.
pub fn process_file(
    file_index: usize,
    source_name: &str,
    scenario: &Scenario,
    content: &str,
    opts: PipelineOptions,
    source: &dyn MadeHandSource,
) -> Result<FileReport, PipelineError> {
    info!(file = source_name, action = %scenario.action, "Processing scenario file");
    let (entries, parse_failures) = parse_range_lines(file_index, content, scenario.action);
    let mut failures: Vec<RowFailure> = parse_failures
        .iter()
        .map(|(row, err)| RowFailure::new(*row, err))
        .collect();
    debug!(entries = entries.len(), "Parsed range entries");

    let (rows, classify_failures) = classify_entries(&entries, &scenario.board, source, opts);
    failures.extend(classify_failures);
    failures.sort_by_key(|f| f.row);

    for f in &failures {
        warn!(file = source_name, row = %f.row, error = %f.error, "Skipping range line");
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyInputPopulation {
            source_name: source_name.to_string(),
        });
    }

    info!(file = source_name, rows = rows.len(), skipped = failures.len(), "Classified scenario file");
    Ok(FileReport {
        source_name: source_name.to_string(),
        rows,
        failures,
    })
}
