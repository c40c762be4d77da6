//! Parsed output, its CSV copy and the lookup-table cache.

use std::path::{Path, PathBuf};

use rangekpi_engine::aggregate::AggregatedRow;
use rangekpi_engine::cards::cards_to_string;
use rangekpi_engine::hand::{MadeHand, RankSet};
use rangekpi_engine::lookup::LookupTable;
use rangekpi_engine::range::{Action, Board};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::RunContext;
use crate::error::CliError;
use crate::io_utils::{ensure_parent_dir, read_text_auto, write_text_auto};

pub const PARSED_PREFIX: &str = "parsed_";
pub const PARSED_SUFFIX: &str = ".json.zst";
pub const CACHE_FILE: &str = "lookup.json.zst";

fn title_case(action: Action) -> String {
    let s = action.to_string();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => s,
    }
}

/// `parsed_<label>_<board>_<Action-Action>` without an extension.
pub fn parsed_base_name(ctx: &RunContext, board: &Board, actions: &[Action]) -> String {
    let actions: Vec<String> = actions.iter().copied().map(title_case).collect();
    format!(
        "{}{}_{}_{}",
        PARSED_PREFIX,
        ctx.timestamp_label,
        cards_to_string(board.cards()),
        actions.join("-")
    )
}

pub fn save_parsed(
    dir: &Path,
    base_name: &str,
    rows: &[AggregatedRow],
) -> Result<PathBuf, CliError> {
    let path = dir.join(format!("{}{}", base_name, PARSED_SUFFIX));
    let json = serde_json::to_string(rows).map_err(std::io::Error::other)?;
    write_text_auto(&path, &json).map_err(CliError::Engine)?;
    info!(path = %path.display(), rows = rows.len(), "Saved parsed rows");
    Ok(path)
}

/// Loads rows from a parsed file (`.json` or `.json.zst`).
pub fn load_parsed(path: &Path) -> Result<Vec<AggregatedRow>, CliError> {
    let content = read_text_auto(path)
        .map_err(|e| CliError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::InvalidInput(format!("Invalid parsed file {}: {}", path.display(), e))
    })
}

/// Newest parsed file in `dir`. Names embed the run timestamp, so the last
/// name in lexical order is the newest.
pub fn newest_parsed(dir: &Path) -> Result<Option<PathBuf>, CliError> {
    if !dir.exists() {
        return Ok(None);
    }
    let mut newest: Option<(String, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(PARSED_PREFIX) || !name.ends_with(PARSED_SUFFIX) {
            continue;
        }
        if newest.as_ref().is_none_or(|(n, _)| name > *n) {
            newest = Some((name, entry.path()));
        }
    }
    Ok(newest.map(|(_, p)| p))
}

/// Flattened row layout for CSV: lists are joined with ','.
#[derive(Debug, Serialize)]
pub struct CsvRow {
    pub file: usize,
    pub line: usize,
    pub action: String,
    pub weight: f64,
    pub hole_cards: String,
    pub community_cards: String,
    pub best_hand: String,
    pub best_hand_rank: u8,
    pub is_flush: bool,
    pub is_straight: bool,
    pub is_straight_flush: bool,
    pub is_pair: bool,
    pub is_two_pair: bool,
    pub is_trips: bool,
    pub is_quads: bool,
    pub is_full_house: bool,
    pub pair_rank: String,
    pub full_house_pair_rank: String,
    pub flush_rank: String,
    pub straight_rank: String,
    pub set_rank: String,
    pub flush_draw_tier: u8,
    pub straight_draw_ranks: String,
    pub draw_outs: u8,
}

fn join_ranks(set: &RankSet) -> String {
    set.descending()
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_cards(cards: &[rangekpi_engine::cards::Card]) -> String {
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",")
}

impl From<&AggregatedRow> for CsvRow {
    fn from(r: &AggregatedRow) -> Self {
        let m = &r.features.made;
        let d = &r.features.draws;
        Self {
            file: r.row.file,
            line: r.row.line,
            action: r.action.to_string(),
            weight: r.weight,
            hole_cards: join_cards(&r.hole_cards),
            community_cards: join_cards(&r.community_cards),
            best_hand: r.best_hand.clone(),
            best_hand_rank: m.best_hand_rank.ordinal(),
            is_flush: m.is_flush,
            is_straight: m.is_straight,
            is_straight_flush: m.is_straight_flush,
            is_pair: m.is_pair,
            is_two_pair: m.is_two_pair,
            is_trips: m.is_trips,
            is_quads: m.is_quads,
            is_full_house: m.is_full_house,
            pair_rank: join_ranks(&m.pair_rank),
            full_house_pair_rank: join_ranks(&m.full_house_pair_rank),
            flush_rank: join_ranks(&m.flush_rank),
            straight_rank: join_ranks(&m.straight_rank),
            set_rank: join_ranks(&m.set_rank),
            flush_draw_tier: d.flush_draw_tier.value(),
            straight_draw_ranks: join_ranks(&d.straight_draw_ranks),
            draw_outs: d.draw_outs,
        }
    }
}

pub fn write_rows_csv(rows: &[AggregatedRow], path: &Path) -> Result<(), CliError> {
    ensure_parent_dir(path).map_err(CliError::Engine)?;
    let mut w = csv::Writer::from_path(path).map_err(|e| {
        CliError::Io(std::io::Error::other(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )))
    })?;
    for row in rows {
        w.serialize(CsvRow::from(row))
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    }
    w.flush()?;
    Ok(())
}

/// Loads the lookup-table cache, or an empty table when there is none.
pub fn load_cache(dir: &Path) -> Result<LookupTable, CliError> {
    let path = dir.join(CACHE_FILE);
    if !path.exists() {
        return Ok(LookupTable::new());
    }
    let content = read_text_auto(&path).map_err(CliError::Engine)?;
    let entries: BTreeMap<String, MadeHand> = serde_json::from_str(&content).map_err(|e| {
        CliError::InvalidInput(format!("Invalid cache file {}: {}", path.display(), e))
    })?;
    info!(entries = entries.len(), "Loaded lookup cache");
    Ok(LookupTable::from_entries(entries))
}

pub fn save_cache(dir: &Path, table: &LookupTable) -> Result<PathBuf, CliError> {
    let path = dir.join(CACHE_FILE);
    let json = serde_json::to_string(&table.snapshot()).map_err(std::io::Error::other)?;
    write_text_auto(&path, &json).map_err(CliError::Engine)?;
    info!(entries = table.len(), "Saved lookup cache");
    Ok(path)
}
