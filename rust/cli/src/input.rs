//! Scenario file discovery and post-processing moves.
//!
//! Scenario files are named `<board>_<action>.txt` (optionally `.txt.zst`),
//! matched case-insensitively. Anything else in the input folder is ignored.

use std::path::{Path, PathBuf};

use rangekpi_engine::range::Scenario;
use tracing::debug;

use crate::config::RunContext;
use crate::error::CliError;

/// A discovered scenario file.
#[derive(Debug, Clone)]
pub struct ScenarioFile {
    pub path: PathBuf,
    pub file_name: String,
    pub scenario: Scenario,
}

const SUFFIXES: &[&str] = &[".txt.zst", ".txt"];

/// File stem of a scenario file name, or `None` when the name does not have
/// a scenario suffix.
pub fn scenario_stem(file_name: &str) -> Option<&str> {
    let lower = file_name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|s| lower.ends_with(*s))
        .map(|s| &file_name[..file_name.len() - s.len()])
}

/// Lists scenario files in `dir`, sorted by name.
pub fn discover_scenarios(dir: &Path) -> Result<Vec<ScenarioFile>, CliError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read input folder {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(stem) = scenario_stem(&file_name) else {
            continue;
        };
        match Scenario::from_stem(stem) {
            Ok(scenario) => files.push(ScenarioFile {
                path: entry.path(),
                file_name,
                scenario,
            }),
            Err(e) => debug!(file = %file_name, error = %e, "Ignoring file"),
        }
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Moves a processed file into `<input>/processed/`, optionally prefixed
/// with the run timestamp.
pub fn mark_as_processed(
    file: &ScenarioFile,
    ctx: &RunContext,
    add_timestamp: bool,
) -> Result<PathBuf, CliError> {
    let parent = file.path.parent().unwrap_or_else(|| Path::new("."));
    let processed = parent.join("processed");
    std::fs::create_dir_all(&processed)?;
    let name = if add_timestamp {
        format!("{}_{}", ctx.timestamp, file.file_name)
    } else {
        file.file_name.clone()
    };
    let destination = processed.join(name);
    std::fs::rename(&file.path, &destination)?;
    Ok(destination)
}
