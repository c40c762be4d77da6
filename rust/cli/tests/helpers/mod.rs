//! Shared helpers for CLI integration tests.
//!
//! `run_cli` drives `rangekpi_cli::run` in-process. `EnvGuard` sets
//! environment variables and restores them on drop; tests using it must be
//! `#[serial]`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CliResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_cli(args: &[&str]) -> CliResult {
    let mut argv = vec!["rangekpi"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let exit_code = rangekpi_cli::run(argv, &mut out, &mut err);
    CliResult {
        exit_code,
        stdout: String::from_utf8_lossy(&out).into_owned(),
        stderr: String::from_utf8_lossy(&err).into_owned(),
    }
}

const MANAGED_VARS: &[&str] = &[
    "RANGEKPI_CONFIG",
    "RANGEKPI_INPUT_FOLDER",
    "RANGEKPI_OUTPUT_FOLDER",
    "RANGEKPI_MOVE_FILES_TO_PROCESSED_FOLDER",
    "RANGEKPI_ADD_TIMESTAMP_TO_PROCESSED_FILES",
    "RANGEKPI_SAVE_CACHE",
    "RANGEKPI_SAVE_CACHE_COPY_AS_CSV",
    "RANGEKPI_LOG_TO_FILE",
    "RANGEKPI_PARALLEL",
    "RANGEKPI_SQLITE_MAX_ATTEMPTS",
    "RANGEKPI_SQLITE_BACKOFF_MS",
];

pub struct EnvGuard {
    restores: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Clears every rangekpi variable, then applies `pairs`.
    pub fn apply(pairs: &[(&str, &str)]) -> Self {
        let mut restores = Vec::new();
        for key in MANAGED_VARS {
            restores.push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
        for (key, value) in pairs {
            if !MANAGED_VARS.contains(key) {
                restores.push((key.to_string(), std::env::var(key).ok()));
            }
            unsafe {
                std::env::set_var(key, value);
            }
        }
        EnvGuard { restores }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in self.restores.iter().rev() {
            unsafe {
                match previous {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

pub const KPI_TOML: &str = r#"
[[kpis]]
display_name = "Sets"
requirements = [{ column = "is_trips", operator = "eq", value = true }]

[[kpis]]
display_name = "Flush draws"
requirements = [{ column = "flush_draw_tier", operator = "lte", value = 4 }]

[[kpis]]
display_name = "Pairs"
requirements = [
    { column = "is_pair", operator = "eq", value = true },
    { column = "best_hand", operator = "ni", value = "Two" },
]
"#;

/// A workspace with an input folder, an output folder and a config file.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new(extra_config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("input")).unwrap();
        let config = format!(
            "input_folder = {:?}\noutput_folder = {:?}\n{}\n{}",
            dir.path().join("input").display().to_string(),
            dir.path().join("output").display().to_string(),
            extra_config,
            KPI_TOML
        );
        std::fs::write(dir.path().join("rangekpi.toml"), config).unwrap();
        Self { dir }
    }

    pub fn config_path(&self) -> String {
        self.dir.path().join("rangekpi.toml").display().to_string()
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn add_scenario(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Files in `dir` whose name starts with `prefix`.
    pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .filter(|n| n.starts_with(prefix))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
