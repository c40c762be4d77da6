//! Run configuration: defaults, a TOML file and environment overrides.
//!
//! The file is taken from `RANGEKPI_CONFIG`, or `rangekpi.toml` in the working
//! directory when that exists. Environment variables win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use rangekpi_engine::kpi::{Kpi, KpiSet};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "RANGEKPI_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "rangekpi.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub input_folder: String,
    pub output_folder: String,
    pub move_files_to_processed_folder: bool,
    pub add_timestamp_to_processed_files: bool,
    pub save_cache: bool,
    pub save_cache_copy_as_csv: bool,
    pub log_to_file: bool,
    pub parallel: bool,
    pub kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub input_folder: ValueSource,
    pub output_folder: ValueSource,
    pub move_files_to_processed_folder: ValueSource,
    pub add_timestamp_to_processed_files: ValueSource,
    pub save_cache: ValueSource,
    pub save_cache_copy_as_csv: ValueSource,
    pub log_to_file: ValueSource,
    pub parallel: ValueSource,
    pub kpis: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            input_folder: ValueSource::Default,
            output_folder: ValueSource::Default,
            move_files_to_processed_folder: ValueSource::Default,
            add_timestamp_to_processed_files: ValueSource::Default,
            save_cache: ValueSource::Default,
            save_cache_copy_as_csv: ValueSource::Default,
            log_to_file: ValueSource::Default,
            parallel: ValueSource::Default,
            kpis: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
    /// KPIs after type validation, in declaration order.
    pub kpi_set: KpiSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input".into(),
            output_folder: "output".into(),
            move_files_to_processed_folder: false,
            add_timestamp_to_processed_files: false,
            save_cache: false,
            save_cache_copy_as_csv: false,
            log_to_file: false,
            parallel: true,
            kpis: Vec::new(),
        }
    }
}

impl Config {
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(&self.input_folder)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_folder)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Timestamps fixed once per run and passed to everything that names files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// `%Y%m%d%H%M%S`, prefixed to processed input files
    pub timestamp: String,
    /// `%Y-%m-%d_%H-%M-%S`, embedded in parsed output names
    pub timestamp_label: String,
}

impl RunContext {
    pub fn now() -> Self {
        let now = chrono::Local::now();
        Self {
            timestamp: now.format("%Y%m%d%H%M%S").to_string(),
            timestamp_label: now.format("%Y-%m-%d_%H-%M-%S").to_string(),
        }
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.is_empty()
    {
        return Some(PathBuf::from(path));
    }
    let local = Path::new(DEFAULT_CONFIG_FILE);
    local.exists().then(|| local.to_path_buf())
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = config_file() {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.input_folder {
            cfg.input_folder = v;
            sources.input_folder = ValueSource::File;
        }
        if let Some(v) = f.output_folder {
            cfg.output_folder = v;
            sources.output_folder = ValueSource::File;
        }
        if let Some(v) = f.move_files_to_processed_folder {
            cfg.move_files_to_processed_folder = v;
            sources.move_files_to_processed_folder = ValueSource::File;
        }
        if let Some(v) = f.add_timestamp_to_processed_files {
            cfg.add_timestamp_to_processed_files = v;
            sources.add_timestamp_to_processed_files = ValueSource::File;
        }
        if let Some(v) = f.save_cache {
            cfg.save_cache = v;
            sources.save_cache = ValueSource::File;
        }
        if let Some(v) = f.save_cache_copy_as_csv {
            cfg.save_cache_copy_as_csv = v;
            sources.save_cache_copy_as_csv = ValueSource::File;
        }
        if let Some(v) = f.log_to_file {
            cfg.log_to_file = v;
            sources.log_to_file = ValueSource::File;
        }
        if let Some(v) = f.parallel {
            cfg.parallel = v;
            sources.parallel = ValueSource::File;
        }
        if let Some(v) = f.kpis {
            cfg.kpis = v;
            sources.kpis = ValueSource::File;
        }
    }

    if let Some(v) = env_string("RANGEKPI_INPUT_FOLDER") {
        cfg.input_folder = v;
        sources.input_folder = ValueSource::Env;
    }
    if let Some(v) = env_string("RANGEKPI_OUTPUT_FOLDER") {
        cfg.output_folder = v;
        sources.output_folder = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_MOVE_FILES_TO_PROCESSED_FOLDER")? {
        cfg.move_files_to_processed_folder = v;
        sources.move_files_to_processed_folder = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_ADD_TIMESTAMP_TO_PROCESSED_FILES")? {
        cfg.add_timestamp_to_processed_files = v;
        sources.add_timestamp_to_processed_files = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_SAVE_CACHE")? {
        cfg.save_cache = v;
        sources.save_cache = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_SAVE_CACHE_COPY_AS_CSV")? {
        cfg.save_cache_copy_as_csv = v;
        sources.save_cache_copy_as_csv = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_LOG_TO_FILE")? {
        cfg.log_to_file = v;
        sources.log_to_file = ValueSource::Env;
    }
    if let Some(v) = env_bool("RANGEKPI_PARALLEL")? {
        cfg.parallel = v;
        sources.parallel = ValueSource::Env;
    }

    let kpi_set = validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
        kpi_set,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    input_folder: Option<String>,
    #[serde(default)]
    output_folder: Option<String>,
    #[serde(default)]
    move_files_to_processed_folder: Option<bool>,
    #[serde(default)]
    add_timestamp_to_processed_files: Option<bool>,
    #[serde(default)]
    save_cache: Option<bool>,
    #[serde(default)]
    save_cache_copy_as_csv: Option<bool>,
    #[serde(default)]
    log_to_file: Option<bool>,
    #[serde(default)]
    parallel: Option<bool>,
    #[serde(default)]
    kpis: Option<Vec<Kpi>>,
}

fn validate(cfg: &Config) -> Result<KpiSet, ConfigError> {
    if cfg.input_folder.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: input_folder must not be empty".into(),
        ));
    }
    if cfg.output_folder.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: output_folder must not be empty".into(),
        ));
    }
    KpiSet::new(cfg.kpis.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env_string(key) {
        Some(v) => parse_bool(&v)
            .map(Some)
            .ok_or_else(|| ConfigError::Invalid(format!("Invalid {}: {}", key, v))),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
