// Configuration loading and parsing (stats.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the single config file, both in `defaults/` and `config/`.
pub const CONFIG_FILE: &str = "stats.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// stats.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stats: StatsSection,
    /// Sheet layout per league, keyed by league name.
    pub leagues: BTreeMap<String, LeagueLayout>,
    pub career: CareerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsSection {
    /// Current season. Usually supplied on the command line instead.
    #[serde(default)]
    pub season: Option<u32>,
    /// Leagues to aggregate, in output order.
    pub leagues: Vec<String>,
    pub sheets_dir: String,
    pub output_dir: String,
}

/// Column layout quirks of one league's spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LeagueLayout {
    /// Extra leading columns before wins/losses on the standings tab.
    #[serde(default)]
    pub standings_offset: usize,
    /// Whether the standings tab carries starting/current ego columns.
    #[serde(default)]
    pub ego_columns: bool,
    /// Whether regular-season box scores carry the two error columns.
    #[serde(default = "default_true")]
    pub box_score_errors: bool,
}

impl Default for LeagueLayout {
    fn default() -> Self {
        Self {
            standings_offset: 0,
            ego_columns: false,
            box_score_errors: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerConfig {
    /// Spreadsheet (book) holding roster and head-to-head tabs.
    pub book: String,
    /// Also aggregate the `<league> Playoffs Head to Head` tabs.
    #[serde(default)]
    pub playoffs_head_to_head: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn layout(&self, league: &str) -> Option<&LeagueLayout> {
        self.leagues.get(league)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/stats.toml` relative to `base_dir`.
///
/// This does not copy defaults; call `ensure_config_files` first for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);

        // create_new never truncates a config the user already has
        let mut dest = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(dest) => dest,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        };
        let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        dest.write_all(&content).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to write {}: {e}", target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.stats.leagues.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "stats.leagues".into(),
            message: "must list at least one league".into(),
        });
    }

    for league in &config.stats.leagues {
        if !config.leagues.contains_key(league) {
            return Err(ConfigError::ValidationError {
                field: format!("leagues.{league}"),
                message: "league is listed in stats.leagues but has no layout table".into(),
            });
        }
    }

    if config.stats.season == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "stats.season".into(),
            message: "must be greater than 0".into(),
        });
    }

    let dirs: &[(&str, &str)] = &[
        ("stats.sheets_dir", &config.stats.sheets_dir),
        ("stats.output_dir", &config.stats.output_dir),
        ("career.book", &config.career.book),
    ];
    for (name, val) in dirs {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be blank".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
