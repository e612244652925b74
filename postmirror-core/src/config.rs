//! YAML config for a mirror.
//!
//! # Storage layout
//!
//! ```text
//! ~/.postmirror/
//!   config.yaml
//! ```
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! A config file at an arbitrary location goes through [`load_file`] /
//! [`save_file`].

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

pub const DEFAULT_STORE_DIR: &str = "src/posts";
pub const DEFAULT_ARCHIVE_DIR: &str = "archived";

/// Mirror settings. Relative directories resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `http(s)://` endpoint or path to a JSON file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Whole-request timeout for HTTP sources. `None` leaves the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARCHIVE_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            store_dir: default_store_dir(),
            archive_dir: default_archive_dir(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Reject layouts the engine cannot reconcile safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_dir is empty".into()));
        }
        if self.archive_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("archive_dir is empty".into()));
        }
        if lexical(&self.store_dir) == lexical(&self.archive_dir) {
            return Err(ConfigError::Invalid(format!(
                "store_dir and archive_dir are both '{}'",
                self.store_dir.display()
            )));
        }
        if let Some(source) = &self.source {
            if source.trim().is_empty() {
                return Err(ConfigError::Invalid("source is blank".into()));
            }
        }
        Ok(())
    }
}

/// `path` without `.` components; `./src/posts` and `src/posts/` compare equal.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.postmirror/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".postmirror").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load a config file. Returns `NotFound` if absent, `Parse` if malformed.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a config file, falling back to [`Config::default`] when it is absent.
pub fn load_file_or_default(path: &Path) -> Result<Config, ConfigError> {
    match load_file(path) {
        Err(ConfigError::NotFound { .. }) => Ok(Config::default()),
        other => other,
    }
}

/// Load `<home>/.postmirror/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_file(&config_path_at(home))
}

/// `load_at`, but a missing file yields defaults.
pub fn load_or_default_at(home: &Path) -> Result<Config, ConfigError> {
    load_file_or_default(&config_path_at(home))
}

/// `load_or_default_at` convenience wrapper.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_default_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Atomically write `config` to `path` via `<path>.tmp` + rename.
pub fn save_file(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// Save to `<home>/.postmirror/config.yaml`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(home);
    save_file(&path, config)?;
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
