use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::task_ops::DEFAULT_MAX_TASKS;

pub const STORE_FILENAME: &str = ".nowfile";
pub const CONFIG_FILENAME: &str = ".now.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unable to resolve home directory; set HOME")]
    NoHome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NowConfig {
    /// Overrides the task file location. A leading `~/` expands to the home directory.
    pub store_path: Option<String>,
    /// Upper bound on stored tasks; `add` refuses to grow past it.
    pub max_tasks: Option<usize>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub max_tasks: usize,
}

/// `HOME` is the only variable consulted.
pub fn resolve_user_home_dir() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let trimmed = home.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILENAME)
}

pub fn default_store_path(home: &Path) -> PathBuf {
    home.join(STORE_FILENAME)
}

/// `Ok(None)` when no config file exists.
pub fn load_config(home: &Path) -> Result<Option<NowConfig>, ConfigError> {
    let path = config_path(home);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    let config = toml::from_str::<NowConfig>(&text)?;
    Ok(Some(config))
}

fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

impl Settings {
    /// Precedence: explicit store path, then the config file, then `~/.nowfile`.
    /// A broken config file is reported and ignored.
    pub fn resolve_in(home: &Path, store_override: Option<&Path>) -> Self {
        let config = match load_config(home) {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                warn!(path = %config_path(home).display(), error = %err, "ignoring config file");
                NowConfig::default()
            }
        };

        let store_path = match store_override {
            Some(path) => path.to_path_buf(),
            None => config
                .store_path
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .map(|raw| expand_home(raw, home))
                .unwrap_or_else(|| default_store_path(home)),
        };
        let max_tasks = config.max_tasks.unwrap_or(DEFAULT_MAX_TASKS);

        debug!(store = %store_path.display(), max_tasks, "resolved settings");
        Settings {
            store_path,
            max_tasks,
        }
    }

    pub fn resolve(store_override: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_user_home_dir() {
            Some(home) => Ok(Self::resolve_in(&home, store_override)),
            None => match store_override {
                Some(path) => Ok(Settings {
                    store_path: path.to_path_buf(),
                    max_tasks: DEFAULT_MAX_TASKS,
                }),
                None => Err(ConfigError::NoHome),
            },
        }
    }
}
