//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BINGO_BACK_CONFIG_PATH";

const DEFAULT_MAX_ROOMS: usize = 1024;
const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_NAME_LENGTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    max_rooms: usize,
    join_timeout: Duration,
    max_name_length: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        max_rooms = app_config.max_rooms,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Upper bound on simultaneously active rooms.
    pub fn max_rooms(&self) -> usize {
        self.max_rooms
    }

    /// How long a connection may stay open without joining a room.
    pub fn join_timeout(&self) -> Duration {
        self.join_timeout
    }

    /// Longest accepted display name, in characters.
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Override the room cap.
    pub fn with_max_rooms(mut self, max_rooms: usize) -> Self {
        self.max_rooms = max_rooms;
        self
    }

    /// Override the join timeout.
    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    max_rooms: usize,
    join_timeout_secs: u64,
    max_name_length: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            max_rooms: DEFAULT_MAX_ROOMS,
            join_timeout_secs: DEFAULT_JOIN_TIMEOUT_SECS,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            max_rooms: value.max_rooms,
            join_timeout: Duration::from_secs(value.join_timeout_secs),
            max_name_length: value.max_name_length,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
