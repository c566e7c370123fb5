use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_FILE: &str = "config.json";

/// Default auto-sync period in seconds.
const DEFAULT_SYNC_INTERVAL: u64 = 30;

/// Application settings, stored as JSON next to the entry data. Every field has a
/// default so a missing or partial file always loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote persistence API, e.g. `https://host:5000`. Sync
    /// commands refuse to run without it.
    pub remote_url: Option<String>,
    /// Session cookie from the last successful login.
    pub session_cookie: Option<String>,
    pub sync_interval_secs: u64,
    /// Overrides where entry data is kept. Defaults to the application state dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: None,
            session_cookie: None,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn file_path(app_dir: &Path) -> PathBuf {
        app_dir.join(CONFIG_FILE)
    }

    /// Loads the config, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(app_dir: &Path) -> Config {
        let path = Self::file_path(app_dir);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to read config {path:?}: {e}");
                }
                return Config::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config {path:?} is corrupted, using defaults: {e}");
                Config::default()
            }
        }
    }

    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(self)?;
        std::fs::write(Self::file_path(app_dir), buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.sync_interval_secs, DEFAULT_SYNC_INTERVAL);
        assert_eq!(config.remote_url, None);
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = tempdir().unwrap();
        let config = Config {
            remote_url: Some("http://localhost:5000".into()),
            session_cookie: Some("session=abc".into()),
            sync_interval_secs: 60,
            data_dir: None,
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path());
        assert_eq!(loaded.remote_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(loaded.sync_interval_secs, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            Config::file_path(dir.path()),
            r#"{"remote_url": "http://tracker.local"}"#,
        )
        .unwrap();

        let config = Config::load(dir.path());
        assert_eq!(config.remote_url.as_deref(), Some("http://tracker.local"));
        assert_eq!(config.sync_interval_secs, DEFAULT_SYNC_INTERVAL);
    }
}
