use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::SpindeckError;

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "spindeck";

pub(crate) const DEFAULT_SESSION_SOURCE: &str = "data/listening_sessions.json";
const DEFAULT_LIST_MAX_HEIGHT: f32 = 320.;
const DEFAULT_FETCH_TIMEOUT_S: u64 = 30;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// File path or http(s) URL of the session document
    pub session_source: String,
    /// Height of the session list before it starts scrolling
    pub list_max_height: f32,
    /// `None` waits for the session document forever
    pub fetch_timeout_s: Option<u64>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_source: DEFAULT_SESSION_SOURCE.to_string(),
            list_max_height: DEFAULT_LIST_MAX_HEIGHT,
            fetch_timeout_s: Some(DEFAULT_FETCH_TIMEOUT_S),
            window_width: 1000.,
            window_height: 640.,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, SpindeckError> {
        Ok(dirs::config_dir()
            .ok_or(SpindeckError::NoConfigDir)?
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Config from the platform config dir. Problems reading it are logged
    /// and treated as if there was no config file.
    pub fn from_local_file() -> Option<Self> {
        let config_path = Self::config_path().ok()?;
        if !config_path.exists() {
            return None;
        }
        match Self::from_file(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file {:?}: {}", config_path, e);
                None
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SpindeckError> {
        let file = std::fs::File::open(path).map_err(|e| SpindeckError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| SpindeckError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), SpindeckError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), SpindeckError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SpindeckError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| SpindeckError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| SpindeckError::ConfigSerializeError { source: e })
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_s.map(Duration::from_secs)
    }
}
