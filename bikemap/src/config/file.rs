//! Typed INI configuration file.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::map::{DEFAULT_CENTER, DEFAULT_STYLE_URL, DEFAULT_ZOOM};
use crate::notice::NOTICE_DELAY;
use crate::signal::DEFAULT_QUIET_PERIOD;
use crate::station::{DEFAULT_STATIONS_URL, DEFAULT_TIMEOUT_SECS};

/// Name of the configuration directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".bikemap";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Root configuration directory (`~/.bikemap`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of the configuration file (`~/.bikemap/config.ini`).
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub url: String,
    pub timeout_secs: u64,
    /// Quiet period applied to refresh triggers, in milliseconds.
    pub debounce_ms: u64,
}

/// `[map]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub style_url: String,
    pub center_longitude: f64,
    pub center_latitude: f64,
    pub zoom: f64,
    /// Directory holding `red.png`, `yellow.png` and `white.png`.
    pub icon_dir: PathBuf,
}

/// `[position]` section.
///
/// A fixed coordinate stands in for device geolocation. Without one the
/// session runs with no geolocation capability.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSettings {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub debounce_ms: u64,
}

/// `[notice]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeSettings {
    pub delay_ms: u64,
    /// INI file holding dismissal flags.
    pub flag_file: PathBuf,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub directory: PathBuf,
}

/// `[reporting]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingSettings {
    /// Forward reported errors to the report file.
    pub production: bool,
    pub report_file: PathBuf,
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub feed: FeedSettings,
    pub map: MapSettings,
    pub position: PositionSettings,
    pub notice: NoticeSettings,
    pub logging: LoggingSettings,
    pub reporting: ReportingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::with_base_dir(&config_dir())
    }
}

impl ConfigFile {
    /// Defaults with every path rooted at `base`.
    pub fn with_base_dir(base: &Path) -> Self {
        Self {
            feed: FeedSettings {
                url: DEFAULT_STATIONS_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            },
            map: MapSettings {
                style_url: DEFAULT_STYLE_URL.to_string(),
                center_longitude: DEFAULT_CENTER[0],
                center_latitude: DEFAULT_CENTER[1],
                zoom: DEFAULT_ZOOM,
                icon_dir: base.join("icons"),
            },
            position: PositionSettings {
                latitude: None,
                longitude: None,
                debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            },
            notice: NoticeSettings {
                delay_ms: NOTICE_DELAY.as_millis() as u64,
                flag_file: base.join("flags.ini"),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                directory: base.join("logs"),
            },
            reporting: ReportingSettings {
                production: false,
                report_file: base.join("reports").join("errors.jsonl"),
            },
        }
    }

    /// Load from the default path; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults for missing keys.
    ///
    /// Unparseable values are rejected rather than silently replaced.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(config);
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        for key in super::ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write every key to `path`, creating parent directories.
    ///
    /// Unset optional keys are written empty so the file documents them.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_error)?;

        debug!(path = %path.display(), "Config file saved");
        Ok(())
    }
}
