//! Application configuration for BikeMapApp.
//!
//! `AppConfig` combines everything needed to bootstrap a session: the
//! station endpoint, map and coordinator settings, the position source,
//! notice and error reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::log::LoggingConfig;
use crate::map::{CoordinatorConfig, MapOptions};
use crate::position::Coordinate;
use crate::station::{DEFAULT_STATIONS_URL, DEFAULT_TIMEOUT_SECS};

/// Application configuration combining all component configs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Station endpoint.
    pub feed_url: String,

    /// HTTP timeout in seconds.
    pub http_timeout_secs: u64,

    /// Map options and debounce periods.
    pub coordinator: CoordinatorConfig,

    /// Directory holding the marker icons.
    pub icon_dir: PathBuf,

    /// Fixed position used as the geolocation source, if any.
    pub position: Option<Coordinate>,

    /// Delay before the info notice appears.
    pub notice_delay: Duration,

    /// INI file holding the notice flag.
    pub flag_file: Option<PathBuf>,

    /// Error reporting.
    pub reporting: ReportingAppConfig,

    /// Logging.
    pub logging: LoggingConfig,
}

/// Error reporting configuration.
#[derive(Clone, Debug, Default)]
pub struct ReportingAppConfig {
    /// Forward reported errors to the report file.
    pub production: bool,

    /// JSON-lines report file.
    pub report_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_STATIONS_URL.to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            coordinator: CoordinatorConfig::default(),
            icon_dir: PathBuf::from("icons"),
            position: None,
            notice_delay: crate::notice::NOTICE_DELAY,
            flag_file: None,
            reporting: ReportingAppConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create application config from the configuration file.
    ///
    /// A position is only configured when both latitude and longitude are
    /// set; otherwise the session runs without geolocation.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let position = match (config.position.latitude, config.position.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };

        Self {
            feed_url: config.feed.url.clone(),
            http_timeout_secs: config.feed.timeout_secs,
            coordinator: CoordinatorConfig {
                map: MapOptions {
                    style_url: config.map.style_url.clone(),
                    center: [config.map.center_longitude, config.map.center_latitude],
                    zoom: config.map.zoom,
                },
                refresh_quiet: Duration::from_millis(config.feed.debounce_ms),
                position_quiet: Duration::from_millis(config.position.debounce_ms),
                follow_zoom: config.map.zoom,
            },
            icon_dir: config.map.icon_dir.clone(),
            position,
            notice_delay: Duration::from_millis(config.notice.delay_ms),
            flag_file: Some(config.notice.flag_file.clone()),
            reporting: ReportingAppConfig {
                production: config.reporting.production,
                report_file: Some(config.reporting.report_file.clone()),
            },
            logging: LoggingConfig {
                level: config.logging.level.clone(),
                directory: Some(config.logging.directory.clone()),
            },
        }
    }

    /// Set the station endpoint.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    /// Set the fixed position.
    pub fn with_position(mut self, position: Option<Coordinate>) -> Self {
        self.position = position;
        self
    }

    /// Set the icon directory.
    pub fn with_icon_dir(mut self, icon_dir: PathBuf) -> Self {
        self.icon_dir = icon_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file_defaults() {
        let file = ConfigFile::with_base_dir(&PathBuf::from("/base"));
        let config = AppConfig::from_config_file(&file);

        assert_eq!(config.feed_url, DEFAULT_STATIONS_URL);
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.coordinator.refresh_quiet, Duration::from_millis(1000));
        assert_eq!(config.coordinator.map.center, [24.9414377, 60.1718441]);
        assert_eq!(config.icon_dir, PathBuf::from("/base/icons"));
        assert_eq!(config.notice_delay, Duration::from_millis(2400));
        assert_eq!(config.position, None);
    }

    #[test]
    fn test_position_requires_both_axes() {
        let mut file = ConfigFile::with_base_dir(&PathBuf::from("/base"));
        file.position.latitude = Some(60.17);
        assert_eq!(AppConfig::from_config_file(&file).position, None);

        file.position.longitude = Some(24.94);
        assert_eq!(
            AppConfig::from_config_file(&file).position,
            Some(Coordinate::new(60.17, 24.94))
        );
    }
}
