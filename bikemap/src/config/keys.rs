//! `section.key` addressing for configuration values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile};

/// A single configurable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    FeedUrl,
    FeedTimeoutSecs,
    FeedDebounceMs,
    MapStyleUrl,
    MapCenterLongitude,
    MapCenterLatitude,
    MapZoom,
    MapIconDir,
    PositionLatitude,
    PositionLongitude,
    PositionDebounceMs,
    NoticeDelayMs,
    NoticeFlagFile,
    LoggingLevel,
    LoggingDirectory,
    ReportingProduction,
    ReportingReportFile,
}

/// Error for unrecognised key names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown configuration key '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        use ConfigKey::*;
        &[
            FeedUrl,
            FeedTimeoutSecs,
            FeedDebounceMs,
            MapStyleUrl,
            MapCenterLongitude,
            MapCenterLatitude,
            MapZoom,
            MapIconDir,
            PositionLatitude,
            PositionLongitude,
            PositionDebounceMs,
            NoticeDelayMs,
            NoticeFlagFile,
            LoggingLevel,
            LoggingDirectory,
            ReportingProduction,
            ReportingReportFile,
        ]
    }

    pub fn section(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            FeedUrl | FeedTimeoutSecs | FeedDebounceMs => "feed",
            MapStyleUrl | MapCenterLongitude | MapCenterLatitude | MapZoom | MapIconDir => "map",
            PositionLatitude | PositionLongitude | PositionDebounceMs => "position",
            NoticeDelayMs | NoticeFlagFile => "notice",
            LoggingLevel | LoggingDirectory => "logging",
            ReportingProduction | ReportingReportFile => "reporting",
        }
    }

    pub fn key_name(&self) -> &'static str {
        use ConfigKey::*;
        match self {
            FeedUrl => "url",
            FeedTimeoutSecs => "timeout_secs",
            FeedDebounceMs | PositionDebounceMs => "debounce_ms",
            MapStyleUrl => "style_url",
            MapCenterLongitude => "center_longitude",
            MapCenterLatitude => "center_latitude",
            MapZoom => "zoom",
            MapIconDir => "icon_dir",
            PositionLatitude => "latitude",
            PositionLongitude => "longitude",
            NoticeDelayMs => "delay_ms",
            NoticeFlagFile => "flag_file",
            LoggingLevel => "level",
            LoggingDirectory => "directory",
            ReportingProduction => "production",
            ReportingReportFile => "report_file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        match self {
            FeedUrl => config.feed.url.clone(),
            FeedTimeoutSecs => config.feed.timeout_secs.to_string(),
            FeedDebounceMs => config.feed.debounce_ms.to_string(),
            MapStyleUrl => config.map.style_url.clone(),
            MapCenterLongitude => config.map.center_longitude.to_string(),
            MapCenterLatitude => config.map.center_latitude.to_string(),
            MapZoom => config.map.zoom.to_string(),
            MapIconDir => config.map.icon_dir.display().to_string(),
            PositionLatitude => optional(config.position.latitude),
            PositionLongitude => optional(config.position.longitude),
            PositionDebounceMs => config.position.debounce_ms.to_string(),
            NoticeDelayMs => config.notice.delay_ms.to_string(),
            NoticeFlagFile => config.notice.flag_file.display().to_string(),
            LoggingLevel => config.logging.level.clone(),
            LoggingDirectory => config.logging.directory.display().to_string(),
            ReportingProduction => config.reporting.production.to_string(),
            ReportingReportFile => config.reporting.report_file.display().to_string(),
        }
    }

    /// Parse and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();
        match self {
            FeedUrl => config.feed.url = self.non_empty(value)?,
            FeedTimeoutSecs => config.feed.timeout_secs = self.positive(value)?,
            FeedDebounceMs => config.feed.debounce_ms = self.parse(value)?,
            MapStyleUrl => config.map.style_url = self.non_empty(value)?,
            MapCenterLongitude => config.map.center_longitude = self.ranged(value, 180.0)?,
            MapCenterLatitude => config.map.center_latitude = self.ranged(value, 90.0)?,
            MapZoom => config.map.zoom = self.ranged(value, 24.0)?,
            MapIconDir => config.map.icon_dir = PathBuf::from(self.non_empty(value)?),
            PositionLatitude => config.position.latitude = self.optional_ranged(value, 90.0)?,
            PositionLongitude => config.position.longitude = self.optional_ranged(value, 180.0)?,
            PositionDebounceMs => config.position.debounce_ms = self.parse(value)?,
            NoticeDelayMs => config.notice.delay_ms = self.parse(value)?,
            NoticeFlagFile => config.notice.flag_file = PathBuf::from(self.non_empty(value)?),
            LoggingLevel => config.logging.level = self.non_empty(value)?,
            LoggingDirectory => config.logging.directory = PathBuf::from(self.non_empty(value)?),
            ReportingProduction => config.reporting.production = self.parse(value)?,
            ReportingReportFile => {
                config.reporting.report_file = PathBuf::from(self.non_empty(value)?)
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, e.to_string()))
    }

    fn non_empty(&self, value: &str) -> Result<String, ConfigError> {
        if value.is_empty() {
            return Err(self.invalid(value, "value must not be empty"));
        }
        Ok(value.to_string())
    }

    fn positive(&self, value: &str) -> Result<u64, ConfigError> {
        match self.parse::<u64>(value)? {
            0 => Err(self.invalid(value, "value must be greater than zero")),
            n => Ok(n),
        }
    }

    /// Finite value within `-limit..=limit` (zoom uses `0..=limit`).
    fn ranged(&self, value: &str, limit: f64) -> Result<f64, ConfigError> {
        let parsed: f64 = self.parse(value)?;
        let lower = if *self == ConfigKey::MapZoom { 0.0 } else { -limit };
        if !parsed.is_finite() || parsed < lower || parsed > limit {
            return Err(self.invalid(value, format!("expected {} to {}", lower, limit)));
        }
        Ok(parsed)
    }

    fn optional_ranged(&self, value: &str, limit: f64) -> Result<Option<f64>, ConfigError> {
        if value.is_empty() {
            return Ok(None);
        }
        self.ranged(value, limit).map(Some)
    }
}

impl FromStr for ConfigKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or(UnknownKey(s))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
