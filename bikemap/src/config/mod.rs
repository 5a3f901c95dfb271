//! Configuration file support.
//!
//! Settings live in `~/.bikemap/config.ini`:
//!
//! ```ini
//! [feed]
//! url = https://api.digitransit.fi/routing/v1/routers/hsl/bike_rental
//! timeout_secs = 30
//! debounce_ms = 1000
//!
//! [map]
//! style_url = mapbox://styles/mapbox/outdoors-v10
//! zoom = 14.8
//! icon_dir = /home/user/.bikemap/icons
//!
//! [position]
//! latitude = 60.1718
//! longitude = 24.9414
//! ```
//!
//! Every key can be read and written by name through [`ConfigKey`].

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, ConfigError, ConfigFile, FeedSettings, LoggingSettings,
    MapSettings, NoticeSettings, PositionSettings, ReportingSettings, CONFIG_DIR_NAME,
};
pub use keys::{ConfigKey, UnknownKey};
