//! Common types and utilities shared across CLI commands.

use bikemap::config::ConfigFile;
use bikemap::position::Coordinate;

use crate::error::CliError;

/// Resolve the fixed position from CLI args and config.
///
/// CLI values take precedence. Latitude and longitude must be given
/// together; a half-specified position is rejected rather than ignored.
pub fn resolve_position(
    cli_latitude: Option<f64>,
    cli_longitude: Option<f64>,
    config: &ConfigFile,
) -> Result<Option<Coordinate>, CliError> {
    let (latitude, longitude) = match (cli_latitude, cli_longitude) {
        (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
        (None, None) => (config.position.latitude, config.position.longitude),
        _ => {
            return Err(CliError::Config(
                "--latitude and --longitude must be given together".to_string(),
            ))
        }
    };

    let position = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        (None, None) => return Ok(None),
        _ => {
            return Err(CliError::Config(
                "position.latitude and position.longitude must be set together in config.ini"
                    .to_string(),
            ))
        }
    };

    if !position.is_valid() {
        return Err(CliError::Config(format!(
            "Position {} is out of range",
            position
        )));
    }
    Ok(Some(position))
}

/// Resolve the station endpoint from CLI args and config.
pub fn resolve_feed_url(cli_url: Option<String>, config: &ConfigFile) -> String {
    cli_url.unwrap_or_else(|| config.feed.url.clone())
}
