//! Geolocation capability and coordinate type.

use std::fmt;

use futures::future::BoxFuture;
use thiserror::Error;

/// A device position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Position as `[longitude, latitude]`, the GeoJSON axis order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Whether both components are finite and within geographic range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Errors reported by a geolocation capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeolocationError {
    /// The user refused to share the position.
    #[error("permission to read the position was denied")]
    PermissionDenied,

    /// The platform could not determine a position.
    #[error("position unavailable: {0}")]
    Unavailable(String),

    /// No position within the allowed time.
    #[error("timed out waiting for a position")]
    Timeout,
}

/// A single-shot source of the device position.
pub trait Geolocation: Send + Sync {
    /// Asks for the current position once.
    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, GeolocationError>>;
}

/// Geolocation that always reports the same configured position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation {
    coordinate: Coordinate,
}

impl FixedGeolocation {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

impl Geolocation for FixedGeolocation {
    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, GeolocationError>> {
        let coordinate = self.coordinate;
        Box::pin(async move {
            if coordinate.is_valid() {
                Ok(coordinate)
            } else {
                Err(GeolocationError::Unavailable(format!(
                    "configured position {} is out of range",
                    coordinate
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_order() {
        let c = Coordinate::new(60.17, 24.94);
        assert_eq!(c.lon_lat(), [24.94, 60.17]);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(60.17, 24.94).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    }

    #[tokio::test]
    async fn test_fixed_geolocation_reports_position() {
        let geo = FixedGeolocation::new(Coordinate::new(60.1718, 24.9414));
        assert_eq!(
            geo.current_position().await,
            Ok(Coordinate::new(60.1718, 24.9414))
        );
    }

    #[tokio::test]
    async fn test_fixed_geolocation_rejects_out_of_range() {
        let geo = FixedGeolocation::new(Coordinate::new(120.0, 24.9414));
        assert!(matches!(
            geo.current_position().await,
            Err(GeolocationError::Unavailable(_))
        ));
    }
}
