//! Station data model as served by the bike rental endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bike-share dock.
///
/// Field names follow the camelCase JSON of the routing API. Descriptive
/// fields the renderer does not rely on default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub bikes_available: i64,
    #[serde(default)]
    pub spaces_available: i64,
    #[serde(default)]
    pub allow_dropoff: bool,
    #[serde(default)]
    pub is_floating_bike: bool,
    #[serde(default)]
    pub real_time_data: bool,
    #[serde(default)]
    pub networks: Vec<String>,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

impl Station {
    /// Whether at least one bike can be picked up here.
    pub fn has_bikes(&self) -> bool {
        self.bikes_available > 0
    }

    /// Position as `[longitude, latitude]`.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Response body of the bike rental endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// The stations of one successful fetch.
///
/// Each snapshot fully replaces the previous one; nothing is merged.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSnapshot {
    stations: Arc<[Station]>,
    fetched_at: DateTime<Utc>,
}

impl StationSnapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations: stations.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "stations": [
            {
                "id": "001",
                "name": "Kaivopuisto",
                "state": "Station on",
                "bikesAvailable": 4,
                "spacesAvailable": 26,
                "allowDropoff": true,
                "isFloatingBike": false,
                "realTimeData": true,
                "networks": ["smoove"],
                "x": 24.9502,
                "y": 60.1553
            },
            {
                "id": "002",
                "bikesAvailable": 0,
                "x": 24.9565,
                "y": 60.1601
            }
        ]
    }"#;

    #[test]
    fn test_decode_full_and_sparse_stations() {
        let response: StationsResponse = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(response.stations.len(), 2);

        let full = &response.stations[0];
        assert_eq!(full.name, "Kaivopuisto");
        assert_eq!(full.spaces_available, 26);
        assert!(full.allow_dropoff);
        assert_eq!(full.networks, vec!["smoove".to_string()]);
        assert_eq!(full.lon_lat(), [24.9502, 60.1553]);

        let sparse = &response.stations[1];
        assert!(sparse.name.is_empty());
        assert!(sparse.networks.is_empty());
        assert!(!sparse.has_bikes());
    }

    #[test]
    fn test_missing_coordinates_is_an_error() {
        let body = r#"{"stations": [{"id": "x", "bikesAvailable": 1}]}"#;
        assert!(serde_json::from_str::<StationsResponse>(body).is_err());
    }

    #[test]
    fn test_snapshot_accessors() {
        let response: StationsResponse = serde_json::from_str(RESPONSE).unwrap();
        let snapshot = StationSnapshot::new(response.stations);
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.stations()[1].id, "002");
    }
}
