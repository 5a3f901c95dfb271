//! Conversion of stations and positions into GeoJSON features.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use super::layer::{LayerKind, TITLE_PROPERTY};
use crate::position::Coordinate;
use crate::station::Station;

/// Splits stations into those with bikes and those without.
///
/// Every station lands in exactly one of the two lists.
pub fn partition_stations(stations: &[Station]) -> (Vec<&Station>, Vec<&Station>) {
    stations.iter().partition(|station| station.has_bikes())
}

/// Stations that belong on the layer of the given kind.
///
/// Returns nothing for [`LayerKind::CurrentLocation`].
pub fn stations_for_kind(stations: &[Station], kind: LayerKind) -> Vec<&Station> {
    match kind {
        LayerKind::AvailableStations => stations.iter().filter(|s| s.has_bikes()).collect(),
        LayerKind::UnavailableStations => stations.iter().filter(|s| !s.has_bikes()).collect(),
        LayerKind::CurrentLocation => Vec::new(),
    }
}

/// Point feature labelled with the station's bike count.
pub fn station_feature(station: &Station) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(
        TITLE_PROPERTY.to_string(),
        JsonValue::from(station.bikes_available),
    );

    Feature {
        bbox: None,
        geometry: Some(point(station.lon_lat())),
        id: Some(Id::String(station.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn station_features<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Vec<Feature> {
    stations.into_iter().map(station_feature).collect()
}

/// Unlabelled point feature for the device position.
pub fn location_feature(coordinate: Coordinate) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(point(coordinate.lon_lat())),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

pub fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Station id carried by a feature, if any.
pub fn feature_station_id(feature: &Feature) -> Option<&str> {
    match feature.id.as_ref()? {
        Id::String(id) => Some(id.as_str()),
        Id::Number(_) => None,
    }
}

fn point(lon_lat: [f64; 2]) -> Geometry {
    Geometry::new(Value::Point(lon_lat.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn station(id: &str, bikes: i64) -> Station {
        Station {
            id: id.to_string(),
            name: String::new(),
            state: String::new(),
            bikes_available: bikes,
            spaces_available: 0,
            allow_dropoff: true,
            is_floating_bike: false,
            real_time_data: true,
            networks: Vec::new(),
            x: 24.9,
            y: 60.1,
        }
    }

    #[test]
    fn test_station_feature_geometry_and_title() {
        let feature = station_feature(&station("42", 3));

        let geometry = feature.geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![24.9, 60.1]));
        assert_eq!(feature.property(TITLE_PROPERTY), Some(&JsonValue::from(3)));
        assert_eq!(feature_station_id(&feature), Some("42"));
    }

    #[test]
    fn test_location_feature_has_no_properties() {
        let feature = location_feature(Coordinate::new(60.17, 24.94));
        assert!(feature.properties.is_none());
        assert_eq!(
            feature.geometry.unwrap().value,
            Value::Point(vec![24.94, 60.17])
        );
    }

    #[test]
    fn test_zero_and_negative_counts_are_unavailable() {
        let stations = vec![station("a", 0), station("b", -1), station("c", 1)];
        let (available, unavailable) = partition_stations(&stations);
        assert_eq!(available.len(), 1);
        assert_eq!(unavailable.len(), 2);
    }

    #[test]
    fn test_current_location_kind_selects_no_stations() {
        let stations = vec![station("a", 2)];
        assert!(stations_for_kind(&stations, LayerKind::CurrentLocation).is_empty());
    }

    proptest! {
        #[test]
        fn prop_partition_is_total_and_disjoint(counts in prop::collection::vec(-5i64..20, 0..64)) {
            let stations: Vec<Station> = counts
                .iter()
                .enumerate()
                .map(|(i, bikes)| station(&i.to_string(), *bikes))
                .collect();

            let (available, unavailable) = partition_stations(&stations);
            prop_assert_eq!(available.len() + unavailable.len(), stations.len());

            for s in &stations {
                let in_available = available.iter().any(|a| a.id == s.id);
                let in_unavailable = unavailable.iter().any(|u| u.id == s.id);
                prop_assert!(in_available != in_unavailable);
                prop_assert_eq!(in_available, s.bikes_available > 0);
            }

            let by_kind = stations_for_kind(&stations, LayerKind::AvailableStations);
            prop_assert_eq!(by_kind.len(), available.len());
        }
    }
}
