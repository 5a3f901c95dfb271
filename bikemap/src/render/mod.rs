//! Marker rendering.
//!
//! Converts stations and positions into GeoJSON point features and installs
//! them as symbol layers on a [`crate::map::MapSurface`]. There is one
//! logical layer per [`LayerKind`]:
//!
//! | Kind | Icon | Label |
//! |------|------|-------|
//! | current location | red | none |
//! | available stations | yellow | bike count |
//! | unavailable stations | white | bike count |
//!
//! A station is available when it has at least one bike.

mod features;
mod layer;
mod renderer;

pub use features::{
    feature_collection, feature_station_id, location_feature, partition_stations,
    station_feature, station_features, stations_for_kind,
};
pub use layer::{
    GeoJsonSource, LayerId, LayerIdGenerator, LayerKind, MarkerIcon, SymbolLayer, SymbolLayout,
    TextAnchor, LABEL_FONTS, LABEL_OFFSET, TITLE_PROPERTY,
};
pub use renderer::{LayerSlot, MarkerRenderer, RenderError};
