//! Symbol layer model.
//!
//! Layers serialize to the JSON shape map style engines expect for a
//! `symbol` layer backed by an inline GeoJSON source:
//!
//! ```text
//! { "id": "...", "type": "symbol",
//!   "source": { "type": "geojson", "data": { "type": "FeatureCollection", ... } },
//!   "layout": { "icon-image": "yellow", "text-field": "{title}", ... } }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use geojson::FeatureCollection;
use serde::Serialize;

/// Fonts used for station labels.
pub const LABEL_FONTS: [&str; 2] = ["Open Sans Semibold", "Arial Unicode MS Bold"];

/// Label offset in ems, placing the bike count above the icon.
pub const LABEL_OFFSET: [f64; 2] = [0.0, 0.55];

/// Feature property holding the label text.
pub const TITLE_PROPERTY: &str = "title";

/// Logical overlay category. At most one layer per kind is on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    CurrentLocation,
    AvailableStations,
    UnavailableStations,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [
        LayerKind::CurrentLocation,
        LayerKind::AvailableStations,
        LayerKind::UnavailableStations,
    ];

    /// Suffix appended to layer identifiers of this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            LayerKind::CurrentLocation => "current",
            LayerKind::AvailableStations => "available",
            LayerKind::UnavailableStations => "unavailable",
        }
    }

    /// Icon drawn for every feature of this kind.
    pub fn icon(&self) -> MarkerIcon {
        match self {
            LayerKind::CurrentLocation => MarkerIcon::Red,
            LayerKind::AvailableStations => MarkerIcon::Yellow,
            LayerKind::UnavailableStations => MarkerIcon::White,
        }
    }

    /// Layout for layers of this kind.
    pub fn layout(&self) -> SymbolLayout {
        match self {
            LayerKind::CurrentLocation => SymbolLayout::icon_only(self.icon()),
            LayerKind::AvailableStations | LayerKind::UnavailableStations => {
                SymbolLayout::labelled(self.icon())
            }
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            LayerKind::CurrentLocation => 0,
            LayerKind::AvailableStations => 1,
            LayerKind::UnavailableStations => 2,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Marker icon images registered with the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Current location.
    Red,
    /// Station with bikes.
    Yellow,
    /// Station without bikes.
    White,
}

impl MarkerIcon {
    pub const ALL: [MarkerIcon; 3] = [MarkerIcon::Red, MarkerIcon::Yellow, MarkerIcon::White];

    /// Image name the layout refers to.
    pub fn name(&self) -> &'static str {
        match self {
            MarkerIcon::Red => "red",
            MarkerIcon::Yellow => "yellow",
            MarkerIcon::White => "white",
        }
    }

    /// File name inside the icon directory.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.name())
    }
}

/// Unique layer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Issues time-based layer identifiers.
///
/// The sequence number keeps identifiers unique when two layers are created
/// within the same millisecond.
#[derive(Debug, Default)]
pub struct LayerIdGenerator {
    sequence: AtomicU64,
}

impl LayerIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, kind: LayerKind) -> LayerId {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        LayerId(format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            seq,
            kind.suffix()
        ))
    }
}

/// Anchor of the label relative to the feature position.
///
/// Station labels sit above the marker, so only the bottom anchor is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Bottom,
}

/// Visual style of a symbol layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SymbolLayout {
    pub icon_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text_font: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_offset: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<TextAnchor>,
}

impl SymbolLayout {
    /// Icon without a label.
    pub fn icon_only(icon: MarkerIcon) -> Self {
        Self {
            icon_image: icon.name().to_string(),
            text_field: None,
            text_font: Vec::new(),
            text_offset: None,
            text_anchor: None,
        }
    }

    /// Icon with the feature's title drawn above it.
    pub fn labelled(icon: MarkerIcon) -> Self {
        Self {
            icon_image: icon.name().to_string(),
            text_field: Some(format!("{{{}}}", TITLE_PROPERTY)),
            text_font: LABEL_FONTS.iter().map(|f| f.to_string()).collect(),
            text_offset: Some(LABEL_OFFSET),
            text_anchor: Some(TextAnchor::Bottom),
        }
    }
}

/// Inline GeoJSON source of a layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "geojson")]
pub struct GeoJsonSource {
    pub data: FeatureCollection,
}

/// A symbol layer ready to be installed on the map surface.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "symbol")]
pub struct SymbolLayer {
    pub id: LayerId,
    #[serde(skip)]
    pub kind: LayerKind,
    pub source: GeoJsonSource,
    pub layout: SymbolLayout,
}

impl SymbolLayer {
    pub fn new(id: LayerId, kind: LayerKind, data: FeatureCollection) -> Self {
        Self {
            id,
            kind,
            source: GeoJsonSource { data },
            layout: kind.layout(),
        }
    }

    pub fn features(&self) -> &[geojson::Feature] {
        &self.source.data.features
    }

    pub fn feature_count(&self) -> usize {
        self.source.data.features.len()
    }

    /// Style JSON of this layer.
    pub fn to_style_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
