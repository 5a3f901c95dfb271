//! BikeMap - live bike-share availability on a city map
//!
//! This library coordinates three asynchronous sources into map layer updates:
//!
//! - **Refresh trigger** (application start, window refocus) drives station fetches
//! - **Station feed** (HTTP) produces station snapshots
//! - **Position tracker** (geolocation) produces the current coordinate
//!
//! The [`map::MapCoordinator`] owns the map surface and wires these sources
//! into the [`render::MarkerRenderer`], with de-duplication and debouncing
//! provided by the [`signal`] module.
//!
//! # Architecture
//!
//! ```text
//! RefreshTrigger ──► SignalFilter ──► StationFeed ──┬──► available layer
//!                    (distinct+debounce)  (HTTP)    └──► unavailable layer
//!
//! PositionTracker ─► SignalFilter ──► current-location layer + fly-to
//! ```

pub mod app;
pub mod config;
pub mod log;
pub mod map;
pub mod notice;
pub mod position;
pub mod refresh;
pub mod render;
pub mod report;
pub mod signal;
pub mod station;

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
