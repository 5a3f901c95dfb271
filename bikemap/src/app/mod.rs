//! Application bootstrap and lifecycle management.
//!
//! This module provides the `BikeMapApp` type which builds every component
//! of a session from an [`AppConfig`] and hands the map surface to the
//! coordinator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         BikeMapApp                           │
//! │                                                              │
//! │  1. ErrorReporter ──────► FileReportSink (production only)   │
//! │  2. StationFeed ◄──────── RefreshTrigger                     │
//! │     PositionTracker ◄──── FixedGeolocation (optional)        │
//! │  3. IconSet (red / yellow / white)                           │
//! │  4. MapCoordinator ─────► MapSurface                         │
//! │  +  InfoNotice ─────────► IniFlagStore                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::BikeMapApp;
pub use config::{AppConfig, ReportingAppConfig};
pub use error::AppError;
