//! Device position tracking.
//!
//! The [`PositionTracker`] wraps an optional [`Geolocation`] capability and
//! publishes the latest known [`Coordinate`]. It holds no history: each
//! successful fix replaces the previous value.
//!
//! A missing capability is not an error. The tracker simply never produces
//! a position, and consumers must tolerate the empty state.

mod geolocation;
mod tracker;

pub use geolocation::{Coordinate, FixedGeolocation, Geolocation, GeolocationError};
pub use tracker::PositionTracker;

#[cfg(test)]
pub(crate) use tracker::tests::ScriptedGeolocation;
