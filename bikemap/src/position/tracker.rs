//! Latest-known-position tracker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::geolocation::{Coordinate, Geolocation, GeolocationError};

/// Publishes the latest known device position.
///
/// The value starts empty and is set once per successful geolocation
/// callback. Failed or skipped requests leave it untouched.
pub struct PositionTracker {
    geolocation: Option<Arc<dyn Geolocation>>,
    latest: watch::Sender<Option<Coordinate>>,
    in_flight: AtomicUsize,
}

impl PositionTracker {
    /// Creates a tracker backed by the given capability.
    pub fn new(geolocation: Arc<dyn Geolocation>) -> Self {
        Self::from_option(Some(geolocation))
    }

    /// Creates a tracker for a platform without geolocation.
    pub fn unavailable() -> Self {
        Self::from_option(None)
    }

    /// Creates a tracker from an optional capability.
    pub fn from_option(geolocation: Option<Arc<dyn Geolocation>>) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            geolocation,
            latest,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Whether a geolocation capability is present.
    pub fn has_capability(&self) -> bool {
        self.geolocation.is_some()
    }

    /// Requests the current position once.
    ///
    /// Without a capability this completes immediately with `Ok(())`. On
    /// success the coordinate is published to subscribers. The loading flag
    /// is cleared in every outcome.
    pub async fn get_current_position(&self) -> Result<(), GeolocationError> {
        let Some(geolocation) = self.geolocation.as_ref() else {
            debug!("No geolocation capability, skipping position request");
            return Ok(());
        };

        let loading = InFlight::enter(&self.in_flight);
        let result = geolocation.current_position().await;
        drop(loading);

        match result {
            Ok(coordinate) => {
                info!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    "Position updated"
                );
                self.latest.send_replace(Some(coordinate));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Position request failed");
                Err(e)
            }
        }
    }

    /// Whether a position request is outstanding.
    ///
    /// Stays set until every overlapping request has completed or been
    /// dropped.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The latest known position.
    pub fn latest(&self) -> Option<Coordinate> {
        *self.latest.borrow()
    }

    /// Subscribe to position updates, starting from the latest value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Coordinate>> {
        self.latest.subscribe()
    }
}

/// Counts one outstanding request until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
