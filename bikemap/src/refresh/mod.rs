//! Refresh trigger.
//!
//! Emits a timestamp when the application starts and every time its window
//! becomes active again. The value carries no meaning beyond being distinct
//! from the previous one; consumers treat it as a "please refresh" signal.

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;

/// Moment a refresh was requested, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshStamp(i64);

impl RefreshStamp {
    /// Stamp for the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Stamp for an explicit event time.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }
}

/// Publishes refresh requests through a latest-value channel.
#[derive(Debug)]
pub struct RefreshTrigger {
    tx: watch::Sender<Option<RefreshStamp>>,
}

impl RefreshTrigger {
    /// Creates the trigger and emits the application-start signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        let trigger = Self { tx };
        trigger.fire(RefreshStamp::now());
        trigger
    }

    /// Signals that the window was loaded or regained focus.
    pub fn window_activated(&self) -> RefreshStamp {
        let stamp = RefreshStamp::now();
        self.fire(stamp);
        stamp
    }

    /// Emits an explicit stamp, e.g. the timestamp of a host window event.
    pub fn fire(&self, stamp: RefreshStamp) {
        debug!(stamp = stamp.millis(), "Refresh requested");
        self.tx.send_replace(Some(stamp));
    }

    /// The most recent stamp.
    pub fn latest(&self) -> Option<RefreshStamp> {
        *self.tx.borrow()
    }

    /// Subscribe to refresh requests, starting from the latest stamp.
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshStamp>> {
        self.tx.subscribe()
    }
}

impl Default for RefreshTrigger {
    fn default() -> Self {
        Self::new()
    }
}
