//! Distinct + debounce state machine.
//!
//! Values arrive in bursts (window refocus, repeated geolocation callbacks).
//! The filter drops a value identical to the previously observed one, and
//! holds the newest value back until no further value has arrived for the
//! quiet period. A released value identical to the previously released one
//! is also dropped, so downstream consumers never see the same value twice
//! in a row.

use std::time::{Duration, Instant};

/// Default quiet period before a pending value is released.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Configuration for a signal filter.
#[derive(Debug, Clone)]
pub struct SignalFilterConfig {
    /// Time without new values after which the pending value is released.
    pub quiet_period: Duration,
}

impl Default for SignalFilterConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

impl SignalFilterConfig {
    /// Create a configuration with the given quiet period.
    pub fn new(quiet_period: Duration) -> Self {
        Self { quiet_period }
    }
}

/// State machine that de-duplicates and debounces a stream of values.
///
/// The filter is driven by explicit timestamps so it can be tested without
/// a clock. See [`super::run_filtered`] for the async driver.
#[derive(Debug)]
pub struct SignalFilter<T> {
    config: SignalFilterConfig,

    /// Last value accepted from the input (distinct check).
    last_seen: Option<T>,

    /// Last value released to the consumer.
    last_released: Option<T>,

    /// Value waiting for the quiet period to elapse.
    pending: Option<T>,

    /// When the pending value becomes releasable.
    deadline: Option<Instant>,
}

impl<T: Clone + PartialEq> SignalFilter<T> {
    /// Create a new filter with the given configuration.
    pub fn new(config: SignalFilterConfig) -> Self {
        Self {
            config,
            last_seen: None,
            last_released: None,
            pending: None,
            deadline: None,
        }
    }

    /// Create a filter with the default 1000ms quiet period.
    pub fn with_defaults() -> Self {
        Self::new(SignalFilterConfig::default())
    }

    /// Record an incoming value.
    ///
    /// # Returns
    ///
    /// `true` if the value was accepted (and restarted the quiet period),
    /// `false` if it was identical to the previous input and dropped.
    pub fn record(&mut self, value: T, now: Instant) -> bool {
        if self.last_seen.as_ref() == Some(&value) {
            return false;
        }

        self.last_seen = Some(value.clone());
        self.pending = Some(value);
        self.deadline = Some(now + self.config.quiet_period);
        true
    }

    /// Release the pending value if the quiet period has elapsed.
    ///
    /// Returns `None` while still inside the quiet period, when nothing is
    /// pending, or when the pending value equals the last released value.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }

        self.deadline = None;
        let value = self.pending.take()?;

        if self.last_released.as_ref() == Some(&value) {
            return None;
        }

        self.last_released = Some(value.clone());
        Some(value)
    }

    /// When the pending value becomes releasable, if any value is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a value is waiting for the quiet period.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The most recently released value.
    pub fn last_released(&self) -> Option<&T> {
        self.last_released.as_ref()
    }

    /// Get the current configuration.
    pub fn config(&self) -> &SignalFilterConfig {
        &self.config
    }
}
