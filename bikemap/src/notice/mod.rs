//! One-time privacy notice.
//!
//! The notice is shown [`NOTICE_DELAY`] after the map opens, unless the user
//! acknowledged it in an earlier session. Acknowledging stores the
//! dismissal timestamp under [`INFO_MESSAGE_KEY`] in a [`FlagStore`].
//!
//! A missing or failing store never blocks the session: the notice is then
//! treated as not dismissed, and dismissing it only logs.

mod store;

pub use store::{FlagStore, IniFlagStore, MemoryFlagStore, FLAG_SECTION};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Flag store key recording the dismissal.
pub const INFO_MESSAGE_KEY: &str = "infoMessage";

/// Delay between opening the map and showing the notice.
pub const NOTICE_DELAY: Duration = Duration::from_millis(2400);

pub const NOTICE_MESSAGE: &str = "Your location is never saved or sent anywhere. \
     Cookies are sent from pageviews. Have a great ride!";

/// Label of the acknowledging action.
pub const NOTICE_ACTION: &str = "Cool!";

/// Errors raised by flag stores.
#[derive(Debug, Error)]
pub enum NoticeError {
    #[error("failed to read flag store {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write flag store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("flag store is unavailable")]
    Unavailable,
}

/// Displays the notice to the user.
pub trait NoticePresenter: Send + Sync {
    fn present(&self, message: &str, action: &str);
}

/// The one-time info notice and its persisted dismissal flag.
pub struct InfoNotice {
    store: Option<Arc<dyn FlagStore>>,
    delay: Duration,
}

impl InfoNotice {
    pub fn new(store: Option<Arc<dyn FlagStore>>) -> Self {
        Self {
            store,
            delay: NOTICE_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Dismissal timestamp in milliseconds, if the notice was acknowledged.
    pub fn dismissed_at(&self) -> Option<i64> {
        let store = self.store.as_ref()?;
        match store.get(INFO_MESSAGE_KEY) {
            Ok(value) => value.and_then(|v| v.trim().parse().ok()),
            Err(e) => {
                warn!(error = %e, "Failed to read notice flag");
                None
            }
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at().is_some()
    }

    /// Record the acknowledgement; returns the stored timestamp.
    pub fn dismiss(&self) -> Option<i64> {
        let Some(store) = self.store.as_ref() else {
            debug!("No flag store, notice dismissal not persisted");
            return None;
        };

        let now = Utc::now().timestamp_millis();
        match store.set(INFO_MESSAGE_KEY, &now.to_string()) {
            Ok(()) => {
                info!(dismissed_at = now, "Info notice dismissed");
                Some(now)
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist notice dismissal");
                None
            }
        }
    }

    /// Forget the dismissal so the notice shows again.
    pub fn reset(&self) -> Result<(), NoticeError> {
        let store = self.store.as_ref().ok_or(NoticeError::Unavailable)?;
        store.remove(INFO_MESSAGE_KEY)
    }

    /// Wait for the delay, then present the notice unless dismissed.
    ///
    /// Returns `true` when the notice was presented.
    pub async fn open(
        &self,
        presenter: &dyn NoticePresenter,
        cancellation: CancellationToken,
    ) -> bool {
        if self.is_dismissed() {
            debug!("Info notice already dismissed");
            return false;
        }

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => return false,
            _ = tokio::time::sleep(self.delay) => {}
        }

        // Acknowledged in the meantime (e.g. another window)
        if self.is_dismissed() {
            return false;
        }

        presenter.present(NOTICE_MESSAGE, NOTICE_ACTION);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingPresenter {
        shown: Mutex<Vec<(String, String)>>,
    }

    impl NoticePresenter for RecordingPresenter {
        fn present(&self, message: &str, action: &str) {
            self.shown.lock().push((message.to_string(), action.to_string()));
        }
    }

    fn memory_notice() -> (InfoNotice, Arc<MemoryFlagStore>) {
        let store = Arc::new(MemoryFlagStore::new());
        (InfoNotice::new(Some(store.clone())), store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_shown_after_delay() {
        let (notice, _store) = memory_notice();
        let presenter = RecordingPresenter::default();

        let start = tokio::time::Instant::now();
        assert!(notice.open(&presenter, CancellationToken::new()).await);
        assert!(start.elapsed() >= Duration::from_millis(2400));

        let shown = presenter.shown.lock();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1, "Cool!");
        assert!(shown[0].0.starts_with("Your location is never saved"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_notice_not_shown() {
        let (notice, store) = memory_notice();
        let stamp = notice.dismiss().unwrap();
        assert_eq!(store.get(INFO_MESSAGE_KEY).unwrap(), Some(stamp.to_string()));

        let presenter = RecordingPresenter::default();
        assert!(!notice.open(&presenter, CancellationToken::new()).await);
        assert!(presenter.shown.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_delay() {
        let (notice, _store) = memory_notice();
        let presenter = RecordingPresenter::default();
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        assert!(!notice.open(&presenter, cancellation).await);
        assert!(presenter.shown.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_store_always_shown() {
        let notice = InfoNotice::new(None).with_delay(Duration::from_millis(10));
        assert_eq!(notice.dismiss(), None);
        assert!(!notice.is_dismissed());
        assert!(matches!(notice.reset(), Err(NoticeError::Unavailable)));

        let presenter = RecordingPresenter::default();
        assert!(notice.open(&presenter, CancellationToken::new()).await);
    }

    #[test]
    fn test_reset_clears_dismissal() {
        let (notice, _store) = memory_notice();
        notice.dismiss();
        assert!(notice.is_dismissed());

        notice.reset().unwrap();
        assert!(!notice.is_dismissed());
    }

    #[test]
    fn test_garbage_flag_is_not_dismissed() {
        let (notice, store) = memory_notice();
        store.set(INFO_MESSAGE_KEY, "yes please").unwrap();
        assert!(!notice.is_dismissed());
    }
}
