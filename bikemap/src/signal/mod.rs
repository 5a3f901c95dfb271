//! Signal filtering for bursty asynchronous sources.
//!
//! Both the refresh trigger and the position tracker publish their latest
//! value through a `tokio::sync::watch` channel. Consumers must not react to
//! every update: identical consecutive values are dropped and the remaining
//! ones are debounced. This module provides the pure state machine
//! ([`SignalFilter`]) and an async driver ([`run_filtered`]) that feeds it
//! from a watch receiver.
//!
//! # Example
//!
//! ```ignore
//! use bikemap::signal::{run_filtered, SignalFilterConfig};
//!
//! let (tx, rx) = tokio::sync::watch::channel(None);
//! let shutdown = CancellationToken::new();
//!
//! tokio::spawn(run_filtered(rx, SignalFilterConfig::default(), shutdown, |value| async move {
//!     println!("settled on {:?}", value);
//! }));
//! ```

mod filter;

pub use filter::{SignalFilter, SignalFilterConfig, DEFAULT_QUIET_PERIOD};

use std::future::Future;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Drive a [`SignalFilter`] from a watch channel until cancelled.
///
/// The value current at subscription time is treated as the first input, so
/// a consumer that subscribes late still observes the latest state. Every
/// released value is passed to `on_release` and awaited before the next
/// input is processed, preserving per-stream order.
///
/// The loop ends when `cancellation` fires, or when the sender is dropped
/// and no value is left pending.
pub async fn run_filtered<T, F, Fut>(
    mut rx: watch::Receiver<T>,
    config: SignalFilterConfig,
    cancellation: CancellationToken,
    mut on_release: F,
) where
    T: Clone + PartialEq + Send + Sync,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut filter = SignalFilter::new(config);
    let mut sender_open = true;

    let initial = rx.borrow_and_update().clone();
    filter.record(initial, Instant::now().into_std());

    loop {
        if !sender_open && !filter.has_pending() {
            break;
        }

        let deadline = filter.deadline().map(Instant::from_std);

        tokio::select! {
            biased;

            _ = cancellation.cancelled() => {
                trace!("Signal filter cancelled");
                break;
            }

            _ = sleep_until_deadline(deadline) => {
                if let Some(value) = filter.poll(Instant::now().into_std()) {
                    on_release(value).await;
                }
            }

            changed = rx.changed(), if sender_open => {
                match changed {
                    Ok(()) => {
                        let value = rx.borrow_and_update().clone();
                        if !filter.record(value, Instant::now().into_std()) {
                            trace!("Dropped duplicate signal");
                        }
                    }
                    Err(_) => sender_open = false,
                }
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    fn spawn_collector(
        rx: watch::Receiver<Option<u32>>,
        cancellation: CancellationToken,
    ) -> (Arc<Mutex<Vec<Option<u32>>>>, tokio::task::JoinHandle<()>) {
        let released = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&released);
        let handle = tokio::spawn(run_filtered(
            rx,
            SignalFilterConfig::default(),
            cancellation,
            move |value| {
                let sink = Arc::clone(&sink);
                async move { sink.lock().push(value) }
            },
        ));
        (released, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_updates_release_once() {
        let (tx, rx) = watch::channel(None);
        let (released, _handle) = spawn_collector(rx, CancellationToken::new());

        for value in 1..=5 {
            tx.send_replace(Some(value));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // The burst supersedes the initial value before it settles
        assert_eq!(*released.lock(), vec![Some(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_subscriber_sees_current_value() {
        let (tx, _rx) = watch::channel(None);
        tx.send_replace(Some(42));

        let (released, _handle) = spawn_collector(tx.subscribe(), CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(*released.lock(), vec![Some(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_release() {
        let (tx, rx) = watch::channel(None);
        let cancellation = CancellationToken::new();
        let (released, handle) = spawn_collector(rx, cancellation.clone());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tx.send_replace(Some(1));
        cancellation.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(*released.lock(), vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_flushed_after_sender_dropped() {
        let (tx, rx) = watch::channel(None);
        let (released, handle) = spawn_collector(rx, CancellationToken::new());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        tx.send_replace(Some(9));
        drop(tx);

        handle.await.unwrap();
        assert_eq!(*released.lock(), vec![None, Some(9)]);
    }
}
