//! Shared, lazily fetched station feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::FeedError;
use super::http::HttpClient;
use super::model::{StationSnapshot, StationsResponse};
use crate::refresh::RefreshStamp;
use crate::signal::{run_filtered, SignalFilterConfig};

/// Digitransit HSL bike rental endpoint.
pub const DEFAULT_STATIONS_URL: &str =
    "https://api.digitransit.fi/routing/v1/routers/hsl/bike_rental";

/// Outcome of one fetch, shared by every consumer of that fetch.
pub type FeedResult = Result<StationSnapshot, FeedError>;

/// A fetch that any number of consumers can await.
pub type SharedFetch = Shared<BoxFuture<'static, FeedResult>>;

/// Station feed with at most one outstanding request.
///
/// [`get_stations`](Self::get_stations) hands out clones of one shared
/// future: the first call issues the GET, later calls join it, and the
/// resolved result stays cached until [`invalidate`](Self::invalidate).
///
/// [`refresh`](Self::refresh) publishes each result to a latest-value
/// channel so late subscribers get the current snapshot.
pub struct StationFeed {
    client: Arc<dyn HttpClient>,
    url: String,
    current: Mutex<Option<SharedFetch>>,
    latest: watch::Sender<Option<FeedResult>>,
    requests_issued: Arc<AtomicU64>,
}

impl StationFeed {
    /// Creates a feed against the given endpoint.
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            client,
            url: url.into(),
            current: Mutex::new(None),
            latest,
            requests_issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a feed against the default HSL endpoint.
    pub fn with_default_url(client: Arc<dyn HttpClient>) -> Self {
        Self::new(client, DEFAULT_STATIONS_URL)
    }

    /// The endpoint this feed fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the current fetch, starting one if none is cached.
    ///
    /// The returned future is lazy: the request is issued when it is first
    /// polled, and every clone shares that single request.
    pub fn get_stations(&self) -> SharedFetch {
        let mut current = self.current.lock();
        if let Some(fetch) = current.as_ref() {
            return fetch.clone();
        }

        let fetch = self.fetch().shared();
        *current = Some(fetch.clone());
        fetch
    }

    /// Drops the cached fetch so the next consumer issues a new request.
    ///
    /// Consumers already awaiting the old fetch still receive its result.
    pub fn invalidate(&self) {
        self.current.lock().take();
    }

    /// Fetches fresh stations and publishes the result to subscribers.
    pub async fn refresh(&self) -> FeedResult {
        self.invalidate();
        let result = self.get_stations().await;

        match &result {
            Ok(snapshot) => info!(stations = snapshot.len(), "Station feed refreshed"),
            Err(e) => warn!(error = %e, url = %self.url, "Station feed refresh failed"),
        }

        self.latest.send_replace(Some(result.clone()));
        result
    }

    /// Subscribe to published results.
    ///
    /// The receiver starts with the latest result (`None` before the first
    /// refresh completes).
    pub fn subscribe(&self) -> watch::Receiver<Option<FeedResult>> {
        self.latest.subscribe()
    }

    /// Number of HTTP requests this feed has issued.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::Relaxed)
    }

    /// Refreshes whenever the trigger settles on a new value.
    ///
    /// Trigger values are de-duplicated and debounced before a refresh is
    /// issued; absent values are ignored. Runs until `cancellation` fires
    /// or the trigger is dropped.
    pub async fn run(
        self: Arc<Self>,
        trigger: watch::Receiver<Option<RefreshStamp>>,
        config: SignalFilterConfig,
        cancellation: CancellationToken,
    ) {
        info!(
            url = %self.url,
            quiet_ms = config.quiet_period.as_millis() as u64,
            "Station feed driver starting"
        );

        let feed = Arc::clone(&self);
        let refresh_cancellation = cancellation.clone();
        run_filtered(trigger, config, cancellation, move |stamp| {
            let feed = Arc::clone(&feed);
            let cancellation = refresh_cancellation.clone();
            async move {
                let Some(stamp) = stamp else {
                    return;
                };
                debug!(stamp = stamp.millis(), "Refresh trigger settled");

                // A fetch completing after shutdown is dropped unpublished
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {}
                    _ = feed.refresh() => {}
                }
            }
        })
        .await;

        info!("Station feed driver stopped");
    }

    fn fetch(&self) -> BoxFuture<'static, FeedResult> {
        let client = Arc::clone(&self.client);
        let url = self.url.clone();
        let counter = Arc::clone(&self.requests_issued);

        async move {
            counter.fetch_add(1, Ordering::Relaxed);
            debug!(url = %url, "Fetching stations");

            let body = client.get(&url).await?;
            let response: StationsResponse =
                serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))?;

            Ok(StationSnapshot::new(response.stations))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::refresh::{RefreshStamp, RefreshTrigger};
    use crate::station::http::tests::MockHttpClient;

    const BODY: &str = r#"{"stations": [
        {"id": "1", "bikesAvailable": 3, "x": 24.9, "y": 60.1},
        {"id": "2", "bikesAvailable": 0, "x": 24.95, "y": 60.17}
    ]}"#;

    fn feed_with(client: Arc<MockHttpClient>) -> Arc<StationFeed> {
        Arc::new(StationFeed::new(client, "http://stations.test/bike_rental"))
    }

    #[tokio::test]
    async fn test_get_stations_decodes_body() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));

        let snapshot = feed.get_stations().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.stations()[0].id, "1");
    }

    #[tokio::test]
    async fn test_get_stations_is_lazy() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));

        let _fetch = feed.get_stations();
        assert_eq!(client.calls(), 0);
        assert_eq!(feed.requests_issued(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_share_one_request() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(MockHttpClient::ok(BODY).gated(Arc::clone(&gate)));
        let feed = feed_with(Arc::clone(&client));

        let first = tokio::spawn(feed.get_stations());
        let second = tokio::spawn(feed.get_stations());
        tokio::task::yield_now().await;
        gate.notify_one();

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert_eq!(first, second);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_result_cached_until_invalidated() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));

        feed.get_stations().await.unwrap();
        feed.get_stations().await.unwrap();
        assert_eq!(client.calls(), 1);

        feed.invalidate();
        feed.get_stations().await.unwrap();
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_surfaces() {
        let client = Arc::new(MockHttpClient::ok("<html>maintenance</html>"));
        let feed = feed_with(client);

        let result = feed.refresh().await;
        assert!(matches!(result, Err(FeedError::Decode(_))));
        assert!(matches!(
            *feed.subscribe().borrow(),
            Some(Err(FeedError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn test_http_error_published_to_subscribers() {
        let client = Arc::new(MockHttpClient::failing(FeedError::Status {
            url: "http://stations.test/bike_rental".to_string(),
            status: 500,
        }));
        let feed = feed_with(client);
        let mut rx = feed.subscribe();

        let _ = feed.refresh().await;
        rx.changed().await.unwrap();
        assert!(matches!(
            *rx.borrow(),
            Some(Err(FeedError::Status { status: 500, .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_triggers_fetches_once() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));
        let trigger = RefreshTrigger::new();
        let cancellation = CancellationToken::new();

        tokio::spawn(Arc::clone(&feed).run(
            trigger.subscribe(),
            SignalFilterConfig::default(),
            cancellation.clone(),
        ));

        for i in 1..=5 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.fire(RefreshStamp::from_millis(1_000 + i * 150));
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(client.calls(), 1);
        assert!(matches!(*feed.subscribe().borrow(), Some(Ok(_))));
        cancellation.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_triggers_fetch_each_time() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));
        let trigger = RefreshTrigger::new();
        let cancellation = CancellationToken::new();

        tokio::spawn(Arc::clone(&feed).run(
            trigger.subscribe(),
            SignalFilterConfig::default(),
            cancellation.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.fire(RefreshStamp::from_millis(10_000));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(client.calls(), 2);
        cancellation.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_stamp_does_not_refetch() {
        let client = Arc::new(MockHttpClient::ok(BODY));
        let feed = feed_with(Arc::clone(&client));
        let trigger = RefreshTrigger::new();
        let cancellation = CancellationToken::new();
        trigger.fire(RefreshStamp::from_millis(5_000));

        tokio::spawn(Arc::clone(&feed).run(
            trigger.subscribe(),
            SignalFilterConfig::default(),
            cancellation.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.fire(RefreshStamp::from_millis(5_000));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(client.calls(), 1);
        cancellation.cancel();
    }
}
