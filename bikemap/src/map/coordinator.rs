//! Map coordinator: lifecycle and stream wiring.
//!
//! ```text
//!            start()            ready signal          subscriptions spawned
//! Uninitialized ──► Loading ────────────────► Ready ─────────────────────► Active
//!       │              │                        │                            │
//!       └──────────────┴──────── dispose() ─────┴────────────────────────────┴──► Disposed
//! ```
//!
//! Once ready, the coordinator registers the marker icons and spawns:
//!
//! - the station feed driver (refresh trigger → distinct/debounce → fetch)
//! - one renderer task per station layer kind
//! - a feed error reporter
//! - the position follower (distinct/debounce → marker + fly-to)

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::handle::MapHandle;
use super::icons::IconSet;
use super::surface::{MapOptions, MapSurface, ReadySignal, DEFAULT_ZOOM};
use crate::position::{Coordinate, PositionTracker};
use crate::refresh::RefreshTrigger;
use crate::render::{location_feature, station_features, stations_for_kind, LayerKind};
use crate::report::ErrorReporter;
use crate::signal::{run_filtered, SignalFilterConfig, DEFAULT_QUIET_PERIOD};
use crate::station::{FeedResult, StationFeed};

/// Lifecycle state of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    /// Created, surface not yet loading.
    Uninitialized,
    /// Waiting for the surface to load style and tiles.
    Loading,
    /// Surface ready, icons being registered.
    Ready,
    /// Subscriptions running, markers update live.
    Active,
    /// Torn down; the surface has been released.
    Disposed,
}

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub map: MapOptions,
    /// Quiet period applied to refresh triggers before fetching.
    pub refresh_quiet: Duration,
    /// Quiet period applied to position updates before recentring.
    pub position_quiet: Duration,
    /// Zoom used when flying to the current position.
    pub follow_zoom: f64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            refresh_quiet: DEFAULT_QUIET_PERIOD,
            position_quiet: DEFAULT_QUIET_PERIOD,
            follow_zoom: DEFAULT_ZOOM,
        }
    }
}

/// The data sources the coordinator wires into the map.
#[derive(Clone)]
pub struct MapSources {
    pub feed: Arc<StationFeed>,
    pub tracker: Arc<PositionTracker>,
    pub trigger: Arc<RefreshTrigger>,
}

type SharedHandle<S> = Arc<Mutex<MapHandle<S>>>;

/// Owns the map lifecycle and the subscriptions that update it.
pub struct MapCoordinator<S: MapSurface + 'static> {
    handle: SharedHandle<S>,
    state: Arc<watch::Sender<MapState>>,
    config: CoordinatorConfig,
    sources: MapSources,
    reporter: Arc<ErrorReporter>,
    cancellation: CancellationToken,
    lifecycle: Option<JoinHandle<()>>,
}

impl<S: MapSurface + 'static> MapCoordinator<S> {
    /// Creates a coordinator around an unloaded surface.
    pub fn new(
        config: CoordinatorConfig,
        surface: S,
        sources: MapSources,
        reporter: Arc<ErrorReporter>,
    ) -> Self {
        let (state, _) = watch::channel(MapState::Uninitialized);
        Self {
            handle: Arc::new(Mutex::new(MapHandle::new(surface))),
            state: Arc::new(state),
            config,
            sources,
            reporter,
            cancellation: CancellationToken::new(),
            lifecycle: None,
        }
    }

    /// Loads the surface and requests the initial position.
    ///
    /// Subscriptions start once the surface signals ready. Must be called
    /// from within a Tokio runtime; calling it twice has no effect.
    pub fn start(&mut self, icons: IconSet) {
        if *self.state.borrow() != MapState::Uninitialized {
            warn!(state = ?*self.state.borrow(), "Map coordinator already started");
            return;
        }

        let Some(ready) = self.handle.lock().load(&self.config.map) else {
            return;
        };
        advance(&self.state, MapState::Loading);
        info!(
            style = %self.config.map.style_url,
            zoom = self.config.map.zoom,
            "Map loading"
        );

        let context = LifecycleContext {
            handle: Arc::clone(&self.handle),
            state: Arc::clone(&self.state),
            config: self.config.clone(),
            sources: self.sources.clone(),
            reporter: Arc::clone(&self.reporter),
            cancellation: self.cancellation.clone(),
        };
        self.lifecycle = Some(tokio::spawn(run_lifecycle(context, ready, icons)));

        self.request_position();
    }

    /// Host window was loaded or regained focus.
    ///
    /// Requests a fresh position and fires the refresh trigger.
    pub fn window_activated(&self) {
        self.request_position();
        self.sources.trigger.window_activated();
    }

    /// Cancels all subscriptions and releases the surface.
    ///
    /// After this returns no task can mutate the surface: late completions
    /// find the handle detached and are dropped.
    pub fn dispose(&mut self) -> Option<S> {
        self.cancellation.cancel();
        if let Some(lifecycle) = self.lifecycle.take() {
            lifecycle.abort();
        }

        let surface = self.handle.lock().detach();
        if *self.state.borrow() != MapState::Disposed {
            self.state.send_replace(MapState::Disposed);
            info!("Map coordinator disposed");
        }
        surface
    }

    pub fn state(&self) -> MapState {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<MapState> {
        self.state.subscribe()
    }

    pub fn sources(&self) -> &MapSources {
        &self.sources
    }

    fn request_position(&self) {
        let tracker = Arc::clone(&self.sources.tracker);
        let reporter = Arc::clone(&self.reporter);
        let cancellation = self.cancellation.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {}
                result = tracker.get_current_position() => {
                    if let Err(e) = result {
                        reporter.report("position_tracker", &e);
                    }
                }
            }
        });
    }
}

impl<S: MapSurface + 'static> Drop for MapCoordinator<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

struct LifecycleContext<S> {
    handle: SharedHandle<S>,
    state: Arc<watch::Sender<MapState>>,
    config: CoordinatorConfig,
    sources: MapSources,
    reporter: Arc<ErrorReporter>,
    cancellation: CancellationToken,
}

/// Moves to `next` unless the map was disposed in the meantime.
fn advance(state: &watch::Sender<MapState>, next: MapState) -> bool {
    state.send_if_modified(|current| {
        if *current == MapState::Disposed || *current == next {
            return false;
        }
        *current = next;
        true
    })
}

async fn run_lifecycle<S: MapSurface + 'static>(
    ctx: LifecycleContext<S>,
    ready: ReadySignal,
    icons: IconSet,
) {
    tokio::select! {
        biased;
        _ = ctx.cancellation.cancelled() => return,
        result = ready => {
            if result.is_err() {
                warn!("Map surface dropped its ready signal, markers disabled");
                return;
            }
        }
    }

    if !advance(&ctx.state, MapState::Ready) {
        return;
    }
    info!("Map ready");
    ctx.handle.lock().register_icons(&icons);

    let mut tasks = JoinSet::new();
    let sources = &ctx.sources;

    tasks.spawn(Arc::clone(&sources.feed).run(
        sources.trigger.subscribe(),
        SignalFilterConfig::new(ctx.config.refresh_quiet),
        ctx.cancellation.clone(),
    ));

    for kind in [LayerKind::AvailableStations, LayerKind::UnavailableStations] {
        tasks.spawn(render_stations(
            Arc::clone(&ctx.handle),
            sources.feed.subscribe(),
            kind,
            Arc::clone(&ctx.reporter),
            ctx.cancellation.clone(),
        ));
    }

    tasks.spawn(report_feed_errors(
        sources.feed.subscribe(),
        Arc::clone(&ctx.reporter),
        ctx.cancellation.clone(),
    ));

    tasks.spawn(follow_position(
        Arc::clone(&ctx.handle),
        sources.tracker.subscribe(),
        ctx.config.clone(),
        Arc::clone(&ctx.reporter),
        ctx.cancellation.clone(),
    ));

    if advance(&ctx.state, MapState::Active) {
        info!(subscriptions = tasks.len(), "Map active");
    }

    ctx.cancellation.cancelled().await;
    tasks.shutdown().await;
    debug!("Map subscriptions stopped");
}

/// Keeps the layer of `kind` in sync with published feed results.
async fn render_stations<S: MapSurface + 'static>(
    handle: SharedHandle<S>,
    mut results: watch::Receiver<Option<FeedResult>>,
    kind: LayerKind,
    reporter: Arc<ErrorReporter>,
    cancellation: CancellationToken,
) {
    loop {
        let latest = results.borrow_and_update().clone();

        // Failed refreshes render nothing for that cycle
        if let Some(Ok(snapshot)) = latest {
            let features = station_features(stations_for_kind(snapshot.stations(), kind));
            if !apply_render(&handle, kind, features, &reporter) {
                break;
            }
        }

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => break,
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

async fn report_feed_errors(
    mut results: watch::Receiver<Option<FeedResult>>,
    reporter: Arc<ErrorReporter>,
    cancellation: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => break,
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let latest = results.borrow_and_update().clone();
        if let Some(Err(e)) = latest {
            reporter.report("station_feed", &e);
        }
    }
}

/// Shows the settled position and flies the viewport to it.
async fn follow_position<S: MapSurface + 'static>(
    handle: SharedHandle<S>,
    positions: watch::Receiver<Option<Coordinate>>,
    config: CoordinatorConfig,
    reporter: Arc<ErrorReporter>,
    cancellation: CancellationToken,
) {
    let zoom = config.follow_zoom;
    run_filtered(
        positions,
        SignalFilterConfig::new(config.position_quiet),
        cancellation,
        move |position| {
            if let Some(coordinate) = position {
                show_position(&handle, coordinate, zoom, &reporter);
            }
            std::future::ready(())
        },
    )
    .await;
}

fn show_position<S: MapSurface>(
    handle: &SharedHandle<S>,
    coordinate: Coordinate,
    zoom: f64,
    reporter: &ErrorReporter,
) {
    let features = vec![location_feature(coordinate)];
    if apply_render(handle, LayerKind::CurrentLocation, features, reporter) {
        handle.lock().fly_to(coordinate.lon_lat(), zoom);
        debug!(%coordinate, zoom, "Viewport recentred");
    }
}

/// Renders under the handle lock; returns `false` once the map is detached.
fn apply_render<S: MapSurface>(
    handle: &SharedHandle<S>,
    kind: LayerKind,
    features: Vec<geojson::Feature>,
    reporter: &ErrorReporter,
) -> bool {
    match handle.lock().render(kind, features) {
        None => false,
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            reporter.report("marker_renderer", &e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeadlessSurface;
    use crate::position::{Geolocation, GeolocationError, ScriptedGeolocation};
    use crate::station::http::tests::MockHttpClient;

    const BODY: &str = r#"{"stations": [
        {"id": "1", "bikesAvailable": 3, "x": 24.9, "y": 60.1},
        {"id": "2", "bikesAvailable": 0, "x": 24.95, "y": 60.17}
    ]}"#;

    fn sources(geolocation: Option<Arc<ScriptedGeolocation>>) -> MapSources {
        let client = Arc::new(MockHttpClient::ok(BODY));
        MapSources {
            feed: Arc::new(StationFeed::new(client, "http://stations.test")),
            tracker: Arc::new(PositionTracker::from_option(
                geolocation.map(|g| g as Arc<dyn Geolocation>),
            )),
            trigger: Arc::new(RefreshTrigger::new()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_machine_waits_for_ready() {
        let (surface, ready) = HeadlessSurface::with_manual_ready();
        let registry = surface.registry();
        let mut coordinator = MapCoordinator::new(
            CoordinatorConfig::default(),
            surface,
            sources(None),
            Arc::new(ErrorReporter::log_only()),
        );
        assert_eq!(coordinator.state(), MapState::Uninitialized);

        coordinator.start(IconSet::empty());
        assert_eq!(coordinator.state(), MapState::Loading);

        // Nothing may touch the map while it is loading
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(registry.lock().layers().is_empty());
        assert_eq!(coordinator.state(), MapState::Loading);

        ready.fire();
        let mut state = coordinator.subscribe_state();
        state.wait_for(|s| *s == MapState::Active).await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.lock().layers_of_kind(LayerKind::AvailableStations).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_with_marker_and_fly_to() {
        let geolocation = Arc::new(ScriptedGeolocation::new(vec![
            Ok(Coordinate::new(60.17, 24.94)),
            Ok(Coordinate::new(60.17, 24.94)),
            Ok(Coordinate::new(60.18, 24.95)),
        ]));
        let surface = HeadlessSurface::new();
        let registry = surface.registry();
        let mut coordinator = MapCoordinator::new(
            CoordinatorConfig::default(),
            surface,
            sources(Some(geolocation)),
            Arc::new(ErrorReporter::log_only()),
        );

        coordinator.start(IconSet::empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.lock().fly_count(), 1);

        // Same coordinate again: no second recentre
        coordinator.window_activated();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.lock().fly_count(), 1);

        coordinator.window_activated();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let registry = registry.lock();
        assert_eq!(registry.fly_count(), 2);
        assert_eq!(registry.camera().unwrap().center, [24.95, 60.18]);
        assert_eq!(registry.layers_of_kind(LayerKind::CurrentLocation).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_position_reported_without_marker() {
        let geolocation = Arc::new(ScriptedGeolocation::new(vec![Err(
            GeolocationError::PermissionDenied,
        )]));
        let surface = HeadlessSurface::new();
        let registry = surface.registry();
        let reporter = Arc::new(ErrorReporter::log_only());
        let mut coordinator = MapCoordinator::new(
            CoordinatorConfig::default(),
            surface,
            sources(Some(geolocation)),
            Arc::clone(&reporter),
        );

        coordinator.start(IconSet::empty());
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(reporter.reported(), 1);
        assert!(!coordinator.sources().tracker.is_loading());
        let registry = registry.lock();
        assert!(registry.layers_of_kind(LayerKind::CurrentLocation).is_empty());
        assert_eq!(registry.fly_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_releases_surface() {
        let mut coordinator = MapCoordinator::new(
            CoordinatorConfig::default(),
            HeadlessSurface::new(),
            sources(None),
            Arc::new(ErrorReporter::log_only()),
        );
        coordinator.start(IconSet::empty());
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(coordinator.dispose().is_some());
        assert_eq!(coordinator.state(), MapState::Disposed);
        assert!(coordinator.dispose().is_none());

        // Starting a disposed coordinator does nothing
        coordinator.start(IconSet::empty());
        assert_eq!(coordinator.state(), MapState::Disposed);
    }
}
