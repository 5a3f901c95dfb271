//! Application bootstrap implementation.
//!
//! This module contains `BikeMapApp` which wires the station feed, position
//! tracker, refresh trigger, notice and error reporter into a
//! [`MapCoordinator`] and starts it.

use std::sync::Arc;

use tracing::info;

use super::config::{AppConfig, ReportingAppConfig};
use super::error::AppError;
use crate::map::{IconSet, MapCoordinator, MapSources, MapState, MapSurface};
use crate::notice::{FlagStore, IniFlagStore, InfoNotice};
use crate::position::{FixedGeolocation, Geolocation, PositionTracker};
use crate::refresh::RefreshTrigger;
use crate::report::{ErrorReporter, FileReportSink, ReportSink};
use crate::station::{HttpClient, ReqwestClient, StationFeed};

/// A running BikeMap session.
///
/// Startup order:
/// 1. Error reporter (so every later failure has somewhere to go)
/// 2. Station feed, position tracker and refresh trigger
/// 3. Marker icons
/// 4. Map coordinator, which loads the surface and subscribes once ready
///
/// # Example
///
/// ```ignore
/// use bikemap::app::{AppConfig, BikeMapApp};
/// use bikemap::map::HeadlessSurface;
///
/// let app = BikeMapApp::start(AppConfig::default(), HeadlessSurface::new())?;
///
/// // Host window regained focus
/// app.window_activated();
///
/// // Later: tear down
/// app.shutdown();
/// ```
pub struct BikeMapApp<S: MapSurface + 'static> {
    coordinator: MapCoordinator<S>,
    notice: Arc<InfoNotice>,
    reporter: Arc<ErrorReporter>,
    config: AppConfig,
}

impl<S: MapSurface + 'static> BikeMapApp<S> {
    /// Start a session fetching stations over HTTP.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the
    /// configured position is out of range.
    pub fn start(config: AppConfig, surface: S) -> Result<Self, AppError> {
        let client = ReqwestClient::with_timeout(config.http_timeout_secs)?;
        Self::start_with_client(config, surface, Arc::new(client))
    }

    /// Start a session with a custom HTTP client.
    pub fn start_with_client(
        config: AppConfig,
        surface: S,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, AppError> {
        if let Some(position) = config.position {
            if !position.is_valid() {
                return Err(AppError::InvalidSetting(format!(
                    "position {} is out of range",
                    position
                )));
            }
        }

        let reporter = Arc::new(build_reporter(&config.reporting));

        let geolocation = config
            .position
            .map(|position| Arc::new(FixedGeolocation::new(position)) as Arc<dyn Geolocation>);
        let sources = MapSources {
            feed: Arc::new(StationFeed::new(client, config.feed_url.clone())),
            tracker: Arc::new(PositionTracker::from_option(geolocation)),
            trigger: Arc::new(RefreshTrigger::new()),
        };

        let flag_store = config
            .flag_file
            .clone()
            .map(|path| Arc::new(IniFlagStore::new(path)) as Arc<dyn FlagStore>);
        let notice = Arc::new(InfoNotice::new(flag_store).with_delay(config.notice_delay));

        let icons = IconSet::load(&config.icon_dir);

        let mut coordinator = MapCoordinator::new(
            config.coordinator.clone(),
            surface,
            sources,
            Arc::clone(&reporter),
        );
        coordinator.start(icons);

        info!(
            feed_url = %config.feed_url,
            geolocation = config.position.is_some(),
            production = reporter.is_production(),
            "BikeMap session started"
        );

        Ok(Self {
            coordinator,
            notice,
            reporter,
            config,
        })
    }

    /// Host window was loaded or regained focus.
    pub fn window_activated(&self) {
        self.coordinator.window_activated();
    }

    pub fn coordinator(&self) -> &MapCoordinator<S> {
        &self.coordinator
    }

    pub fn sources(&self) -> &MapSources {
        self.coordinator.sources()
    }

    pub fn notice(&self) -> Arc<InfoNotice> {
        Arc::clone(&self.notice)
    }

    pub fn reporter(&self) -> Arc<ErrorReporter> {
        Arc::clone(&self.reporter)
    }

    pub fn state(&self) -> MapState {
        self.coordinator.state()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Tear down the session and return the surface.
    pub fn shutdown(mut self) -> Option<S> {
        info!("Shutting down BikeMap session");
        self.coordinator.dispose()
    }
}

fn build_reporter(config: &ReportingAppConfig) -> ErrorReporter {
    let sink = config
        .report_file
        .clone()
        .map(|path| Arc::new(FileReportSink::new(path)) as Arc<dyn ReportSink>);
    ErrorReporter::new(config.production, sink)
}
