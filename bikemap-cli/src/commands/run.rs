//! Run command - open a headless map session.
//!
//! The session prints layer and viewport changes as they happen. Pressing
//! Enter stands in for the browser window regaining focus, which refreshes
//! stations and re-reads the position.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use bikemap::app::{AppConfig, BikeMapApp};
use bikemap::map::MapState;
use bikemap::position::PositionTracker;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::common::{resolve_feed_url, resolve_position};
use crate::error::CliError;
use crate::presenter::{is_acknowledgement, TerminalNoticePresenter};
use crate::runner::CliRunner;
use crate::surface::TerminalSurface;

/// Arguments for the run command.
pub struct RunArgs {
    pub feed_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub refocus_every: Option<u64>,
    pub production: bool,
    pub log_level: Option<String>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.log_level.as_deref())?;
    runner.log_startup("run");
    let config = runner.config();

    let position = resolve_position(args.latitude, args.longitude, config)?;
    let mut app_config = AppConfig::from_config_file(config)
        .with_feed_url(resolve_feed_url(args.feed_url, config))
        .with_position(position);
    if args.production {
        app_config.reporting.production = true;
    }
    let refocus_every = args
        .refocus_every
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    println!("BikeMap v{}", bikemap::VERSION);
    println!("==========");
    println!();
    println!("Stations:   {}", app_config.feed_url);
    match position {
        Some(position) => println!("Position:   {}", position),
        None => println!("Position:   (geolocation unavailable)"),
    }
    if let Some(interval) = refocus_every {
        println!("Refocus:    every {}s", interval.as_secs());
    }
    println!();
    println!("Press Enter to refresh, Ctrl+C to exit");
    println!();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, closing map...");
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let summary = runner
        .runtime()
        .block_on(run_session(app_config, refocus_every, shutdown))?;

    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Station requests: {}", summary.requests);
    println!("  Errors reported:  {}", summary.errors);
    println!("  Layers on map:    {}", summary.layers);

    Ok(())
}

struct SessionSummary {
    requests: u64,
    errors: u64,
    layers: usize,
}

async fn run_session(
    config: AppConfig,
    refocus_every: Option<Duration>,
    shutdown: CancellationToken,
) -> Result<SessionSummary, CliError> {
    let surface = TerminalSurface::new();
    let registry = surface.registry();
    let app = BikeMapApp::start(config, surface)?;

    let notice = app.notice();
    let notice_shutdown = shutdown.clone();
    tokio::spawn(async move {
        notice.open(&TerminalNoticePresenter, notice_shutdown).await;
    });

    tokio::spawn(show_locating(
        Arc::clone(&app.sources().tracker),
        shutdown.clone(),
    ));

    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let mut refocus = refocus_every.map(|period| {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    });
    let mut state = app.coordinator().subscribe_state();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            line = lines.recv(), if stdin_open => match line {
                Some(line) if is_acknowledgement(&line) => {
                    app.notice().dismiss();
                    println!("{}", style("Notice dismissed").dim());
                }
                Some(_) => {
                    debug!("Refocus requested from terminal");
                    app.window_activated();
                }
                // stdin closed; keep running until Ctrl+C
                None => stdin_open = false,
            },

            _ = tick(&mut refocus) => {
                debug!("Periodic refocus");
                app.window_activated();
            }

            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                if current == MapState::Active {
                    println!("{}", style("Map ready").green());
                }
            }
        }
    }

    let summary = SessionSummary {
        requests: app.sources().feed.requests_issued(),
        errors: app.reporter().reported(),
        layers: registry.lock().layers().len(),
    };
    app.shutdown();
    info!("Session closed");

    Ok(summary)
}

/// Forward stdin lines from a blocking reader thread.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Show a spinner while a position request is outstanding.
async fn show_locating(tracker: Arc<PositionTracker>, shutdown: CancellationToken) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Locating...");
    let mut visible = false;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }

        match (tracker.is_loading(), visible) {
            (true, false) => {
                spinner.reset();
                spinner.enable_steady_tick(Duration::from_millis(100));
                visible = true;
            }
            (false, true) => {
                spinner.disable_steady_tick();
                spinner.finish_and_clear();
                visible = false;
            }
            _ => {}
        }
    }

    spinner.finish_and_clear();
}
