//! Error reporting.
//!
//! Errors that would otherwise only be visible in the log are passed to an
//! [`ErrorReporter`]. The reporter always logs locally and, in production
//! mode, forwards the error to a [`ReportSink`].
//!
//! Nothing reported here is fatal: the session keeps running.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, warn};

/// A reported error, flattened for transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Component that observed the error (e.g. `station_feed`).
    pub context: String,
    pub message: String,
    /// Messages of the error's source chain, outermost first.
    pub causes: Vec<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ErrorReport {
    pub fn from_error(context: &str, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            context: context.to_string(),
            message: err.to_string(),
            causes,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Destination for production error reports.
pub trait ReportSink: Send + Sync {
    fn send(&self, report: &ErrorReport) -> std::io::Result<()>;
}

/// Appends reports as JSON lines to a file.
pub struct FileReportSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for FileReportSink {
    fn send(&self, report: &ErrorReport) -> std::io::Result<()> {
        let line = serde_json::to_string(report)?;

        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

/// Logs every error and forwards it to the sink in production.
pub struct ErrorReporter {
    production: bool,
    sink: Option<Arc<dyn ReportSink>>,
    reported: AtomicU64,
}

impl ErrorReporter {
    pub fn new(production: bool, sink: Option<Arc<dyn ReportSink>>) -> Self {
        Self {
            production,
            sink,
            reported: AtomicU64::new(0),
        }
    }

    /// Reporter that only logs.
    pub fn log_only() -> Self {
        Self::new(false, None)
    }

    /// Record an error observed by `context`.
    pub fn report(&self, context: &str, err: &(dyn std::error::Error + 'static)) {
        let report = ErrorReport::from_error(context, err);
        error!(context, error = %report.message, causes = ?report.causes, "ERR");
        self.reported.fetch_add(1, Ordering::Relaxed);

        if !self.production {
            return;
        }
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.send(&report) {
                warn!(error = %e, "Failed to forward error report");
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.production
    }

    /// Number of errors reported so far.
    pub fn reported(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::log_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SurfaceError;
    use crate::render::{LayerKind, RenderError};

    #[derive(Default)]
    struct CollectingSink {
        reports: Mutex<Vec<ErrorReport>>,
    }

    impl ReportSink for CollectingSink {
        fn send(&self, report: &ErrorReport) -> std::io::Result<()> {
            self.reports.lock().push(report.clone());
            Ok(())
        }
    }

    fn render_error() -> RenderError {
        RenderError::AddLayer {
            kind: LayerKind::AvailableStations,
            source: SurfaceError::NotReady,
        }
    }

    #[test]
    fn test_report_includes_cause_chain() {
        let err = render_error();
        let report = ErrorReport::from_error("renderer", &err);
        assert_eq!(report.context, "renderer");
        assert!(report.message.contains("available"));
        assert_eq!(report.causes, vec!["map surface is not ready".to_string()]);
    }

    #[test]
    fn test_development_mode_does_not_forward() {
        let sink = Arc::new(CollectingSink::default());
        let reporter = ErrorReporter::new(false, Some(sink.clone()));

        reporter.report("renderer", &render_error());
        assert_eq!(reporter.reported(), 1);
        assert!(sink.reports.lock().is_empty());
    }

    #[test]
    fn test_production_mode_forwards() {
        let sink = Arc::new(CollectingSink::default());
        let reporter = ErrorReporter::new(true, Some(sink.clone()));

        reporter.report("renderer", &render_error());
        assert_eq!(sink.reports.lock().len(), 1);
    }

    #[test]
    fn test_file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileReportSink::new(dir.path().join("reports").join("errors.jsonl"));
        let report = ErrorReport::from_error("renderer", &render_error());

        sink.send(&report).unwrap();
        sink.send(&report).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["context"], "renderer");
    }
}
