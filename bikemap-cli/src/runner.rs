//! Shared setup for commands that talk to the network or open a session.

use bikemap::config::ConfigFile;
use bikemap::log::{init_logging, LoggingConfig, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Loads configuration, installs logging and owns the Tokio runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Create a runner; `log_level` overrides the configured level.
    pub fn new(log_level: Option<&str>) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging = init_logging(&LoggingConfig {
            level: log_level
                .map(str::to_string)
                .unwrap_or_else(|| config.logging.level.clone()),
            directory: Some(config.logging.directory.clone()),
        })?;

        let runtime = Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Log the command being run along with the version.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = bikemap::VERSION,
            config = %bikemap::config::config_file_path().display(),
            "BikeMap CLI starting"
        );
    }
}
