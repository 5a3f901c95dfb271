//! CLI error type.

use std::fmt;

use bikemap::app::AppError;
use bikemap::config::ConfigError;
use bikemap::log::LoggingError;
use bikemap::notice::NoticeError;
use bikemap::station::FeedError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or settings.
    Config(String),

    /// Configuration file could not be read or written.
    ConfigFile(ConfigError),

    /// Logging could not be installed.
    Logging(LoggingError),

    /// Failed to create the Tokio runtime.
    Runtime(String),

    /// Session failed to start.
    App(AppError),

    /// Station fetch failed.
    Feed(FeedError),

    /// Notice flag store failure.
    Notice(NoticeError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Feed(e) => write!(f, "Failed to fetch stations: {}", e),
            CliError::Notice(e) => write!(f, "Notice error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Feed(e) => Some(e),
            CliError::Notice(e) => Some(e),
            CliError::Config(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        CliError::Feed(e)
    }
}

impl From<NoticeError> for CliError {
    fn from(e: NoticeError) -> Self {
        CliError::Notice(e)
    }
}
