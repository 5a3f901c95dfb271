//! Station feed errors.

use thiserror::Error;

/// Errors surfaced to station feed consumers.
///
/// The error is `Clone` because one fetch result is shared by every
/// concurrent consumer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request failed before a response was received.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body was not a valid station list.
    #[error("invalid station data: {0}")]
    Decode(String),
}
