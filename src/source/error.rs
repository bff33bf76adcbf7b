//! Error types for snapshot retrieval.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong at the transport level without dictating
/// recovery strategy.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error type for retrieving observations, device lists and comparisons.
///
/// Every variant is a retrieval failure: one-shot commands report it and
/// exit, the watch loop logs it and keeps the previously loaded window.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The HTTP request could not be completed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The server answered with a non-2xx status.
    #[error("Server responded with {status}: {body}")]
    Status {
        /// The response status.
        status: http::StatusCode,
        /// The response body, lossily decoded.
        body: String,
    },

    /// The payload is not valid JSON or does not have the expected shape.
    #[error("Invalid payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// An export file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The blocking file task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
