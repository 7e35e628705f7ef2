//! Error types for the search engine and its collaborators.

use thiserror::Error;

/// A single provider query failed. Never fatal to a run.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// IO error talking to the provider.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider output could not be decoded.
    #[error("failed to decode provider output: {0}")]
    Decode(#[from] serde_json::Error),

    /// Provider process exited unsuccessfully.
    #[error("provider command failed: {0}")]
    Command(String),

    /// Provider did not answer in time.
    #[error("provider timed out after {0}ms")]
    Timeout(u64),

    /// Provider refused or could not serve the request.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors from delivering notifications or error reports.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failures that abort a run and are routed to the error report.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search profile cannot drive a run.
    #[error("invalid search profile: {0}")]
    InvalidProfile(String),

    /// Delivering the batch failed.
    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),
}
