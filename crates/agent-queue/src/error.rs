//! Error types for agent-queue

use thiserror::Error;

/// Result type alias for agent-queue
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for queue operations
///
/// Scheduling errors surface synchronously to the caller; this layer never
/// retries silently. Retry policy belongs to the broker, driven by the
/// `retries` field on the message.
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduling failed before reaching a backend
    #[error("scheduling failed: {0}")]
    Scheduling(String),

    /// The broker request could not be performed
    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The broker answered with a non-success status
    #[error("broker rejected request: status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Serialization failure at the wire boundary
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure propagated from the execution core
    #[error(transparent)]
    Core(#[from] agent_core::Error),
}
