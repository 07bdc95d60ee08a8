//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// A tool handler failed or rejected
    #[error("tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The decision function failed while producing the next instruction
    #[error("decision failed: {0}")]
    DecisionFailed(String),

    /// The run is paused and the caller advanced it without a resume value
    #[error("run is paused: a resume value is required before the next event")]
    ResumeRequired,

    /// Attempted to move a terminal state (`done`/`error`) back into another status
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Optimistic concurrency check failed when persisting state
    #[error("stale agent state for operation '{operation_id}': expected version {expected}, found {found}")]
    StaleState {
        operation_id: String,
        expected: u64,
        found: u64,
    },

    /// Serialization failure at a protocol boundary
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
