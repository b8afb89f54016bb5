//! Error types for Polytally
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while driving the simulator
#[derive(Debug, Error)]
pub enum PolytallyError {
    /// Run count input was not a non-negative integer
    #[error("Invalid run count: {0}")]
    InvalidRunCount(String),

    /// Simulation resource could not be acquired
    #[error("Simulator error: {0}")]
    Simulator(String),

    /// The external operation failed to produce a result
    #[error("Operation error: {0}")]
    Operation(String),

    /// The operation's output could not be read as a result tuple
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// Configuration is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Polytally operations
pub type Result<T> = std::result::Result<T, PolytallyError>;
