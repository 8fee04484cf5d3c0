//! Error types for trueno-tune
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-tune error types
#[derive(Error, Debug)]
pub enum Error {
    /// Neither `timesteps_total` nor `training_iteration` was reported
    #[error("Result has no step field: expected `timesteps_total` or `training_iteration`")]
    MissingStepField,

    /// A bookkeeping field was present but had an unusable value
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending result field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// No session is registered for the trial (start never called?)
    #[error("No tracking session for trial `{0}`\nWas the trial started before reporting results?")]
    SessionNotFound(String),

    /// Operation attempted on a session that has already been closed
    #[error("Tracking session `{0}` is closed")]
    SessionClosed(String),

    /// A mapping key already contains the flattening delimiter
    #[error("Key `{key}` contains the delimiter `{delimiter}`")]
    DelimiterInKey {
        /// The offending key
        key: String,
        /// The delimiter used for flattening
        delimiter: String,
    },

    /// Array data length does not match its declared shape
    #[error("Array shape {shape:?} expects {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Declared shape
        shape: Vec<usize>,
        /// Element count implied by the shape
        expected: usize,
        /// Element count supplied
        actual: usize,
    },

    /// Callback configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tracking backend call failed
    #[error("Tracking backend error: {0}")]
    Backend(String),

    /// Streaming ingestion delivery failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
