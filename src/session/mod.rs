//! Tracking sessions and the trial-to-session registry
//!
//! A [`TrackingSession`] is a backend-side recording context that accumulates
//! tagged metadata and time-indexed metric observations. Sessions are made by
//! a [`SessionFactory`] and owned by the [`TrialRunRegistry`] from creation
//! until they are closed.
//!
//! ```text
//! Trial ──(BindingPolicy)──> TrialRunRegistry ──> TrackingSession ──> backend
//! ```

mod registry;

pub use registry::{BindingPolicy, TrialRunRegistry, HPARAMS_TAG, TRIAL_ID_TAG};

use serde::Serialize;

use crate::value::{Mapping, Value};
use crate::Result;

/// Pass-through options for the session factory. Opaque to this crate.
pub type SessionOptions = serde_json::Map<String, serde_json::Value>;

/// A single metric point appended to a session's time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Fully qualified metric name, e.g. `ray/tune/loss`.
    pub name: String,
    /// Metric value.
    pub value: f64,
    /// Step the value was reported at.
    pub step: u64,
    /// Optional epoch.
    pub epoch: Option<u64>,
    /// Optional context used to tell series apart.
    pub context: Option<Mapping>,
}

/// Backend-side recording context.
pub trait TrackingSession {
    /// Stable identity of the session.
    fn run_hash(&self) -> &str;

    /// Attach a key/value tag (e.g. the hyperparameter snapshot).
    ///
    /// # Errors
    ///
    /// Backend failures propagate.
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Append a metric point.
    ///
    /// # Errors
    ///
    /// Backend failures propagate.
    fn observe(&mut self, observation: Observation) -> Result<()>;

    /// Close the session and release backend resources. Idempotent.
    ///
    /// # Errors
    ///
    /// Backend failures propagate.
    fn close(&mut self) -> Result<()>;
}

/// Creates sessions bound to a repository and a grouping label.
pub trait SessionFactory {
    /// Session type produced by this factory.
    type Session: TrackingSession;

    /// Create a session.
    ///
    /// # Errors
    ///
    /// Backend failures propagate.
    fn create(
        &self,
        repo: &str,
        experiment: &str,
        options: &SessionOptions,
    ) -> Result<Self::Session>;
}
