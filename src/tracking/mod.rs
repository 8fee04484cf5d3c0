//! In-memory tracking backend
//!
//! The storage side of the bridge: runs with key/value tags and per-run
//! metric time series.
//!
//! ## Schema Overview
//!
//! ```text
//! RunRecord (1) ──< MetricRecord (N) [time-series, keyed by name + step]
//!      │
//!      └── tags: hparams, trial_id, session_options
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_tune::session::{Observation, SessionFactory, SessionOptions, TrackingSession};
//! use trueno_tune::tracking::MemoryBackend;
//!
//! let backend = MemoryBackend::new();
//! let mut session = backend.create("/tmp/exp", "sweep", &SessionOptions::new())?;
//! session.observe(Observation {
//!     name: "ray/tune/loss".into(),
//!     value: 0.5,
//!     step: 1,
//!     epoch: None,
//!     context: None,
//! })?;
//! session.close()?;
//!
//! let loss = backend.store().get_metrics_for_run(session.run_hash(), "ray/tune/loss");
//! assert_eq!(loss.len(), 1);
//! # Ok::<(), trueno_tune::Error>(())
//! ```

mod memory;
mod metric_record;
mod run_record;
mod store;

pub use memory::{MemoryBackend, MemorySession};
pub use metric_record::{MetricRecord, MetricRecordBuilder};
pub use run_record::{RunRecord, RunStatus};
pub use store::TrackingStore;
