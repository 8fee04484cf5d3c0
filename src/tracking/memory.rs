//! In-memory tracking backend
//!
//! [`MemoryBackend`] hands out [`MemorySession`]s that write straight into a
//! shared [`TrackingStore`]. Data is lost on process restart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{MetricRecord, RunRecord, RunStatus, TrackingStore};
use crate::session::{Observation, SessionFactory, SessionOptions, TrackingSession};
use crate::value::Value;
use crate::{Error, Result};

/// Session factory backed by an in-memory [`TrackingStore`].
///
/// Clones share the same store and run-hash sequence.
///
/// # Example
///
/// ```rust
/// use trueno_tune::session::{SessionFactory, SessionOptions, TrackingSession};
/// use trueno_tune::tracking::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// let mut session = backend.create("/repo", "exp", &SessionOptions::new())?;
/// session.close()?;
/// assert_eq!(backend.store().closed_run_count(), 1);
/// # Ok::<(), trueno_tune::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<TrackingStore>,
    next_run: Arc<AtomicU64>,
}

impl MemoryBackend {
    /// Create a backend with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the underlying store.
    #[must_use]
    pub fn store(&self) -> &TrackingStore {
        &self.store
    }
}

impl SessionFactory for MemoryBackend {
    type Session = MemorySession;

    fn create(&self, repo: &str, experiment: &str, options: &SessionOptions) -> Result<MemorySession> {
        let seq = self.next_run.fetch_add(1, Ordering::Relaxed);
        let run_hash = format!("run-{seq:06}");

        let mut run = RunRecord::new(&run_hash, repo, experiment);
        if !options.is_empty() {
            run.set_tag("session_options", serde_json::Value::Object(options.clone()));
        }
        self.store.add_run(run);

        Ok(MemorySession {
            run_hash,
            store: Arc::clone(&self.store),
            closed: false,
        })
    }
}

/// Session writing to a shared [`TrackingStore`].
#[derive(Debug)]
pub struct MemorySession {
    run_hash: String,
    store: Arc<TrackingStore>,
    closed: bool,
}

impl MemorySession {
    /// Whether the session has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Status of the backing run record, if it is still in the store.
    #[must_use]
    pub fn status(&self) -> Option<RunStatus> {
        self.store.get_run(&self.run_hash).map(|run| run.status())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::SessionClosed(self.run_hash.clone()));
        }
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut RunRecord)) -> Result<()> {
        if self.store.update_run(&self.run_hash, f) {
            Ok(())
        } else {
            Err(Error::Backend(format!("run `{}` missing from store", self.run_hash)))
        }
    }
}

impl TrackingSession for MemorySession {
    fn run_hash(&self) -> &str {
        &self.run_hash
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.ensure_open()?;
        let json = serde_json::to_value(&value)?;
        self.update(|run| run.set_tag(key, json))
    }

    fn observe(&mut self, observation: Observation) -> Result<()> {
        self.ensure_open()?;
        let context = observation
            .context
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let metric = MetricRecord::builder(
            &self.run_hash,
            observation.name,
            observation.step,
            observation.value,
        )
        .epoch(observation.epoch)
        .context(context)
        .build();
        self.store.add_metric(metric);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.update(RunRecord::close)?;
        self.closed = true;
        Ok(())
    }
}
