//! Run Record - one tracking session as seen by the store

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a tracked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Session is accepting tags and observations.
    Running,
    /// Session was closed; no further writes are accepted.
    Closed,
}

/// Run Record represents a single tracking session.
///
/// A run is bound to a repository and an experiment label when it is
/// created. Tags (hyperparameters, trial id) are stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    run_hash: String,
    repo: String,
    experiment: String,
    status: RunStatus,
    tags: BTreeMap<String, serde_json::Value>,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Create a new run record in Running status.
    ///
    /// # Arguments
    ///
    /// * `run_hash` - Unique identifier for the run
    /// * `repo` - Repository location the run is stored in
    /// * `experiment` - Grouping label
    #[must_use]
    pub fn new(
        run_hash: impl Into<String>,
        repo: impl Into<String>,
        experiment: impl Into<String>,
    ) -> Self {
        Self {
            run_hash: run_hash.into(),
            repo: repo.into(),
            experiment: experiment.into(),
            status: RunStatus::Running,
            tags: BTreeMap::new(),
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    /// Get the run hash.
    #[must_use]
    pub fn run_hash(&self) -> &str {
        &self.run_hash
    }

    /// Get the repository location.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the experiment label.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&serde_json::Value> {
        self.tags.get(key)
    }

    /// Get all tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.tags
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the close timestamp, if the run was closed.
    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Set (or overwrite) a tag.
    pub fn set_tag(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.tags.insert(key.into(), value);
    }

    /// Close the run. Closing twice keeps the first timestamp.
    pub fn close(&mut self) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Closed;
            self.closed_at = Some(Utc::now());
        }
    }
}
