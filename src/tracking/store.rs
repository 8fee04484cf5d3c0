//! Tracking Store - in-memory storage for runs and metric series
//!
//! Backed by `DashMap` so a store handle can be shared between the sessions
//! writing to it and whoever inspects it.

use dashmap::DashMap;

use super::{MetricRecord, RunRecord, RunStatus};

/// In-memory store for tracked runs and their metric points.
///
/// ## Design
///
/// Runs are keyed by run hash. Metric points are grouped per run hash, in
/// insertion order; [`TrackingStore::get_metrics_for_run`] sorts by step.
#[derive(Debug, Default)]
pub struct TrackingStore {
    runs: DashMap<String, RunRecord>,
    metrics: DashMap<String, Vec<MetricRecord>>,
}

impl TrackingStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty (no runs and no metrics).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.metrics.is_empty()
    }

    /// Get the number of runs in the store.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Get the number of closed runs.
    #[must_use]
    pub fn closed_run_count(&self) -> usize {
        self.runs
            .iter()
            .filter(|run| run.status() == RunStatus::Closed)
            .count()
    }

    /// Get the total number of metric points across all runs.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.iter().map(|points| points.len()).sum()
    }

    /// Add (or replace) a run.
    pub fn add_run(&self, run: RunRecord) {
        self.runs.insert(run.run_hash().to_string(), run);
    }

    /// Get a snapshot of a run by hash.
    #[must_use]
    pub fn get_run(&self, run_hash: &str) -> Option<RunRecord> {
        self.runs.get(run_hash).map(|run| run.value().clone())
    }

    /// Apply `f` to a stored run. Returns `false` if the run is unknown.
    pub fn update_run(&self, run_hash: &str, f: impl FnOnce(&mut RunRecord)) -> bool {
        self.runs.get_mut(run_hash).map(|mut run| f(&mut *run)).is_some()
    }

    /// Get snapshots of all runs in an experiment.
    #[must_use]
    pub fn get_runs_for_experiment(&self, experiment: &str) -> Vec<RunRecord> {
        self.runs
            .iter()
            .filter(|run| run.experiment() == experiment)
            .map(|run| run.value().clone())
            .collect()
    }

    /// Add a metric point.
    pub fn add_metric(&self, metric: MetricRecord) {
        self.metrics
            .entry(metric.run_hash().to_string())
            .or_default()
            .push(metric);
    }

    /// Get every metric point of a run, in insertion order.
    #[must_use]
    pub fn metrics_for_run(&self, run_hash: &str) -> Vec<MetricRecord> {
        self.metrics
            .get(run_hash)
            .map(|points| points.value().clone())
            .unwrap_or_default()
    }

    /// Get one metric series of a run, ordered by step.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use trueno_tune::tracking::{MetricRecord, TrackingStore};
    ///
    /// let store = TrackingStore::new();
    /// for step in 0..100 {
    ///     let loss = 1.0 / (step as f64 + 1.0);
    ///     store.add_metric(MetricRecord::new("run-001", "ray/tune/loss", step, loss));
    /// }
    ///
    /// let loss = store.get_metrics_for_run("run-001", "ray/tune/loss");
    /// assert_eq!(loss.len(), 100);
    /// ```
    #[must_use]
    pub fn get_metrics_for_run(&self, run_hash: &str, name: &str) -> Vec<MetricRecord> {
        let mut metrics: Vec<MetricRecord> = self
            .metrics_for_run(run_hash)
            .into_iter()
            .filter(|m| m.name() == name)
            .collect();

        // Sort by step for time-series ordering
        metrics.sort_by_key(MetricRecord::step);

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_default() {
        let store = TrackingStore::new();
        assert!(store.is_empty());
        assert_eq!(store.run_count(), 0);
        assert_eq!(store.metric_count(), 0);
    }

    #[test]
    fn test_store_add_and_get() {
        let store = TrackingStore::new();
        store.add_run(RunRecord::new("run-1", "/repo", "exp"));
        store.add_metric(MetricRecord::new("run-1", "loss", 0, 0.5));

        assert!(!store.is_empty());
        assert!(store.get_run("run-1").is_some());
        assert!(store.get_run("run-2").is_none());
        assert_eq!(store.get_runs_for_experiment("exp").len(), 1);
        assert_eq!(store.metric_count(), 1);
    }

    #[test]
    fn test_update_run() {
        let store = TrackingStore::new();
        store.add_run(RunRecord::new("run-1", "/repo", "exp"));

        assert!(store.update_run("run-1", RunRecord::close));
        assert!(!store.update_run("missing", RunRecord::close));
        assert_eq!(store.closed_run_count(), 1);
    }

    #[test]
    fn test_get_metrics_for_run_ordering() {
        let store = TrackingStore::new();

        // Add out of order
        store.add_metric(MetricRecord::new("run-1", "loss", 2, 0.2));
        store.add_metric(MetricRecord::new("run-1", "loss", 0, 0.0));
        store.add_metric(MetricRecord::new("run-1", "acc", 1, 0.7));
        store.add_metric(MetricRecord::new("run-1", "loss", 1, 0.1));

        let metrics = store.get_metrics_for_run("run-1", "loss");

        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[0].step(), 0);
        assert_eq!(metrics[1].step(), 1);
        assert_eq!(metrics[2].step(), 2);
    }
}
