//! Metric Record - one point of a run's metric time series

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metric Record represents a single tracked observation.
///
/// ## Time-Series Layout
///
/// Points are keyed by:
/// - `run_hash` + `name` identifying the series
/// - `step` as the sort key
/// - `context` distinguishing series that share a name (e.g. trials in a
///   shared session)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    run_hash: String,
    name: String,
    step: u64,
    epoch: Option<u64>,
    value: f64,
    context: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Create a new metric record with no epoch or context.
    #[must_use]
    pub fn new(run_hash: impl Into<String>, name: impl Into<String>, step: u64, value: f64) -> Self {
        Self::builder(run_hash, name, step, value).build()
    }

    /// Create a builder for constructing a metric record with optional fields.
    #[must_use]
    pub fn builder(
        run_hash: impl Into<String>,
        name: impl Into<String>,
        step: u64,
        value: f64,
    ) -> MetricRecordBuilder {
        MetricRecordBuilder::new(run_hash, name, step, value)
    }

    /// Get the run hash.
    #[must_use]
    pub fn run_hash(&self) -> &str {
        &self.run_hash
    }

    /// Get the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the step.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Get the epoch, if reported.
    #[must_use]
    pub const fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the context, if reported.
    #[must_use]
    pub const fn context(&self) -> Option<&serde_json::Value> {
        self.context.as_ref()
    }

    /// Get the timestamp when the point was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for `MetricRecord`.
#[derive(Debug)]
pub struct MetricRecordBuilder {
    run_hash: String,
    name: String,
    step: u64,
    epoch: Option<u64>,
    value: f64,
    context: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl MetricRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(run_hash: impl Into<String>, name: impl Into<String>, step: u64, value: f64) -> Self {
        Self {
            run_hash: run_hash.into(),
            name: name.into(),
            step,
            epoch: None,
            value,
            context: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the epoch.
    #[must_use]
    pub const fn epoch(mut self, epoch: Option<u64>) -> Self {
        self.epoch = epoch;
        self
    }

    /// Set the context.
    #[must_use]
    pub fn context(mut self, context: Option<serde_json::Value>) -> Self {
        self.context = context;
        self
    }

    /// Build the `MetricRecord`.
    #[must_use]
    pub fn build(self) -> MetricRecord {
        MetricRecord {
            run_hash: self.run_hash,
            name: self.name,
            step: self.step,
            epoch: self.epoch,
            value: self.value,
            context: self.context,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_record_new() {
        let metric = MetricRecord::new("run-1", "ray/tune/loss", 0, 0.5);
        assert_eq!(metric.run_hash(), "run-1");
        assert_eq!(metric.name(), "ray/tune/loss");
        assert_eq!(metric.step(), 0);
        assert!(metric.epoch().is_none());
        assert!(metric.context().is_none());
        assert!((metric.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metric_record_builder() {
        let context = serde_json::json!({"trial": "t-1"});
        let metric = MetricRecord::builder("run-1", "acc", 3, 0.9)
            .epoch(Some(1))
            .context(Some(context.clone()))
            .build();
        assert_eq!(metric.epoch(), Some(1));
        assert_eq!(metric.context(), Some(&context));
    }
}
