//! Result Record - the fixed-shape row pushed to the ingestion stream

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Table every result row is written to.
pub const RESULT_TABLE: &str = "release_test_result";

/// Descriptive fields of the test that produced a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestInfo {
    /// Test name
    pub name: String,
    /// Test group
    pub group: String,
    /// Owning team
    pub team: String,
    /// Scheduling frequency (e.g. `nightly`)
    pub frequency: String,
}

/// Outcome of one test run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResult {
    /// Final status (`success`, `error`, ...)
    pub status: Option<String>,
    /// Test-specific result payload
    pub results: Option<serde_json::Value>,
    /// Cluster URL
    pub cluster_url: Option<String>,
    /// Cluster id
    pub cluster_id: Option<String>,
    /// Wheels URL
    pub wheels_url: Option<String>,
    /// CI build URL
    pub buildkite_url: Option<String>,
    /// CI job id
    pub buildkite_job_id: Option<String>,
    /// Runtime in seconds
    pub runtime: Option<f64>,
    /// Whether the test is considered stable
    pub stable: bool,
    /// Process return code
    pub return_code: i32,
    /// Whether this was a smoke test
    pub smoke_test: bool,
    /// Scraped metrics; can be large
    pub prometheus_metrics: Option<serde_json::Value>,
    /// Free-form tags
    pub extra_tags: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Serialized form of a result, one row of [`RESULT_TABLE`].
///
/// Missing optional values are replaced by empty strings/objects (or `-1.0`
/// for runtime) so every row has the same shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "_table")]
    table: &'static str,
    report_timestamp_ms: i64,
    status: String,
    results: serde_json::Value,
    name: String,
    group: String,
    team: String,
    frequency: String,
    cluster_url: String,
    cluster_id: String,
    wheel_url: String,
    buildkite_url: String,
    buildkite_job_id: String,
    runtime: f64,
    stable: bool,
    return_code: i32,
    smoke_test: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prometheus_metrics: Option<serde_json::Value>,
    extra_tags: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ResultRecord {
    /// Build the row for `result`, stamped with the current time.
    #[must_use]
    pub fn new(test: &TestInfo, result: &TestResult) -> Self {
        Self::with_timestamp(test, result, Utc::now().timestamp_millis())
    }

    /// Build the row with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(test: &TestInfo, result: &TestResult, report_timestamp_ms: i64) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            table: RESULT_TABLE,
            report_timestamp_ms,
            status: text(&result.status),
            results: result.results.clone().unwrap_or_else(empty_object),
            name: test.name.clone(),
            group: test.group.clone(),
            team: test.team.clone(),
            frequency: test.frequency.clone(),
            cluster_url: text(&result.cluster_url),
            cluster_id: text(&result.cluster_id),
            wheel_url: text(&result.wheels_url),
            buildkite_url: text(&result.buildkite_url),
            buildkite_job_id: text(&result.buildkite_job_id),
            runtime: result.runtime.unwrap_or(-1.0),
            stable: result.stable,
            return_code: result.return_code,
            smoke_test: result.smoke_test,
            prometheus_metrics: Some(
                result
                    .prometheus_metrics
                    .clone()
                    .unwrap_or_else(empty_object),
            ),
            extra_tags: result
                .extra_tags
                .clone()
                .map_or_else(empty_object, serde_json::Value::Object),
        }
    }

    /// Get the report timestamp in milliseconds.
    #[must_use]
    pub const fn report_timestamp_ms(&self) -> i64 {
        self.report_timestamp_ms
    }

    /// Whether the row still carries prometheus metrics.
    #[must_use]
    pub const fn has_prometheus_metrics(&self) -> bool {
        self.prometheus_metrics.is_some()
    }

    /// Drop the prometheus metrics, the bulkiest field.
    pub fn drop_prometheus_metrics(&mut self) {
        self.prometheus_metrics = None;
    }
}
