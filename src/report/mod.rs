//! Result reporting to a streaming ingestion endpoint
//!
//! One fixed-shape [`ResultRecord`] per test result, pushed through a
//! [`DeliveryStream`]. Delivery is best effort: a failed push is retried once
//! without the (potentially huge) prometheus metrics, and a second failure is
//! logged, never raised.

mod record;

pub use record::{ResultRecord, TestInfo, TestResult, RESULT_TABLE};

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::Result;

/// Default stream results are delivered to.
pub const DEFAULT_STREAM: &str = "ray-ci-results";

/// Transport to a streaming ingestion endpoint.
pub trait DeliveryStream {
    /// Push one serialized record to `stream`.
    ///
    /// # Errors
    ///
    /// Any delivery failure.
    fn put_record(&self, stream: &str, data: &[u8]) -> Result<()>;
}

/// Appends each record as one JSON line to `<dir>/<stream>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesStream {
    dir: PathBuf,
}

impl JsonLinesStream {
    /// Write streams under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `stream`.
    #[must_use]
    pub fn path(&self, stream: &str) -> PathBuf {
        self.dir.join(format!("{stream}.jsonl"))
    }
}

impl DeliveryStream for JsonLinesStream {
    fn put_record(&self, stream: &str, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(stream))?;
        file.write_all(data)?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

/// How a report ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Delivered in full on the first attempt.
    Delivered,
    /// Delivered on retry, without prometheus metrics.
    DeliveredWithoutMetrics,
    /// Both attempts failed; the failure was logged.
    Failed,
}

/// Pushes test results to a [`DeliveryStream`].
#[derive(Debug)]
pub struct ResultReporter<D: DeliveryStream> {
    stream: D,
    stream_name: String,
}

impl<D: DeliveryStream> ResultReporter<D> {
    /// Create a reporter for [`DEFAULT_STREAM`].
    #[must_use]
    pub fn new(stream: D) -> Self {
        Self {
            stream,
            stream_name: DEFAULT_STREAM.to_string(),
        }
    }

    /// Deliver to a different stream.
    #[must_use]
    pub fn stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = name.into();
        self
    }

    /// Get the transport.
    #[must_use]
    pub const fn stream(&self) -> &D {
        &self.stream
    }

    /// Report one test result. Never fails; see [`DeliveryOutcome`].
    pub fn report_result(&self, test: &TestInfo, result: &TestResult) -> DeliveryOutcome {
        info!(test = %test.name, stream = %self.stream_name, "Persisting result");
        let mut record = ResultRecord::new(test, result);

        match self.push(&record) {
            Ok(()) => {
                info!(test = %test.name, "Result has been persisted");
                return DeliveryOutcome::Delivered;
            }
            Err(err) => {
                warn!(
                    test = %test.name,
                    error = %err,
                    "Couldn't persist with prometheus_metrics, trying without them"
                );
            }
        }

        record.drop_prometheus_metrics();
        match self.push(&record) {
            Ok(()) => {
                info!(test = %test.name, "Result has been persisted without prometheus_metrics");
                DeliveryOutcome::DeliveredWithoutMetrics
            }
            Err(err) => {
                error!(test = %test.name, error = %err, "Failed to persist result");
                DeliveryOutcome::Failed
            }
        }
    }

    fn push(&self, record: &ResultRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        debug!(json = %json, "Result json");
        self.stream.put_record(&self.stream_name, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use std::sync::Mutex;

    /// Fails the first `failures` pushes, then records payloads.
    struct FlakyStream {
        failures: Mutex<usize>,
        delivered: Mutex<Vec<(String, serde_json::Value)>>,
        attempts: Mutex<usize>,
    }

    impl FlakyStream {
        fn new(failures: usize) -> Self {
            Self {
                failures: Mutex::new(failures),
                delivered: Mutex::new(Vec::new()),
                attempts: Mutex::new(0),
            }
        }
    }

    impl DeliveryStream for FlakyStream {
        fn put_record(&self, stream: &str, data: &[u8]) -> Result<()> {
            *self.attempts.lock().unwrap() += 1;
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Delivery("record too large".into()));
            }
            let row = serde_json::from_slice(data)?;
            self.delivered.lock().unwrap().push((stream.to_string(), row));
            Ok(())
        }
    }

    fn result() -> TestResult {
        TestResult {
            status: Some("success".into()),
            prometheus_metrics: Some(json!({"cpu": [0.5, 0.7]})),
            ..TestResult::default()
        }
    }

    fn test_info() -> TestInfo {
        TestInfo {
            name: "tune_scalability".into(),
            team: "ml".into(),
            ..TestInfo::default()
        }
    }

    #[test]
    fn test_delivered_first_try() {
        let reporter = ResultReporter::new(FlakyStream::new(0));
        assert_eq!(reporter.report_result(&test_info(), &result()), DeliveryOutcome::Delivered);

        let delivered = reporter.stream().delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, DEFAULT_STREAM);
        assert_eq!(delivered[0].1["name"], json!("tune_scalability"));
        assert_eq!(delivered[0].1["prometheus_metrics"], json!({"cpu": [0.5, 0.7]}));
    }

    #[test]
    fn test_retry_drops_prometheus_metrics() {
        let reporter = ResultReporter::new(FlakyStream::new(1)).stream_name("results");
        assert_eq!(
            reporter.report_result(&test_info(), &result()),
            DeliveryOutcome::DeliveredWithoutMetrics
        );

        let stream = reporter.stream();
        assert_eq!(*stream.attempts.lock().unwrap(), 2);
        let delivered = stream.delivered.lock().unwrap();
        assert_eq!(delivered[0].0, "results");
        assert!(delivered[0].1.get("prometheus_metrics").is_none());
        assert_eq!(delivered[0].1["status"], json!("success"));
    }

    #[test]
    fn test_second_failure_is_swallowed() {
        let reporter = ResultReporter::new(FlakyStream::new(5));
        assert_eq!(reporter.report_result(&test_info(), &result()), DeliveryOutcome::Failed);
        assert_eq!(*reporter.stream().attempts.lock().unwrap(), 2);
        assert!(reporter.stream().delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn test_push_sends_the_logged_json() {
        let reporter = ResultReporter::new(FlakyStream::new(0));
        let record = ResultRecord::with_timestamp(&test_info(), &result(), 7);
        reporter.push(&record).unwrap();

        let delivered = reporter.stream().delivered.lock().unwrap();
        assert_eq!(delivered[0].1, serde_json::to_value(&record).unwrap());
    }

    #[test]
    fn test_json_lines_stream_appends() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ResultReporter::new(JsonLinesStream::new(dir.path()));
        reporter.report_result(&test_info(), &result());
        reporter.report_result(&test_info(), &result());

        let path = reporter.stream().path(DEFAULT_STREAM);
        let contents = std::fs::read_to_string(path).unwrap();
        let rows: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["_table"], json!(RESULT_TABLE));
    }
}
