//! Trial Lifecycle Callback
//!
//! The orchestrator-facing entry point. Each lifecycle event is routed
//! through the sanitation pipeline and the [`TrialRunRegistry`]:
//!
//! ```text
//! start  ──> registry.on_trial_start (session + hparams snapshot)
//! result ──> copy → step → strip bookkeeping → flatten → classify → observe
//! end    ──> registry.on_trial_end (close)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use trueno_tune::callback::{CallbackConfig, TrialCallback};
//! use trueno_tune::tracking::MemoryBackend;
//! use trueno_tune::trial::TrialInfo;
//! use trueno_tune::value::mapping_from_json;
//!
//! let dir = std::env::temp_dir().join("trueno-tune-doc").join("t-1");
//! let trial = TrialInfo::new("t-1", &dir, "doc");
//! let backend = MemoryBackend::new();
//! let mut callback = TrialCallback::new(CallbackConfig::default(), backend.clone())?;
//!
//! callback.on_trial_start(&trial)?;
//! let result = mapping_from_json(serde_json::json!({
//!     "training_iteration": 1,
//!     "loss": 0.5,
//!     "context": {},
//! }));
//! let summary = callback.on_trial_result(1, &trial, &result)?;
//! assert_eq!(summary.observed, vec!["loss".to_string()]);
//! callback.on_trial_end(&trial, false)?;
//! # Ok::<(), trueno_tune::Error>(())
//! ```

mod config;

pub use config::{CallbackConfig, CallbackConfigBuilder};

use tracing::{debug, warn};

use crate::sanitize::{classify, flatten, ValueClass, DEFAULT_DELIMITER};
use crate::session::{
    BindingPolicy, Observation, SessionFactory, TrackingSession, TrialRunRegistry,
};
use crate::trial::Trial;
use crate::value::{Mapping, Value};
use crate::{Error, Result};

/// Primary step source.
pub const TIMESTEPS_TOTAL: &str = "timesteps_total";
/// Fallback step source; never logged as a metric.
pub const TRAINING_ITERATION: &str = "training_iteration";
/// Cumulative wall time.
pub const TIME_TOTAL_S: &str = "time_total_s";
/// Side-channel context passed to every observation.
pub const CONTEXT: &str = "context";
/// Side-channel epoch passed to every observation.
pub const EPOCH: &str = "epoch";

/// Result fields that are bookkeeping, not metrics.
pub const BOOKKEEPING_FIELDS: [&str; 5] =
    ["config", "pid", "timestamp", TIME_TOTAL_S, TRAINING_ITERATION];

/// Namespace every tracked metric name is placed under.
pub const METRIC_NAMESPACE: [&str; 2] = ["ray", "tune"];

/// Context key identifying the trial inside a shared session.
pub const CONTEXT_TRIAL_KEY: &str = "trial";

/// What one `on_trial_result` call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSummary {
    /// Step the observations were recorded at.
    pub step: u64,
    /// Flattened metric names sent to the session, in order.
    pub observed: Vec<String>,
    /// Flattened values that passed classification (scalars and sequences).
    pub valid: Mapping,
    /// Allow-listed metric names missing from this result.
    pub missing: Vec<String>,
}

/// Forwards trial lifecycle events to tracking sessions.
pub struct TrialCallback<F: SessionFactory> {
    registry: TrialRunRegistry<F>,
    metrics: Option<Vec<String>>,
}

impl<F: SessionFactory> TrialCallback<F> {
    /// Create a callback from a configuration and a session factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: CallbackConfig, factory: F) -> Result<Self> {
        config.validate()?;

        let mut registry = TrialRunRegistry::new(factory, config.binding())
            .options(config.session_options().clone());
        if let Some(repo) = config.repo() {
            registry = registry.repo(repo);
        }
        if let Some(experiment) = config.experiment() {
            registry = registry.experiment(experiment);
        }

        Ok(Self {
            registry,
            metrics: config.metrics().map(<[String]>::to_vec),
        })
    }

    /// Borrow the session registry.
    #[must_use]
    pub const fn registry(&self) -> &TrialRunRegistry<F> {
        &self.registry
    }

    /// Mutably borrow the session registry.
    pub fn registry_mut(&mut self) -> &mut TrialRunRegistry<F> {
        &mut self.registry
    }

    /// Handle a trial start.
    ///
    /// # Errors
    ///
    /// See [`TrialRunRegistry::on_trial_start`].
    pub fn on_trial_start<T: Trial + ?Sized>(&mut self, trial: &T) -> Result<()> {
        debug!(trial = trial.trial_id(), "Trial started");
        self.registry.on_trial_start(trial)
    }

    /// Forward one result report to the trial's session.
    ///
    /// `result` is never modified. `iteration` is informational only; the
    /// step comes from the result itself.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingStepField`] if no step can be derived
    /// - [`Error::InvalidField`] for a malformed step
    ///
    /// A malformed epoch or context is logged and dropped; the metrics are
    /// still forwarded.
    /// - [`Error::SessionNotFound`] if the trial was never started
    /// - backend failures from `observe`
    pub fn on_trial_result<T: Trial + ?Sized>(
        &mut self,
        iteration: u64,
        trial: &T,
        result: &Mapping,
    ) -> Result<ResultSummary> {
        let mut record = result.clone();
        let step = resolve_step(&record)?;

        for field in BOOKKEEPING_FIELDS {
            record.remove(field);
        }

        let mut context = match record.remove(CONTEXT) {
            None | Some(Value::Null) => None,
            Some(Value::Map(context)) => Some(context),
            Some(other) => {
                warn!(
                    trial = trial.trial_id(),
                    kind = other.type_name(),
                    "Ignoring context that is not a mapping"
                );
                None
            }
        };
        let epoch = match record.remove(EPOCH) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let epoch = value.as_counter();
                if epoch.is_none() {
                    warn!(
                        trial = trial.trial_id(),
                        kind = value.type_name(),
                        "Ignoring epoch that is not a non-negative integer"
                    );
                }
                epoch
            }
        };

        let shared = self.registry.policy() == BindingPolicy::Shared;
        let session = self.registry.resolve(trial)?;
        if shared {
            // The trial id is the only thing telling trials apart in a shared session.
            context.get_or_insert_with(Mapping::new).insert(
                CONTEXT_TRIAL_KEY.to_string(),
                Value::from(trial.trial_id()),
            );
        }

        let mut tracker = Tracker {
            session,
            step,
            epoch,
            context,
            summary: ResultSummary {
                step,
                ..ResultSummary::default()
            },
        };

        let flat = flatten(&record, DEFAULT_DELIMITER);
        match &self.metrics {
            Some(metrics) => {
                for metric in metrics {
                    match flat.get(metric) {
                        Some(value) => tracker.track(metric, value)?,
                        None => {
                            warn!(
                                trial = trial.trial_id(),
                                metric = %metric,
                                "The metric is specified but not reported"
                            );
                            tracker.summary.missing.push(metric.clone());
                        }
                    }
                }
            }
            None => {
                for (name, value) in &flat {
                    tracker.track(name, value)?;
                }
            }
        }

        let summary = tracker.summary;
        debug!(
            trial = trial.trial_id(),
            iteration,
            step,
            observed = summary.observed.len(),
            "Forwarded trial result"
        );
        Ok(summary)
    }

    /// Handle a trial end by closing its session.
    ///
    /// Failed and successful trials are closed the same way.
    ///
    /// # Errors
    ///
    /// See [`TrialRunRegistry::on_trial_end`].
    pub fn on_trial_end<T: Trial + ?Sized>(&mut self, trial: &T, failed: bool) -> Result<()> {
        debug!(trial = trial.trial_id(), failed, "Trial ended");
        self.registry.on_trial_end(trial)
    }

    /// Close every remaining session.
    ///
    /// # Errors
    ///
    /// See [`TrialRunRegistry::close_all`].
    pub fn teardown(&mut self) -> Result<()> {
        self.registry.close_all()
    }
}

/// Per-result state shared by every tracked value.
struct Tracker<'a, S: TrackingSession> {
    session: &'a mut S,
    step: u64,
    epoch: Option<u64>,
    context: Option<Mapping>,
    summary: ResultSummary,
}

impl<S: TrackingSession> Tracker<'_, S> {
    fn track(&mut self, name: &str, value: &Value) -> Result<()> {
        match classify(value) {
            ValueClass::Scalar(scalar) => {
                self.session.observe(Observation {
                    name: metric_path(name),
                    value: scalar,
                    step: self.step,
                    epoch: self.epoch,
                    context: self.context.clone(),
                })?;
                self.summary.observed.push(name.to_string());
                self.summary.valid.insert(name.to_string(), value.clone());
            }
            ValueClass::Sequence => {
                self.summary.valid.insert(name.to_string(), value.clone());
            }
            ValueClass::Other => {}
        }
        Ok(())
    }
}

/// Full metric name under [`METRIC_NAMESPACE`].
#[must_use]
pub fn metric_path(name: &str) -> String {
    let mut path = METRIC_NAMESPACE.join(DEFAULT_DELIMITER);
    path.push_str(DEFAULT_DELIMITER);
    path.push_str(name);
    path
}

fn resolve_step(result: &Mapping) -> Result<u64> {
    [TIMESTEPS_TOTAL, TRAINING_ITERATION]
        .into_iter()
        .find_map(|field| {
            result
                .get(field)
                .filter(|value| !value.is_null())
                .map(|value| counter(field, value))
        })
        .unwrap_or_else(|| Err(Error::MissingStepField))
}

fn counter(field: &str, value: &Value) -> Result<u64> {
    value.as_counter().ok_or_else(|| Error::InvalidField {
        field: field.to_string(),
        reason: format!("expected a non-negative integer, got {}", value.type_name()),
    })
}
