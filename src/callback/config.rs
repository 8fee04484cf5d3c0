//! Callback configuration

use serde::{Deserialize, Serialize};

use crate::session::{BindingPolicy, SessionOptions};
use crate::{Error, Result};

/// Construction-time options of a [`TrialCallback`](super::TrialCallback).
///
/// Every field is optional; the defaults log every reported metric into one
/// shared session stored next to the trials' log directories.
///
/// ## Example
///
/// ```rust
/// use trueno_tune::callback::CallbackConfig;
/// use trueno_tune::session::BindingPolicy;
///
/// let config = CallbackConfig::from_json(r#"{
///     "experiment": "sweep",
///     "metrics": ["loss", "eval/acc"],
///     "binding": "per_trial"
/// }"#)?;
/// assert_eq!(config.binding(), BindingPolicy::PerTrial);
/// # Ok::<(), trueno_tune::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallbackConfig {
    repo: Option<String>,
    experiment: Option<String>,
    metrics: Option<Vec<String>>,
    binding: BindingPolicy,
    session_options: SessionOptions,
}

impl CallbackConfig {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> CallbackConfigBuilder {
        CallbackConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the metric allow-list is present but
    /// empty (omit it to log everything).
    pub fn validate(&self) -> Result<()> {
        if self.metrics.as_ref().is_some_and(Vec::is_empty) {
            return Err(Error::InvalidConfig(
                "`metrics` must not be empty; omit it to log every reported metric".into(),
            ));
        }
        Ok(())
    }

    /// Repository location override.
    #[must_use]
    pub fn repo(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    /// Grouping label override.
    #[must_use]
    pub fn experiment(&self) -> Option<&str> {
        self.experiment.as_deref()
    }

    /// Metric allow-list, `None` meaning "everything".
    #[must_use]
    pub fn metrics(&self) -> Option<&[String]> {
        self.metrics.as_deref()
    }

    /// Session-binding policy.
    #[must_use]
    pub const fn binding(&self) -> BindingPolicy {
        self.binding
    }

    /// Pass-through session options.
    #[must_use]
    pub const fn session_options(&self) -> &SessionOptions {
        &self.session_options
    }
}

/// Builder for `CallbackConfig`.
#[derive(Debug, Default)]
pub struct CallbackConfigBuilder {
    config: CallbackConfig,
}

impl CallbackConfigBuilder {
    /// Store sessions in `repo` instead of next to each trial.
    #[must_use]
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.config.repo = Some(repo.into());
        self
    }

    /// Group sessions under `experiment` instead of the trial's directory name.
    #[must_use]
    pub fn experiment(mut self, experiment: impl Into<String>) -> Self {
        self.config.experiment = Some(experiment.into());
        self
    }

    /// Only track these (flattened) metric names.
    #[must_use]
    pub fn metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.metrics = Some(metrics.into_iter().map(Into::into).collect());
        self
    }

    /// Set the session-binding policy.
    #[must_use]
    pub const fn binding(mut self, binding: BindingPolicy) -> Self {
        self.config.binding = binding;
        self
    }

    /// Add a pass-through session option.
    #[must_use]
    pub fn session_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.session_options.insert(key.into(), value);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// See [`CallbackConfig::validate`].
    pub fn build(self) -> Result<CallbackConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
