//! Trial - the orchestrator's read-only view of one experiment run

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::value::Mapping;
use crate::Result;

/// Opaque, stable identity of a trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrialKey(String);

impl TrialKey {
    /// Create a key from any string-like identity.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the lifecycle callback needs to know about a trial.
///
/// Trials are owned by the orchestrator; the callback only borrows them.
pub trait Trial {
    /// Trial id, used as a session tag and as the context discriminator
    /// when sessions are shared.
    fn trial_id(&self) -> &str;

    /// Directory the trial writes its logs to.
    fn logdir(&self) -> &Path;

    /// Name of the experiment directory; default session grouping label.
    fn experiment_dir_name(&self) -> &str;

    /// Hyperparameters evaluated for this trial (may be empty).
    fn evaluated_params(&self) -> &Mapping;

    /// Prepare the trial's log directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn init_logdir(&self) -> Result<()>;

    /// Registry identity. Defaults to the trial id.
    fn key(&self) -> TrialKey {
        TrialKey::new(self.trial_id())
    }
}

/// Plain trial description, for orchestrators that don't carry their own type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialInfo {
    trial_id: String,
    logdir: PathBuf,
    experiment_dir_name: String,
    #[serde(skip)]
    evaluated_params: Mapping,
}

impl TrialInfo {
    /// Create a trial with no evaluated hyperparameters.
    #[must_use]
    pub fn new(
        trial_id: impl Into<String>,
        logdir: impl Into<PathBuf>,
        experiment_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            trial_id: trial_id.into(),
            logdir: logdir.into(),
            experiment_dir_name: experiment_dir_name.into(),
            evaluated_params: Mapping::new(),
        }
    }

    /// Attach evaluated hyperparameters.
    #[must_use]
    pub fn with_params(mut self, params: Mapping) -> Self {
        self.evaluated_params = params;
        self
    }
}

impl Trial for TrialInfo {
    fn trial_id(&self) -> &str {
        &self.trial_id
    }

    fn logdir(&self) -> &Path {
        &self.logdir
    }

    fn experiment_dir_name(&self) -> &str {
        &self.experiment_dir_name
    }

    fn evaluated_params(&self) -> &Mapping {
        &self.evaluated_params
    }

    fn init_logdir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.logdir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_defaults_to_trial_id() {
        let trial = TrialInfo::new("t-1", "/tmp/exp/t-1", "exp");
        assert_eq!(trial.key(), TrialKey::new("t-1"));
        assert_eq!(trial.key().to_string(), "t-1");
    }

    #[test]
    fn test_init_logdir_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let logdir = root.path().join("exp").join("t-1");
        let trial = TrialInfo::new("t-1", &logdir, "exp");

        trial.init_logdir().unwrap();
        assert!(logdir.is_dir());
        // idempotent
        trial.init_logdir().unwrap();
    }
}
