//! Trial-Run Registry - owns the mapping from trial identity to session

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SessionFactory, SessionOptions, TrackingSession};
use crate::sanitize::scrub_hparams;
use crate::trial::{Trial, TrialKey};
use crate::value::Value;
use crate::{Error, Result};

/// Session tag holding the scrubbed hyperparameter snapshot.
pub const HPARAMS_TAG: &str = "hparams";

/// Session tag holding the trial id (per-trial policy only).
pub const TRIAL_ID_TAG: &str = "trial_id";

/// Rule for mapping trials to sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingPolicy {
    /// One session per trial.
    PerTrial,
    /// One session shared by every trial in the group.
    #[default]
    Shared,
}

/// Registry of open tracking sessions, keyed by trial.
///
/// ## Invariants
///
/// - `Shared`: at most one entry; every trial resolves to it.
/// - `PerTrial`: at most one entry per trial; restarting a trial closes
///   the previous session before the new one is installed.
pub struct TrialRunRegistry<F: SessionFactory> {
    factory: F,
    policy: BindingPolicy,
    repo: Option<String>,
    experiment: Option<String>,
    options: SessionOptions,
    sessions: HashMap<TrialKey, F::Session>,
}

impl<F: SessionFactory> TrialRunRegistry<F> {
    /// Create an empty registry.
    #[must_use]
    pub fn new(factory: F, policy: BindingPolicy) -> Self {
        Self {
            factory,
            policy,
            repo: None,
            experiment: None,
            options: SessionOptions::new(),
            sessions: HashMap::new(),
        }
    }

    /// Override the repository location for every session.
    #[must_use]
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Override the grouping label for every session.
    #[must_use]
    pub fn experiment(mut self, experiment: impl Into<String>) -> Self {
        self.experiment = Some(experiment.into());
        self
    }

    /// Set pass-through options for the session factory.
    #[must_use]
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the binding policy.
    #[must_use]
    pub const fn policy(&self) -> BindingPolicy {
        self.policy
    }

    /// Number of registered sessions (open or closed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Whether the trial has its own registry entry.
    #[must_use]
    pub fn contains(&self, key: &TrialKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Create a session for the trial without installing it.
    ///
    /// The repository defaults to the parent of the trial's log directory and
    /// the grouping label to its experiment directory name.
    ///
    /// # Errors
    ///
    /// Backend failures propagate.
    pub fn create_session<T: Trial + ?Sized>(&self, trial: &T) -> Result<F::Session> {
        let repo = self.repo.clone().unwrap_or_else(|| {
            let logdir = trial.logdir();
            logdir
                .parent()
                .unwrap_or(logdir)
                .to_string_lossy()
                .into_owned()
        });
        let experiment = self
            .experiment
            .as_deref()
            .unwrap_or_else(|| trial.experiment_dir_name());

        let mut session = self.factory.create(&repo, experiment, &self.options)?;
        if self.policy == BindingPolicy::PerTrial {
            if let Err(err) = session.set(TRIAL_ID_TAG, Value::from(trial.trial_id())) {
                if let Err(close_err) = session.close() {
                    debug!(
                        run = session.run_hash(),
                        error = %close_err,
                        "Failed to close untagged tracking session"
                    );
                }
                return Err(err);
            }
        }

        debug!(
            trial = trial.trial_id(),
            run = session.run_hash(),
            repo = %repo,
            experiment,
            "Created tracking session"
        );
        Ok(session)
    }

    /// Register the trial, creating (or replacing) its session.
    ///
    /// Under `Shared`, only the first call creates a session; later calls are
    /// no-ops, so later trials' hyperparameters are never tagged.
    ///
    /// # Errors
    ///
    /// Fails if the previous session cannot be closed, the log directory
    /// cannot be prepared, or the backend rejects the new session.
    pub fn on_trial_start<T: Trial + ?Sized>(&mut self, trial: &T) -> Result<()> {
        let key = trial.key();
        match self.policy {
            BindingPolicy::PerTrial => {
                // The entry stays registered until its session is closed.
                if let Some(previous) = self.sessions.get_mut(&key) {
                    debug!(trial = %key, run = previous.run_hash(), "Replacing tracking session");
                    previous.close()?;
                    self.sessions.remove(&key);
                }
            }
            BindingPolicy::Shared => {
                if !self.sessions.is_empty() {
                    return Ok(());
                }
            }
        }

        let session = self.create_session(trial)?;
        let session = self.sessions.entry(key).or_insert(session);

        trial.init_logdir()?;

        let params = trial.evaluated_params();
        if !params.is_empty() {
            let scrubbed = scrub_hparams(params).scrubbed;
            session.set(HPARAMS_TAG, Value::Map(scrubbed))?;
        }
        Ok(())
    }

    /// Find the session a trial reports to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFound`] if the trial (or, under `Shared`,
    /// any trial) was never started.
    pub fn resolve<T: Trial + ?Sized>(&mut self, trial: &T) -> Result<&mut F::Session> {
        let found = match self.policy {
            BindingPolicy::PerTrial => self.sessions.get_mut(&trial.key()),
            BindingPolicy::Shared => self.sessions.values_mut().next(),
        };
        found.ok_or_else(|| Error::SessionNotFound(trial.trial_id().to_string()))
    }

    /// Close the trial's session.
    ///
    /// Under `PerTrial` the entry is dropped after closing. Under `Shared`
    /// the closed session stays registered, so the group keeps one session.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] or backend failures.
    pub fn on_trial_end<T: Trial + ?Sized>(&mut self, trial: &T) -> Result<()> {
        match self.policy {
            BindingPolicy::PerTrial => {
                let session = self.resolve(trial)?;
                debug!(
                    trial = trial.trial_id(),
                    run = session.run_hash(),
                    "Closing tracking session"
                );
                session.close()?;
                self.sessions.remove(&trial.key());
                Ok(())
            }
            BindingPolicy::Shared => {
                let session = self.resolve(trial)?;
                debug!(
                    trial = trial.trial_id(),
                    run = session.run_hash(),
                    "Closing shared tracking session"
                );
                session.close()
            }
        }
    }

    /// Close every registered session and empty the registry.
    ///
    /// All sessions are attempted; the first failure is returned.
    ///
    /// # Errors
    ///
    /// The first backend failure encountered.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for (key, mut session) in self.sessions.drain() {
            if let Err(err) = session.close() {
                debug!(trial = %key, error = %err, "Failed to close tracking session");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
