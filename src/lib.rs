//! # Trueno-Tune: Trial-to-Run Bridge for Experiment Tracking
//!
//! **Version**: 0.1.0
//!
//! Trueno-tune observes the lifecycle of tuning trials (start, periodic
//! result, end) and forwards a filtered, type-scrubbed view of their metrics
//! and hyperparameters into tracking sessions.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke safety**: NaN and non-numeric values never reach a time series
//! - **Jidoka**: Ordering errors (result before start) stop the line with
//!   `SessionNotFound` instead of being swallowed
//! - **Muda elimination**: Bookkeeping fields (`config`, `pid`, ...) are stripped
//!   before anything is sent
//!
//! ## Example Usage
//!
//! ```rust
//! use trueno_tune::callback::{CallbackConfig, TrialCallback};
//! use trueno_tune::session::BindingPolicy;
//! use trueno_tune::tracking::MemoryBackend;
//! use trueno_tune::trial::TrialInfo;
//! use trueno_tune::value::mapping_from_json;
//!
//! let config = CallbackConfig::builder()
//!     .binding(BindingPolicy::PerTrial)
//!     .build()?;
//! let backend = MemoryBackend::new();
//! let mut callback = TrialCallback::new(config, backend.clone())?;
//!
//! let logdir = std::env::temp_dir().join("trueno-tune-lib").join("trial_0");
//! let trial = TrialInfo::new("trial_0", logdir, "lib-example")
//!     .with_params(mapping_from_json(serde_json::json!({"lr": 0.01})));
//!
//! callback.on_trial_start(&trial)?;
//! let result = mapping_from_json(serde_json::json!({"training_iteration": 1, "loss": 0.4}));
//! callback.on_trial_result(1, &trial, &result)?;
//! callback.on_trial_end(&trial, false)?;
//!
//! assert_eq!(backend.store().metric_count(), 1);
//! # Ok::<(), trueno_tune::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod callback;
pub mod error;
pub mod logging;
pub mod report;
pub mod sanitize;
pub mod session;
pub mod tracking;
pub mod trial;
pub mod value;

pub use error::{Error, Result};
