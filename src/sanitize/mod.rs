//! Sanitation pipeline for reported values
//!
//! Three pure building blocks shared by the lifecycle callback:
//!
//! - [`classify`]: is a value a loggable scalar, a non-empty sequence, or neither?
//! - [`flatten`]: nested mapping → `a/b/c`-keyed flat mapping
//! - [`scrub_hparams`]: hyperparameters → backend-safe primitives
//!
//! ## Example
//!
//! ```rust
//! use trueno_tune::sanitize::{classify, flatten, ValueClass};
//! use trueno_tune::value::mapping_from_json;
//!
//! let result = mapping_from_json(serde_json::json!({"eval": {"loss": 0.5}}));
//! let flat = flatten(&result, "/");
//! assert_eq!(classify(&flat["eval/loss"]), ValueClass::Scalar(0.5));
//! ```

mod classify;
mod flatten;
mod hparams;

pub use classify::{classify, ValueClass};
pub use flatten::{flatten, flatten_strict, DEFAULT_DELIMITER};
pub use hparams::{scrub_hparams, ScrubbedParams};
