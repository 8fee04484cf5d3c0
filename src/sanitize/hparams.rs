//! Hyperparameter Scrubber - reduces hyperparameters to backend-safe primitives

use tracing::warn;

use super::flatten::{flatten, DEFAULT_DELIMITER};
use crate::value::{Mapping, Value};

/// Output of [`scrub_hparams`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrubbedParams {
    /// Flattened parameters safe to hand to a tracking backend.
    pub scrubbed: Mapping,
    /// Flattened parameters that were dropped, kept for diagnostics.
    pub removed: Mapping,
}

/// Convert a hyperparameter value to backend-safe native form.
///
/// Wrappers become native scalars, also when nested in lists or in mappings
/// inside lists. Returns `None` if the value is, or contains, an array or an
/// opaque object.
fn to_native(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
            Some(value.clone())
        }
        Value::Numeric(n) => Some(n.to_native()),
        Value::List(items) => items.iter().map(to_native).collect::<Option<_>>().map(Value::List),
        Value::Map(children) => children
            .iter()
            .map(|(k, v)| to_native(v).map(|v| (k.clone(), v)))
            .collect::<Option<_>>()
            .map(Value::Map),
        Value::Array(_) | Value::Opaque(_) => None,
    }
}

/// Flatten and scrub a hyperparameter mapping.
///
/// - `null`, `bool`, `int`, `float`, `str` and lists are kept
/// - fixed-width numeric wrappers are converted to their native form, at any
///   depth inside a kept list
/// - arrays, opaque objects, and lists containing either, are moved to
///   `removed` and reported at warn level
#[must_use]
pub fn scrub_hparams(params: &Mapping) -> ScrubbedParams {
    let mut out = ScrubbedParams::default();

    for (key, value) in flatten(params, DEFAULT_DELIMITER) {
        match to_native(&value) {
            Some(native) => {
                out.scrubbed.insert(key, native);
            }
            None => {
                out.removed.insert(key, value);
            }
        }
    }

    if !out.removed.is_empty() {
        let removed: Vec<String> = out
            .removed
            .iter()
            .map(|(k, v)| format!("{k}: {}", v.type_name()))
            .collect();
        warn!(
            removed = ?removed,
            "Removed hyperparameter values not supported by the tracking backend"
        );
    }

    out
}
