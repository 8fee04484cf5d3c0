//! Path Flattener - nested mappings to delimiter-joined paths

use crate::value::{Mapping, Value};
use crate::{Error, Result};

/// Delimiter used for metric and hyperparameter paths.
pub const DEFAULT_DELIMITER: &str = "/";

/// Flatten a nested mapping into `parent<delim>child` keys.
///
/// Non-mapping leaves pass through unchanged. An empty nested mapping
/// contributes no keys.
#[must_use]
pub fn flatten(mapping: &Mapping, delimiter: &str) -> Mapping {
    let mut flat = Mapping::new();
    for (key, value) in mapping {
        flatten_into(&mut flat, key.clone(), value, delimiter);
    }
    flat
}

/// Like [`flatten`], but rejects keys that already contain the delimiter.
///
/// # Errors
///
/// Returns [`Error::DelimiterInKey`] for the first ambiguous key found.
pub fn flatten_strict(mapping: &Mapping, delimiter: &str) -> Result<Mapping> {
    check_keys(mapping, delimiter)?;
    Ok(flatten(mapping, delimiter))
}

fn flatten_into(flat: &mut Mapping, path: String, value: &Value, delimiter: &str) {
    match value {
        Value::Map(children) => {
            for (key, child) in children {
                flatten_into(flat, format!("{path}{delimiter}{key}"), child, delimiter);
            }
        }
        leaf => {
            flat.insert(path, leaf.clone());
        }
    }
}

fn check_keys(mapping: &Mapping, delimiter: &str) -> Result<()> {
    for (key, value) in mapping {
        if key.contains(delimiter) {
            return Err(Error::DelimiterInKey {
                key: key.clone(),
                delimiter: delimiter.to_string(),
            });
        }
        if let Value::Map(children) = value {
            check_keys(children, delimiter)?;
        }
    }
    Ok(())
}
