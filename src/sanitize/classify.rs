//! Value Classifier - decides which reported values become metric points

use crate::value::{Numeric, Value};

/// Classification of a reported value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueClass {
    /// Bool, integer or float (native or fixed-width), not NaN. Carries the
    /// value; booleans count as `0.0` / `1.0`.
    Scalar(f64),
    /// Non-empty list or array. Valid, but never tracked as a single point.
    Sequence,
    /// Anything else; dropped silently.
    Other,
}

impl ValueClass {
    /// Whether the value belongs in the valid-result view.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Classify a reported value.
///
/// Booleans are tracked as `0.0` / `1.0`. NaN never reaches a time series.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn classify(value: &Value) -> ValueClass {
    let scalar = match value {
        Value::Bool(b) | Value::Numeric(Numeric::Bool8(b)) => f64::from(u8::from(*b)),
        Value::Int(i) | Value::Numeric(Numeric::Int64(i)) => *i as f64,
        Value::Numeric(Numeric::Int32(i)) => f64::from(*i),
        Value::Float(f) | Value::Numeric(Numeric::Float64(f)) => *f,
        Value::Numeric(Numeric::Float32(f)) => f64::from(*f),
        Value::List(items) if !items.is_empty() => return ValueClass::Sequence,
        Value::Array(arr) if arr.size() > 0 => return ValueClass::Sequence,
        _ => return ValueClass::Other,
    };

    if scalar.is_nan() {
        ValueClass::Other
    } else {
        ValueClass::Scalar(scalar)
    }
}
