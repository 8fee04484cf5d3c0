//! Reported values - the dynamic data model for results and hyperparameters
//!
//! Orchestrators report loosely-typed data: native scalars, fixed-width
//! numeric wrappers, shaped arrays, nested mappings and arbitrary objects.
//! [`Value`] captures all of these so the sanitation pipeline can decide,
//! once per value, what is safe to forward.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, Result};

/// Nested mapping of reported values, keyed by name.
///
/// A `BTreeMap` keeps flattening and iteration deterministic.
pub type Mapping = BTreeMap<String, Value>;

/// Fixed-width numeric wrapper kinds.
///
/// These mirror the typed scalars numeric libraries hand back
/// (`bool8`, `int32`, `float32`, ...), as opposed to native values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    /// 8-bit boolean
    Bool8(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
}

impl Numeric {
    /// Convert to the equivalent native value.
    #[must_use]
    pub fn to_native(self) -> Value {
        match self {
            Self::Bool8(b) => Value::Bool(b),
            Self::Int32(i) => Value::Int(i64::from(i)),
            Self::Int64(i) => Value::Int(i),
            Self::Float32(f) => Value::Float(f64::from(f)),
            Self::Float64(f) => Value::Float(f),
        }
    }
}

/// Shaped, homogeneous numeric container (an n-dimensional array).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<Numeric>,
}

impl NdArray {
    /// Create an array with the given shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `data.len()` is not the product of `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<Numeric>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::ShapeMismatch {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Create a one-dimensional array.
    #[must_use]
    pub fn from_vec(data: Vec<Numeric>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Get the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the flat element data.
    #[must_use]
    pub fn data(&self) -> &[Numeric] {
        &self.data
    }

    /// Total number of elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A single reported value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent / none
    Null,
    /// Native boolean
    Bool(bool),
    /// Native integer
    Int(i64),
    /// Native float
    Float(f64),
    /// String
    Str(String),
    /// Heterogeneous list
    List(Vec<Value>),
    /// Nested mapping
    Map(Mapping),
    /// Fixed-width numeric wrapper
    Numeric(Numeric),
    /// Shaped numeric array
    Array(NdArray),
    /// Any other object, identified by its type name
    Opaque(String),
}

impl Value {
    /// Whether this value is `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the nested mapping, if this is a `Map`.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Interpret the value as a non-negative integer counter.
    ///
    /// Accepts native and wrapper integers, and floats with no fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_counter(&self) -> Option<u64> {
        let float_counter = |f: f64| {
            (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64)
                .then_some(f as u64)
        };
        match self {
            Self::Int(i) | Self::Numeric(Numeric::Int64(i)) => u64::try_from(*i).ok(),
            Self::Numeric(Numeric::Int32(i)) => u64::try_from(*i).ok(),
            Self::Float(f) | Self::Numeric(Numeric::Float64(f)) => float_counter(*f),
            Self::Numeric(Numeric::Float32(f)) => float_counter(f64::from(*f)),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Numeric(Numeric::Bool8(_)) => "bool8",
            Self::Numeric(Numeric::Int32(_)) => "int32",
            Self::Numeric(Numeric::Int64(_)) => "int64",
            Self::Numeric(Numeric::Float32(_)) => "float32",
            Self::Numeric(Numeric::Float64(_)) => "float64",
            Self::Array(_) => "ndarray",
            Self::Opaque(name) => name,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(obj) => {
                Self::Map(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Numeric(Numeric::Int32(i))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Numeric(Numeric::Float32(f))
    }
}

impl From<Numeric> for Value {
    fn from(n: Numeric) -> Self {
        Self::Numeric(n)
    }
}

impl From<NdArray> for Value {
    fn from(a: NdArray) -> Self {
        Self::Array(a)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Self::Map(m)
    }
}

/// Build a [`Mapping`] from a JSON object literal.
///
/// Non-object JSON yields an empty mapping.
#[must_use]
pub fn mapping_from_json(json: serde_json::Value) -> Mapping {
    match Value::from(json) {
        Value::Map(m) => m,
        _ => Mapping::new(),
    }
}
