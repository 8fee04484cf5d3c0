//! Property-based tests for trueno-tune
//!
//! Following ruchy/trueno/aprender pattern:
//! - Test sanitation invariants (idempotence, type safety, no lost leaves)
//! - Test that NaN never reaches a time series
//! - Run with ProptestConfig::with_cases(100)

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use trueno_tune::callback::{CallbackConfig, TrialCallback};
use trueno_tune::sanitize::{flatten, scrub_hparams};
use trueno_tune::session::BindingPolicy;
use trueno_tune::tracking::MemoryBackend;
use trueno_tune::trial::TrialInfo;
use trueno_tune::value::{Mapping, NdArray, Numeric, Value};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate fixed-width numeric wrappers
fn arb_numeric() -> impl Strategy<Value = Numeric> {
    prop_oneof![
        any::<bool>().prop_map(Numeric::Bool8),
        any::<i32>().prop_map(Numeric::Int32),
        any::<i64>().prop_map(Numeric::Int64),
        (-1.0e6f32..1.0e6).prop_map(Numeric::Float32),
        (-1.0e6f64..1.0e6).prop_map(Numeric::Float64),
    ]
}

/// Generate leaf values of every kind (no NaN, so equality is meaningful)
fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Str),
        arb_numeric().prop_map(Value::Numeric),
        "[A-Z][a-z]{2,6}".prop_map(Value::Opaque),
        vec(arb_numeric(), 0..4).prop_map(|data| Value::Array(NdArray::from_vec(data))),
    ]
}

/// Generate nested values (lists and mappings of leaves)
fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::List),
            btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

/// Generate a nested hyperparameter mapping
fn arb_mapping() -> impl Strategy<Value = Mapping> {
    btree_map("[a-z]{1,4}", arb_value(), 0..6)
}

/// Generate metric results where some values are NaN
fn arb_metrics_with_nan() -> impl Strategy<Value = Mapping> {
    btree_map(
        "m_[a-z]{1,5}",
        prop_oneof![Just(f64::NAN), -1.0e3f64..1.0e3].prop_map(Value::Float),
        1..8,
    )
}

/// Whether a wrapper, array or opaque object appears anywhere inside `value`
fn contains_unsafe(value: &Value) -> bool {
    match value {
        Value::Numeric(_) | Value::Array(_) | Value::Opaque(_) => true,
        Value::List(items) => items.iter().any(contains_unsafe),
        Value::Map(children) => children.values().any(contains_unsafe),
        _ => false,
    }
}

fn count_leaves(mapping: &Mapping) -> usize {
    mapping
        .values()
        .map(|v| match v {
            Value::Map(children) => count_leaves(children),
            _ => 1,
        })
        .sum()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: scrubbing the scrubbed output changes nothing
    #[test]
    fn prop_scrub_is_idempotent(params in arb_mapping()) {
        let first = scrub_hparams(&params);
        let second = scrub_hparams(&first.scrubbed);
        prop_assert_eq!(&second.scrubbed, &first.scrubbed);
        prop_assert!(second.removed.is_empty());
    }

    /// Property: no wrapper, array or object survives scrubbing, at any depth
    #[test]
    fn prop_scrubbed_has_only_primitives(params in arb_mapping()) {
        let out = scrub_hparams(&params);
        for (key, value) in &out.scrubbed {
            prop_assert!(!contains_unsafe(value), "unsafe value left at {}", key);
            prop_assert!(
                matches!(
                    value,
                    Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_)
                        | Value::Str(_) | Value::List(_)
                ),
                "unsafe type {} at {}", value.type_name(), key
            );
        }
    }

    /// Property: scrubbed and removed partition the flattened parameters
    #[test]
    fn prop_scrub_partitions_keys(params in arb_mapping()) {
        let flat = flatten(&params, "/");
        let out = scrub_hparams(&params);

        for key in out.scrubbed.keys() {
            prop_assert!(!out.removed.contains_key(key));
        }
        prop_assert_eq!(out.scrubbed.len() + out.removed.len(), flat.len());
    }

    /// Property: flattening keeps every non-mapping leaf exactly once
    #[test]
    fn prop_flatten_keeps_all_leaves(params in arb_mapping()) {
        let flat = flatten(&params, "/");
        prop_assert_eq!(flat.len(), count_leaves(&params));
        prop_assert!(flat.values().all(|v| !matches!(v, Value::Map(_))));
    }

    /// Property: a NaN metric never reaches `observe`
    #[test]
    fn prop_nan_never_observed(metrics in arb_metrics_with_nan(), step in 0i64..1000) {
        let config = CallbackConfig::builder()
            .binding(BindingPolicy::PerTrial)
            .build()
            .unwrap();
        let backend = MemoryBackend::new();
        let mut callback = TrialCallback::new(config, backend.clone()).unwrap();
        let logdir = std::env::temp_dir().join("trueno-tune-prop").join("t");
        let trial = TrialInfo::new("t", logdir, "prop");
        callback.on_trial_start(&trial).unwrap();

        let mut result = metrics.clone();
        result.insert("training_iteration".into(), Value::Int(step));
        let summary = callback.on_trial_result(1, &trial, &result).unwrap();

        let finite = metrics
            .values()
            .filter(|v| matches!(v, Value::Float(f) if !f.is_nan()))
            .count();
        prop_assert_eq!(summary.observed.len(), finite);
        prop_assert_eq!(backend.store().metric_count(), finite);
    }
}
