//! Tests for error types

use trueno_tune::Error;

#[test]
fn test_missing_step_field_error() {
    let error_str = format!("{}", Error::MissingStepField);
    assert!(error_str.contains("timesteps_total"));
    assert!(error_str.contains("training_iteration"));
}

#[test]
fn test_session_not_found_error() {
    let error_str = format!("{}", Error::SessionNotFound("trial_42".to_string()));
    assert!(error_str.contains("No tracking session"));
    assert!(error_str.contains("trial_42"));
    assert!(error_str.contains("started before reporting"));
}

#[test]
fn test_session_closed_error() {
    let error_str = format!("{}", Error::SessionClosed("run-000001".to_string()));
    assert!(error_str.contains("run-000001"));
    assert!(error_str.contains("closed"));
}

#[test]
fn test_invalid_field_error() {
    let error = Error::InvalidField {
        field: "epoch".to_string(),
        reason: "expected a non-negative integer, got str".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("`epoch`"));
    assert!(error_str.contains("non-negative integer"));
}

#[test]
fn test_delimiter_in_key_error() {
    let error = Error::DelimiterInKey {
        key: "a/b".to_string(),
        delimiter: "/".to_string(),
    };
    assert!(format!("{error}").contains("`a/b`"));
}

#[test]
fn test_shape_mismatch_error() {
    let error = Error::ShapeMismatch {
        shape: vec![2, 3],
        expected: 6,
        actual: 4,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("[2, 3]"));
    assert!(error_str.contains('6'));
    assert!(error_str.contains('4'));
}

#[test]
fn test_invalid_config_error() {
    let error_str = format!("{}", Error::InvalidConfig("bad".to_string()));
    assert!(error_str.contains("Invalid configuration"));
}

#[test]
fn test_backend_and_delivery_errors() {
    assert!(format!("{}", Error::Backend("down".into())).contains("Tracking backend error"));
    assert!(format!("{}", Error::Delivery("throttled".into())).contains("Delivery failed"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    assert!(format!("{error}").contains("IO error"));
}

#[test]
fn test_serialization_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("Serialization error"));
}

#[test]
fn test_error_debug_format() {
    let debug_str = format!("{:?}", Error::MissingStepField);
    assert!(debug_str.contains("MissingStepField"));
}
