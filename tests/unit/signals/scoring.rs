//! Unit tests for score normalization

use awce::signals::scoring::{clamp_percent, confidence_label, normalize_score};

#[test]
fn test_normalize_within_default_thresholds() {
    assert_eq!(normalize_score(0.0, 0.0, 100.0), 0.0);
    assert_eq!(normalize_score(50.0, 0.0, 100.0), 50.0);
    assert_eq!(normalize_score(100.0, 0.0, 100.0), 100.0);
}

#[test]
fn test_normalize_interpolates_custom_thresholds() {
    assert!((normalize_score(50.0, 20.0, 80.0) - 50.0).abs() < 1e-9);
    assert!((normalize_score(35.0, 20.0, 80.0) - 25.0).abs() < 1e-9);
}

#[test]
fn test_normalize_clamps_out_of_range_inputs() {
    assert_eq!(normalize_score(-40.0, 0.0, 100.0), 0.0);
    assert_eq!(normalize_score(10.0, 20.0, 80.0), 0.0);
    assert_eq!(normalize_score(150.0, 0.0, 100.0), 100.0);
    assert_eq!(normalize_score(90.0, 20.0, 80.0), 100.0);
    assert_eq!(normalize_score(f64::INFINITY, 0.0, 100.0), 100.0);
}

#[test]
fn test_normalize_non_positive_span_is_zero() {
    // Checked before the below-min / above-max rules
    assert_eq!(normalize_score(5.0, 10.0, 10.0), 0.0);
    assert_eq!(normalize_score(500.0, 10.0, 10.0), 0.0);
    assert_eq!(normalize_score(50.0, 80.0, 20.0), 0.0);
}

#[test]
fn test_normalize_nan_is_zero() {
    assert_eq!(normalize_score(f64::NAN, 0.0, 100.0), 0.0);
    assert_eq!(normalize_score(50.0, f64::NAN, 100.0), 0.0);
}

#[test]
fn test_clamp_percent() {
    assert_eq!(clamp_percent(-5.0), 0.0);
    assert_eq!(clamp_percent(42.5), 42.5);
    assert_eq!(clamp_percent(150.0), 100.0);
    assert_eq!(clamp_percent(f64::NAN), 0.0);
}

#[test]
fn test_confidence_label_bands() {
    assert_eq!(confidence_label(95.0), "Very High");
    assert_eq!(confidence_label(80.0), "Very High");
    assert_eq!(confidence_label(79.9), "High");
    assert_eq!(confidence_label(60.0), "High");
    assert_eq!(confidence_label(40.0), "Moderate");
    assert_eq!(confidence_label(20.0), "Low");
    assert_eq!(confidence_label(19.9), "Very Low");
    assert_eq!(confidence_label(0.0), "Very Low");
}
