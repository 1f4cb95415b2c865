//! Score normalization and confidence labelling

/// Score substituted for a primitive whose scorer is unavailable
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Normalize a raw score to the 0 to 100 range
///
/// Below `min` maps to 0, above `max` maps to 100, anything in between is
/// interpolated linearly. A non-positive span (malformed thresholds) always
/// yields 0.
pub fn normalize_score(raw: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() || raw.is_nan() {
        return 0.0;
    }
    if raw < min {
        return 0.0;
    }
    if raw > max {
        return 100.0;
    }
    clamp_percent((raw - min) / span * 100.0)
}

/// Clamp to 0..=100, mapping NaN to 0
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Human-readable band for a confidence value
pub fn confidence_label(confidence: f64) -> &'static str {
    if confidence >= 80.0 {
        "Very High"
    } else if confidence >= 60.0 {
        "High"
    } else if confidence >= 40.0 {
        "Moderate"
    } else if confidence >= 20.0 {
        "Low"
    } else {
        "Very Low"
    }
}
