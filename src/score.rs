//! Accessibility score derivation.
//!
//! The score is the fraction of the four tracked features a place offers, on a
//! 0.00..=1.00 scale with two decimals. It is the only scale used anywhere in the
//! service (responses, storage, comparisons).

use crate::models::{AccessibilityFeature, AccessibilityFlags, Place};

/// Number of decimal places kept in a stored score.
const SCALE: i32 = 2;

/// calculate
///
/// `enabled / 4`, rounded half-up to two decimals. Pure and total.
pub fn calculate(flags: AccessibilityFlags) -> f64 {
    let enabled = AccessibilityFeature::ALL
        .iter()
        .filter(|feature| feature.is_enabled(&flags))
        .count();
    let total = AccessibilityFeature::ALL.len();
    round_half_up(enabled as f64 / total as f64, SCALE)
}

/// Recomputes the stored score from the place's current flags.
pub fn refresh(place: &mut Place) {
    place.accessibility_score = calculate(place.flags());
}

fn round_half_up(value: f64, scale: i32) -> f64 {
    let factor = 10f64.powi(scale);
    // f64::round rounds half away from zero, which is half-up for the non-negative scores.
    (value * factor).round() / factor
}
