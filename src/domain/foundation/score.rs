//! Score value objects for the 1-5 rating scale and model confidence.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A rating on the interview's 1-5 scale (1 = significant friction, 5 = none).
///
/// Fractional values are allowed; the model frequently infers scores like 3.5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawScore(f64);

impl RawScore {
    /// Neutral midpoint used when a dimension was not adequately discussed.
    pub const NEUTRAL: RawScore = RawScore(3.0);

    /// Creates a score, rejecting values outside [1, 5].
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !(1.0..=5.0).contains(&value) {
            return Err(ValidationError::out_of_range("score", 1.0, 5.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw 1-5 value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Normalizes the 1-5 scale to 0-100.
    ///
    /// `(raw - 1) / 4 * 100`: 1 -> 0, 3 -> 50, 5 -> 100.
    pub fn normalize(&self) -> f64 {
        (self.0 - 1.0) / 4.0 * 100.0
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Model confidence in an inferred rating, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Confidence attached to neutral-default ratings.
    pub const LOW: Confidence = Confidence(0.3);

    /// Creates a confidence value, clamping into [0, 1].
    ///
    /// Model output occasionally strays slightly outside the range; clamping
    /// is preferable to discarding an otherwise usable rating.
    pub fn clamped(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
