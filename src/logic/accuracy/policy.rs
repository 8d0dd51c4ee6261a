//! Confidence adjustment policy

use serde::{Deserialize, Serialize};

/// Thresholds and multipliers used by `AccuracyTracker::adjusted_confidence`.
/// Rules are evaluated in field order; the first match applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerPolicy {
    /// Below this many predictions the base confidence is returned as-is
    pub min_samples: u64,

    pub high_accuracy: f64,
    pub high_accuracy_multiplier: f64,

    pub low_accuracy: f64,
    pub low_accuracy_multiplier: f64,

    pub incorrect_streak: u64,
    pub incorrect_streak_multiplier: f64,

    pub correct_streak: u64,
    pub correct_streak_multiplier: f64,

    /// Clamp applied after the multiplier
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            min_samples: 10,
            high_accuracy: 0.9,
            high_accuracy_multiplier: 1.1,
            low_accuracy: 0.6,
            low_accuracy_multiplier: 0.7,
            incorrect_streak: 3,
            incorrect_streak_multiplier: 0.5,
            correct_streak: 5,
            correct_streak_multiplier: 1.2,
            floor: 0.1,
            ceiling: 1.0,
        }
    }
}

impl TrackerPolicy {
    /// Keep floor <= ceiling inside [0, 1]; an inverted pair resets both
    pub fn normalized(mut self) -> Self {
        self.floor = if self.floor.is_finite() { self.floor.clamp(0.0, 1.0) } else { 0.1 };
        self.ceiling = if self.ceiling.is_finite() { self.ceiling.clamp(0.0, 1.0) } else { 1.0 };
        if self.floor > self.ceiling {
            let defaults = Self::default();
            self.floor = defaults.floor;
            self.ceiling = defaults.ceiling;
        }
        self
    }
}
