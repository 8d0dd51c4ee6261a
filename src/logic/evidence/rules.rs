//! Aggregation Rules & Thresholds
//!
//! Constants and tunable policy only; the decision procedure lives in
//! `aggregator`.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Evidence above both of these short-circuits aggregation
pub const DEFINITIVE_CONFIDENCE: f64 = 0.95;
pub const DEFINITIVE_WEIGHT: f64 = 0.9;

/// Minimum lead of the winning side over the runner-up
pub const DEFAULT_MARGIN: f64 = 0.3;

// ============================================================================
// KNOWN DEPENDENCIES
// ============================================================================

pub const CLIENT_ONLY_DEPENDENCIES: &[&str] = &["optifine", "sodium", "iris", "rubidium", "jei"];
pub const SERVER_ONLY_DEPENDENCIES: &[&str] = &["servercore", "spark", "chunky"];

// ============================================================================
// CONFIGURABLE POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationPolicy {
    /// `best - second < margin` resolves to UNIVERSAL
    pub margin: f64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self { margin: DEFAULT_MARGIN }
    }
}

impl AggregationPolicy {
    /// Negative or non-finite margins fall back to the default
    pub fn normalized(self) -> Self {
        if self.margin.is_finite() && self.margin >= 0.0 {
            self
        } else {
            Self::default()
        }
    }
}
