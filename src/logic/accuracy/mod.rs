//! Accuracy Module
//!
//! Tracks how often each evidence source was right and scales its
//! confidence accordingly.

pub mod policy;
pub mod tracker;

pub use policy::TrackerPolicy;
pub use tracker::{AccuracyTracker, StatsSnapshot, NEUTRAL_ACCURACY};
