//! Adaptive accuracy tracker
//!
//! Per-source prediction counters kept in a fixed table indexed by the
//! closed `EvidenceSource` enum. Every counter is an atomic, so recording
//! and reading never take a lock. Stats live for the process only.

use std::sync::atomic::{AtomicU64, Ordering};

use log::info;
use serde::{Deserialize, Serialize};

use crate::logic::evidence::EvidenceSource;

use super::policy::TrackerPolicy;

/// Accuracy reported for a source with no predictions yet
pub const NEUTRAL_ACCURACY: f64 = 0.5;

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Default)]
struct AccuracyStats {
    total: AtomicU64,
    correct: AtomicU64,
    consecutive_correct: AtomicU64,
    consecutive_incorrect: AtomicU64,
}

impl AccuracyStats {
    fn record(&self, was_correct: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if was_correct {
            self.correct.fetch_add(1, Ordering::Relaxed);
            self.consecutive_correct.fetch_add(1, Ordering::Relaxed);
            self.consecutive_incorrect.store(0, Ordering::Relaxed);
        } else {
            self.consecutive_incorrect.fetch_add(1, Ordering::Relaxed);
            self.consecutive_correct.store(0, Ordering::Relaxed);
        }
    }

    fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.correct.store(0, Ordering::Relaxed);
        self.consecutive_correct.store(0, Ordering::Relaxed);
        self.consecutive_incorrect.store(0, Ordering::Relaxed);
    }

    fn snapshot(&self, source: EvidenceSource) -> StatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let correct = self.correct.load(Ordering::Relaxed);
        StatsSnapshot {
            source,
            total_predictions: total,
            correct_predictions: correct,
            consecutive_correct: self.consecutive_correct.load(Ordering::Relaxed),
            consecutive_incorrect: self.consecutive_incorrect.load(Ordering::Relaxed),
            accuracy: accuracy_of(correct, total),
        }
    }
}

fn accuracy_of(correct: u64, total: u64) -> f64 {
    if total == 0 {
        NEUTRAL_ACCURACY
    } else {
        correct as f64 / total as f64
    }
}

/// Point-in-time copy of one source's counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub source: EvidenceSource,
    pub total_predictions: u64,
    pub correct_predictions: u64,
    pub consecutive_correct: u64,
    pub consecutive_incorrect: u64,
    pub accuracy: f64,
}

// ============================================================================
// TRACKER
// ============================================================================

#[derive(Debug)]
pub struct AccuracyTracker {
    stats: [AccuracyStats; EvidenceSource::COUNT],
    policy: TrackerPolicy,
}

impl Default for AccuracyTracker {
    fn default() -> Self {
        Self::new(TrackerPolicy::default())
    }
}

impl AccuracyTracker {
    pub fn new(policy: TrackerPolicy) -> Self {
        Self {
            stats: Default::default(),
            policy: policy.normalized(),
        }
    }

    pub fn policy(&self) -> &TrackerPolicy {
        &self.policy
    }

    pub fn record_result(&self, source: EvidenceSource, was_correct: bool) {
        self.stats[source.index()].record(was_correct);
    }

    pub fn accuracy(&self, source: EvidenceSource) -> f64 {
        let stats = &self.stats[source.index()];
        accuracy_of(stats.correct.load(Ordering::Relaxed), stats.total.load(Ordering::Relaxed))
    }

    pub fn is_reliable(&self, source: EvidenceSource) -> bool {
        self.stats[source.index()].total.load(Ordering::Relaxed) >= self.policy.min_samples
    }

    /// Base confidence scaled by the source's track record
    pub fn adjusted_confidence(&self, source: EvidenceSource, base: f64) -> f64 {
        let snap = self.stats[source.index()].snapshot(source);
        let p = &self.policy;

        if snap.total_predictions < p.min_samples {
            return base;
        }

        let multiplier = if snap.accuracy > p.high_accuracy {
            p.high_accuracy_multiplier
        } else if snap.accuracy < p.low_accuracy {
            p.low_accuracy_multiplier
        } else if snap.consecutive_incorrect >= p.incorrect_streak {
            p.incorrect_streak_multiplier
        } else if snap.consecutive_correct >= p.correct_streak {
            p.correct_streak_multiplier
        } else {
            1.0
        };

        (base * multiplier).clamp(p.floor, p.ceiling)
    }

    pub fn snapshot(&self) -> Vec<StatsSnapshot> {
        EvidenceSource::ALL
            .iter()
            .map(|s| self.stats[s.index()].snapshot(*s))
            .collect()
    }

    /// Log reliable sources, most accurate first
    pub fn log_summary(&self) {
        let mut reliable: Vec<StatsSnapshot> = self
            .snapshot()
            .into_iter()
            .filter(|s| s.total_predictions >= self.policy.min_samples)
            .collect();

        if reliable.is_empty() {
            info!("Accuracy tracker: no source has enough samples yet");
            return;
        }

        reliable.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy));
        info!("Accuracy tracker summary ({} reliable sources):", reliable.len());
        for s in reliable {
            info!(
                "  {}: {:.1}% ({}/{}), streak +{} / -{}",
                s.source,
                s.accuracy * 100.0,
                s.correct_predictions,
                s.total_predictions,
                s.consecutive_correct,
                s.consecutive_incorrect
            );
        }
    }

    pub fn reset(&self) {
        for stats in &self.stats {
            stats.reset();
        }
    }
}
