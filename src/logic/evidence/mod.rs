//! Evidence Module
//!
//! Weighted side classification. This is where a module's signals become
//! CLIENT_ONLY / SERVER_ONLY / UNIVERSAL.
//!
//! ## Structure
//! - `types`: Side, Evidence, EvidenceSource, Verdict
//! - `rules`: thresholds, known dependencies, aggregation policy
//! - `collector`: builds the ordered evidence list
//! - `aggregator`: weighted decision procedure
//! - `fallback`: rule-based classifier
//!
//! ## Usage
//! ```ignore
//! use crate::logic::evidence::{aggregate, collect_evidence, EvidenceInputs};
//!
//! let evidence = collect_evidence(&inputs, |source, base| tracker.adjusted_confidence(source, base));
//! let verdict = aggregate(&evidence);
//! ```

pub mod types;
pub mod rules;
pub mod collector;
pub mod aggregator;
pub mod fallback;


pub use types::{DecisionRule, Evidence, EvidenceSource, Side, SideScores, Verdict};
pub use rules::{AggregationPolicy, DEFAULT_MARGIN, DEFINITIVE_CONFIDENCE, DEFINITIVE_WEIGHT};
pub use collector::{collect_evidence, CuratedSignal, EvidenceInputs};
pub use aggregator::{aggregate, aggregate_with_policy};
pub use fallback::{classify_fallback, FallbackSignals};
