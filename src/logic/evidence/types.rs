//! Evidence Types
//!
//! Core data structures for side classification. No decision logic here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::sidedness::Dist;

// ============================================================================
// SIDE
// ============================================================================

/// Where a module can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    ClientOnly,
    ServerOnly,
    Universal,
    /// Never produced by the weighted engine
    Unknown,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::ClientOnly, Side::ServerOnly, Side::Universal, Side::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::ClientOnly => "CLIENT_ONLY",
            Side::ServerOnly => "SERVER_ONLY",
            Side::Universal => "UNIVERSAL",
            Side::Unknown => "UNKNOWN",
        }
    }

    pub fn from_dist(dist: Dist) -> Self {
        match dist {
            Dist::Client => Side::ClientOnly,
            Dist::DedicatedServer => Side::ServerOnly,
        }
    }

    /// Parse the upper-case form (`CLIENT_ONLY`); anything else is Unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT_ONLY" => Side::ClientOnly,
            "SERVER_ONLY" => Side::ServerOnly,
            "UNIVERSAL" => Side::Universal,
            _ => Side::Unknown,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// EVIDENCE SOURCE
// ============================================================================

/// Closed set of evidence producers, each with a stable id and base table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    ManualCuration,
    DisplayTest,
    ClientSubscribers,
    ServerSubscribers,
    UngatedClient,
    GatedClient,
    ServerClasses,
    Dependencies,
    ModManifest,
    FileStructure,
    /// Feedback on the final verdict as a whole
    Pipeline,
}

impl EvidenceSource {
    pub const COUNT: usize = 11;

    pub const ALL: [EvidenceSource; Self::COUNT] = [
        EvidenceSource::ManualCuration,
        EvidenceSource::DisplayTest,
        EvidenceSource::ClientSubscribers,
        EvidenceSource::ServerSubscribers,
        EvidenceSource::UngatedClient,
        EvidenceSource::GatedClient,
        EvidenceSource::ServerClasses,
        EvidenceSource::Dependencies,
        EvidenceSource::ModManifest,
        EvidenceSource::FileStructure,
        EvidenceSource::Pipeline,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EvidenceSource::ManualCuration => "manual_curation",
            EvidenceSource::DisplayTest => "display_test_registration",
            EvidenceSource::ClientSubscribers => "client_event_subscribers",
            EvidenceSource::ServerSubscribers => "server_event_subscribers",
            EvidenceSource::UngatedClient => "ungated_client_references",
            EvidenceSource::GatedClient => "gated_client_references",
            EvidenceSource::ServerClasses => "server_class_references",
            EvidenceSource::Dependencies => "dependency_analysis",
            EvidenceSource::ModManifest => "mod_manifest",
            EvidenceSource::FileStructure => "file_structure",
            EvidenceSource::Pipeline => "hybrid_classification",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.id() == id)
    }

    /// Stable slot for per-source tables
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Base (weight, confidence). Curation confidence comes from the entry;
    /// the pipeline pseudo-source never produces evidence.
    pub fn base(&self) -> (f64, f64) {
        match self {
            EvidenceSource::ManualCuration => (1.00, 1.00),
            EvidenceSource::DisplayTest => (0.95, 0.85),
            EvidenceSource::ClientSubscribers => (0.70, 0.75),
            EvidenceSource::ServerSubscribers => (0.70, 0.75),
            EvidenceSource::UngatedClient => (0.85, 0.70),
            EvidenceSource::GatedClient => (0.60, 0.60),
            EvidenceSource::ServerClasses => (0.75, 0.65),
            EvidenceSource::Dependencies => (0.40, 0.50),
            EvidenceSource::ModManifest => (0.80, 0.80),
            EvidenceSource::FileStructure => (0.20, 0.30),
            EvidenceSource::Pipeline => (0.50, 0.50),
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// EVIDENCE
// ============================================================================

/// One piece of evidence. Immutable once built; weight and confidence are
/// clamped into [0, 1] independently (NaN becomes 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    source: EvidenceSource,
    suggested_side: Side,
    weight: f64,
    confidence: f64,
    reason: String,
    created_at: DateTime<Utc>,
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Evidence {
    pub fn new(
        source: EvidenceSource,
        suggested_side: Side,
        weight: f64,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source,
            suggested_side,
            weight: clamp_unit(weight),
            confidence: clamp_unit(confidence),
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }

    /// Evidence at the source's base weight with an explicit confidence
    pub fn from_source(source: EvidenceSource, side: Side, confidence: f64, reason: impl Into<String>) -> Self {
        let (weight, _) = source.base();
        Self::new(source, side, weight, confidence, reason)
    }

    pub fn source(&self) -> EvidenceSource {
        self.source
    }

    pub fn suggested_side(&self) -> Side {
        self.suggested_side
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn score(&self) -> f64 {
        self.weight * self.confidence
    }

    pub fn is_definitive(&self) -> bool {
        self.confidence > super::rules::DEFINITIVE_CONFIDENCE && self.weight > super::rules::DEFINITIVE_WEIGHT
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (weight {:.2}, confidence {:.2}, score {:.2}): {}",
            self.source,
            self.suggested_side,
            self.weight,
            self.confidence,
            self.score(),
            self.reason
        )
    }
}

// ============================================================================
// SCORES & VERDICT
// ============================================================================

/// Summed scores per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideScores {
    pub client_only: f64,
    pub server_only: f64,
    pub universal: f64,
    pub unknown: f64,
}

impl SideScores {
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::ClientOnly => self.client_only,
            Side::ServerOnly => self.server_only,
            Side::Universal => self.universal,
            Side::Unknown => self.unknown,
        }
    }

    pub fn add(&mut self, side: Side, score: f64) {
        match side {
            Side::ClientOnly => self.client_only += score,
            Side::ServerOnly => self.server_only += score,
            Side::Universal => self.universal += score,
            Side::Unknown => self.unknown += score,
        }
    }
}

/// Which step of the decision procedure produced the side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    NoEvidence,
    Definitive(EvidenceSource),
    WeightedScore,
    TooClose,
    /// Numbered rule of the rule-based classifier
    Fallback(u8),
}

/// Result of reducing an evidence list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub side: Side,
    pub rule: DecisionRule,
    pub scores: SideScores,
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn new(side: Side, rule: DecisionRule) -> Self {
        Self { side, rule, scores: SideScores::default(), reasons: Vec::new() }
    }
}
