//! Evidence Aggregator
//!
//! Reduces an ordered evidence list to one verdict:
//! 1. no evidence → UNIVERSAL
//! 2. first definitive evidence wins
//! 3. otherwise per-side score sums, and the leader must beat every other
//!    bucket by the policy margin or the result is UNIVERSAL

use log::debug;

use super::rules::AggregationPolicy;
use super::types::{DecisionRule, Evidence, Side, SideScores, Verdict};

/// Candidate order for the winner; ties keep the earlier entry
const CANDIDATES: [Side; 3] = [Side::Universal, Side::ClientOnly, Side::ServerOnly];

pub fn aggregate(evidence: &[Evidence]) -> Verdict {
    aggregate_with_policy(evidence, &AggregationPolicy::default())
}

pub fn aggregate_with_policy(evidence: &[Evidence], policy: &AggregationPolicy) -> Verdict {
    if evidence.is_empty() {
        let mut verdict = Verdict::new(Side::Universal, DecisionRule::NoEvidence);
        verdict.reasons.push("No evidence, assuming universal".to_string());
        return verdict;
    }

    let mut scores = SideScores::default();
    for ev in evidence {
        scores.add(ev.suggested_side(), ev.score());
    }

    // UNKNOWN suggestions may not short-circuit
    if let Some(def) = evidence
        .iter()
        .find(|e| e.is_definitive() && e.suggested_side() != Side::Unknown)
    {
        debug!("Definitive evidence: {}", def);
        return Verdict {
            side: def.suggested_side(),
            rule: DecisionRule::Definitive(def.source()),
            scores,
            reasons: vec![format!("Definitive: {}", def.reason())],
        };
    }

    let mut best = CANDIDATES[0];
    for side in &CANDIDATES[1..] {
        if scores.get(*side) > scores.get(best) {
            best = *side;
        }
    }
    let best_score = scores.get(best);
    let second_score = Side::ALL
        .iter()
        .filter(|s| **s != best)
        .map(|s| scores.get(*s))
        .fold(0.0_f64, f64::max);

    let mut reasons: Vec<String> = evidence.iter().map(|e| e.to_string()).collect();

    if best_score - second_score < policy.margin {
        reasons.push(format!(
            "Scores too close (best {} {:.2}, second {:.2}, margin {:.2}), assuming universal",
            best, best_score, second_score, policy.margin
        ));
        return Verdict { side: Side::Universal, rule: DecisionRule::TooClose, scores, reasons };
    }

    reasons.push(format!("{} leads with {:.2} over {:.2}", best, best_score, second_score));
    Verdict { side: best, rule: DecisionRule::WeightedScore, scores, reasons }
}
