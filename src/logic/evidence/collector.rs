//! Evidence collection
//!
//! Turns curation, dependency ids and a jar report into the ordered
//! evidence list: curation, dependencies, bytecode signals, manifest,
//! file structure. Each confidence passes through the supplied adjuster
//! (normally the accuracy tracker).

use crate::logic::sidedness::JarReport;

use super::rules::{CLIENT_ONLY_DEPENDENCIES, SERVER_ONLY_DEPENDENCIES};
use super::types::{Evidence, EvidenceSource, Side};

/// A curated decision reduced to what the evidence layer needs
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedSignal {
    pub side: Side,
    pub confidence: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceInputs<'a> {
    pub curated: Option<&'a CuratedSignal>,
    pub dependencies: &'a [String],
    pub report: Option<&'a JarReport>,
}

pub fn collect_evidence<F>(inputs: &EvidenceInputs<'_>, adjust: F) -> Vec<Evidence>
where
    F: Fn(EvidenceSource, f64) -> f64,
{
    let mut out = Vec::new();

    // Curation carries its own confidence; an undecided entry says nothing
    if let Some(curated) = inputs.curated.filter(|c| c.side != Side::Unknown) {
        let source = EvidenceSource::ManualCuration;
        let (weight, _) = source.base();
        out.push(Evidence::new(
            source,
            curated.side,
            weight,
            adjust(source, curated.confidence),
            format!("Manually curated (confidence {:.2}): {}", curated.confidence, curated.summary),
        ));
    }

    let mut push = |source: EvidenceSource, side: Side, reason: String| {
        let (_, confidence) = source.base();
        out.push(Evidence::from_source(source, side, adjust(source, confidence), reason));
    };

    let client_deps = count_known(inputs.dependencies, CLIENT_ONLY_DEPENDENCIES);
    let server_deps = count_known(inputs.dependencies, SERVER_ONLY_DEPENDENCIES);
    if client_deps > 0 {
        push(
            EvidenceSource::Dependencies,
            Side::ClientOnly,
            format!("Depends on {} known client-only mods", client_deps),
        );
    }
    if server_deps > 0 {
        push(
            EvidenceSource::Dependencies,
            Side::ServerOnly,
            format!("Depends on {} known server-only mods", server_deps),
        );
    }

    let Some(report) = inputs.report else {
        return out;
    };
    let scan = &report.scan;

    if let Some(dist) = scan.display_test.declared() {
        push(
            EvidenceSource::DisplayTest,
            Side::from_dist(dist),
            format!("Display test registration declares {}", dist.as_str()),
        );
    }
    if scan.has_client_subscribers() {
        push(
            EvidenceSource::ClientSubscribers,
            Side::ClientOnly,
            format!("Has {} client event subscribers", scan.client_subscribers.len()),
        );
    }
    if scan.has_server_subscribers() {
        push(
            EvidenceSource::ServerSubscribers,
            Side::ServerOnly,
            format!("Has {} server event subscribers", scan.server_subscribers.len()),
        );
    }
    if scan.has_ungated_client_refs() {
        push(
            EvidenceSource::UngatedClient,
            Side::ClientOnly,
            format!("Contains {} ungated client-only references", scan.ungated_client_refs.len()),
        );
    } else if scan.has_gated_client_refs() {
        push(
            EvidenceSource::GatedClient,
            Side::Universal,
            format!("Has {} properly gated client references", scan.gated_client_refs.len()),
        );
    }
    if !scan.server_refs.is_empty() {
        push(
            EvidenceSource::ServerClasses,
            Side::ServerOnly,
            format!("References {} server-only classes", scan.server_refs.len()),
        );
    }

    if let Some(dist) = report.manifest.as_ref().and_then(|m| m.declared_dist) {
        push(
            EvidenceSource::ModManifest,
            Side::from_dist(dist),
            format!("Mod manifest declares {}", dist.as_str()),
        );
    }

    let layout = report.layout;
    match (layout.client_files, layout.server_files) {
        (0, 0) => {}
        (c, 0) => push(
            EvidenceSource::FileStructure,
            Side::ClientOnly,
            format!("Has {} client-specific files, no server files", c),
        ),
        (0, s) => push(
            EvidenceSource::FileStructure,
            Side::ServerOnly,
            format!("Has {} server-specific files, no client files", s),
        ),
        (c, s) => push(
            EvidenceSource::FileStructure,
            Side::Universal,
            format!("Has both client ({}) and server ({}) files", c, s),
        ),
    }

    out
}

fn count_known(dependencies: &[String], known: &[&str]) -> usize {
    dependencies
        .iter()
        .filter(|d| known.contains(&d.to_lowercase().as_str()))
        .count()
}
