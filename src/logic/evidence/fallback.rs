//! Rule-based fallback classifier
//!
//! Used when weighted analysis is disabled. Works directly on the extractor
//! flags and the declared side; first matching rule wins.

use serde::{Deserialize, Serialize};

use crate::logic::sidedness::{Dist, ModuleScan};

use super::types::{DecisionRule, Side, Verdict};

/// Inputs of the rule table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSignals {
    pub declared_server: bool,
    pub declared_client: bool,
    pub has_ungated_client_refs: bool,
    pub has_gated_client_refs: bool,
    pub has_client_subscribers: bool,
    pub has_server_subscribers: bool,
    pub has_server_refs: bool,
}

impl FallbackSignals {
    /// Display-test declaration and manifest declaration are merged
    pub fn from_scan(scan: &ModuleScan, manifest_dist: Option<Dist>) -> Self {
        Self {
            declared_server: scan.display_test.server_only || manifest_dist == Some(Dist::DedicatedServer),
            declared_client: scan.display_test.client_only || manifest_dist == Some(Dist::Client),
            has_ungated_client_refs: scan.has_ungated_client_refs(),
            has_gated_client_refs: scan.has_gated_client_refs(),
            has_client_subscribers: scan.has_client_subscribers(),
            has_server_subscribers: scan.has_server_subscribers(),
            has_server_refs: !scan.server_refs.is_empty(),
        }
    }

    fn has_server_code(&self) -> bool {
        self.has_server_refs || self.has_server_subscribers
    }
}

pub fn classify_fallback(signals: &FallbackSignals) -> Verdict {
    let s = signals;
    let server_code = s.has_server_code();

    let (side, rule, reason) = if s.declared_server {
        (Side::ServerOnly, 1, "Declared server-only")
    } else if s.declared_client {
        (Side::ClientOnly, 1, "Declared client-only")
    } else if s.has_ungated_client_refs {
        (Side::ClientOnly, 2, "Ungated client references")
    } else if s.has_client_subscribers && !s.has_server_subscribers && !server_code {
        (Side::ClientOnly, 3, "Only client subscribers")
    } else if s.has_server_subscribers && !s.has_client_subscribers && !s.has_gated_client_refs {
        (Side::ServerOnly, 4, "Only server subscribers")
    } else if (s.has_gated_client_refs || s.has_client_subscribers) && server_code {
        (Side::Universal, 5, "Gated client code alongside server code")
    } else if server_code && !s.has_gated_client_refs && !s.has_client_subscribers {
        (Side::ServerOnly, 6, "Server code without client code")
    } else {
        (Side::Universal, 7, "No decisive signals")
    };

    let mut verdict = Verdict::new(side, DecisionRule::Fallback(rule));
    verdict.reasons.push(format!("Rule {}: {}", rule, reason));
    verdict
}
