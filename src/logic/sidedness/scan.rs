//! Module-level summary of everything the extractor saw

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::rules::Dist;

/// Display-test registration signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTestSignals {
    pub registered: bool,
    pub server_only: bool,
    pub client_only: bool,
}

impl DisplayTestSignals {
    /// Declared side; the server declaration is checked first
    pub fn declared(&self) -> Option<Dist> {
        if self.server_only {
            Some(Dist::DedicatedServer)
        } else if self.client_only {
            Some(Dist::Client)
        } else {
            None
        }
    }
}

/// Extractor output for one module, merged across all scanned units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleScan {
    pub gated_client_refs: BTreeSet<String>,
    pub ungated_client_refs: BTreeSet<String>,
    pub server_refs: BTreeSet<String>,
    pub client_subscribers: BTreeSet<String>,
    pub server_subscribers: BTreeSet<String>,
    pub has_client_only_units: bool,
    pub has_server_only_units: bool,
    pub has_dist_checks: bool,
    pub display_test: DisplayTestSignals,
    pub units_scanned: usize,
    pub units_skipped: usize,
}

impl ModuleScan {
    pub fn has_ungated_client_refs(&self) -> bool {
        !self.ungated_client_refs.is_empty()
    }

    pub fn has_gated_client_refs(&self) -> bool {
        !self.gated_client_refs.is_empty()
    }

    /// Distinct client references, gated or not
    pub fn client_ref_count(&self) -> usize {
        self.gated_client_refs.union(&self.ungated_client_refs).count()
    }

    pub fn has_client_subscribers(&self) -> bool {
        !self.client_subscribers.is_empty()
    }

    pub fn has_server_subscribers(&self) -> bool {
        !self.server_subscribers.is_empty()
    }

    /// Server references or server subscribers
    pub fn has_server_code(&self) -> bool {
        !self.server_refs.is_empty() || self.has_server_subscribers()
    }

    /// Fold another scan into this one
    pub fn merge(&mut self, other: ModuleScan) {
        self.gated_client_refs.extend(other.gated_client_refs);
        self.ungated_client_refs.extend(other.ungated_client_refs);
        self.server_refs.extend(other.server_refs);
        self.client_subscribers.extend(other.client_subscribers);
        self.server_subscribers.extend(other.server_subscribers);
        self.has_client_only_units |= other.has_client_only_units;
        self.has_server_only_units |= other.has_server_only_units;
        self.has_dist_checks |= other.has_dist_checks;
        self.display_test.registered |= other.display_test.registered;
        self.display_test.server_only |= other.display_test.server_only;
        self.display_test.client_only |= other.display_test.client_only;
        self.units_scanned += other.units_scanned;
        self.units_skipped += other.units_skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_prefers_server() {
        let both = DisplayTestSignals { registered: true, server_only: true, client_only: true };
        assert_eq!(both.declared(), Some(Dist::DedicatedServer));
        assert_eq!(DisplayTestSignals::default().declared(), None);
    }

    #[test]
    fn test_server_code_includes_subscribers() {
        let mut scan = ModuleScan::default();
        assert!(!scan.has_server_code());
        scan.server_subscribers.insert("a/B".to_string());
        assert!(scan.has_server_code());
    }

    #[test]
    fn test_merge_unions_sets_and_flags() {
        let mut a = ModuleScan::default();
        a.gated_client_refs.insert("net/minecraft/client/Minecraft".to_string());
        a.units_scanned = 2;

        let mut b = ModuleScan::default();
        b.ungated_client_refs.insert("net/minecraft/client/Minecraft".to_string());
        b.has_dist_checks = true;
        b.units_scanned = 1;
        b.units_skipped = 1;

        a.merge(b);
        assert_eq!(a.client_ref_count(), 1);
        assert!(a.has_dist_checks);
        assert_eq!(a.units_scanned, 3);
        assert_eq!(a.units_skipped, 1);
    }
}
