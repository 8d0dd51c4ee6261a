//! Curation Store
//!
//! Lower-cased id → curated entry. Read-mostly; overrides may be added or
//! removed while a run is in progress.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{error, info};
use parking_lot::RwLock;

use crate::logic::evidence::Side;

use super::loader::load_file;
use super::types::CuratedEntry;

pub const RUNTIME_OVERRIDE_SOURCE: &str = "runtime_override";
pub const FALLBACK_SOURCE: &str = "hardcoded_fallback";

#[derive(Debug, Default)]
pub struct CurationStore {
    entries: RwLock<HashMap<String, CuratedEntry>>,
}

impl CurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CuratedEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.write();
            for entry in entries {
                map.insert(entry.mod_id.to_lowercase(), entry);
            }
        }
        store
    }

    /// Missing file → empty store; unreadable or invalid file → built-in fallback
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No curated file at {}, relying on analysis only", path.display());
            return Self::new();
        }
        match load_file(path) {
            Ok(entries) => {
                let store = Self::from_entries(entries);
                info!("Loaded {} curated mod classifications from {}", store.len(), path.display());
                store
            }
            Err(e) => {
                error!("Failed to load curated mods ({}), using minimal fallback", e);
                Self::builtin_fallback()
            }
        }
    }

    pub fn builtin_fallback() -> Self {
        let fallback = |id: &str, name: &str, confidence: f64| CuratedEntry {
            mod_id: id.to_string(),
            name: name.to_string(),
            side: Side::ClientOnly,
            confidence,
            source: FALLBACK_SOURCE.to_string(),
            summary: "Built-in fallback".to_string(),
            scanned_at: None,
        };
        let store = Self::from_entries([
            fallback("jei", "Just Enough Items", 0.95),
            fallback("sodium", "Sodium", 0.99),
        ]);
        info!("Loaded {} minimal fallback curations", store.len());
        store
    }

    pub fn get(&self, mod_id: &str) -> Option<CuratedEntry> {
        self.entries.read().get(&mod_id.to_lowercase()).cloned()
    }

    pub fn side_of(&self, mod_id: &str) -> Option<Side> {
        self.entries.read().get(&mod_id.to_lowercase()).map(|e| e.side)
    }

    pub fn contains(&self, mod_id: &str) -> bool {
        self.entries.read().contains_key(&mod_id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Replaces any existing entry with a full-confidence override
    pub fn add_override(&self, mod_id: &str, side: Side, reason: &str) {
        let id = mod_id.to_lowercase();
        let entry = CuratedEntry {
            mod_id: id.clone(),
            name: mod_id.to_string(),
            side,
            confidence: 1.0,
            source: RUNTIME_OVERRIDE_SOURCE.to_string(),
            summary: reason.to_string(),
            scanned_at: None,
        };
        self.entries.write().insert(id, entry);
        info!("Added manual override: {} -> {} ({})", mod_id, side, reason);
    }

    pub fn remove_override(&self, mod_id: &str) -> Option<CuratedEntry> {
        let removed = self.entries.write().remove(&mod_id.to_lowercase());
        if removed.is_some() {
            info!("Removed manual override for {}", mod_id);
        }
        removed
    }

    pub fn counts_by_side(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.read().values() {
            *counts.entry(entry.side.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn counts_by_source(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.read().values() {
            *counts.entry(entry.source.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn average_confidence(&self) -> f64 {
        let entries = self.entries.read();
        if entries.is_empty() {
            return 0.0;
        }
        entries.values().map(|e| e.confidence).sum::<f64>() / entries.len() as f64
    }

    pub fn log_summary(&self) {
        info!("=== Curation Summary ===");
        info!("Total curated mods: {}", self.len());
        info!("By classification:");
        for (side, count) in self.counts_by_side() {
            info!("  {}: {} mods", side, count);
        }
        info!("By source:");
        for (source, count) in self.counts_by_source() {
            info!("  {}: {} mods", source, count);
        }
        info!("Average confidence: {:.2}", self.average_confidence());
    }
}
