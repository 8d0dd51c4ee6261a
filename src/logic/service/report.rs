//! Run report

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::logic::evidence::{DecisionRule, Side};
use crate::logic::quarantine::RenameRecord;
use crate::logic::sidedness::Dist;

use super::classifier::{Classification, ResolutionSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleOutcome {
    pub mod_id: String,
    pub path: PathBuf,
    pub side: Side,
    pub source: ResolutionSource,
    pub rule: Option<DecisionRule>,
}

impl ModuleOutcome {
    pub fn new(path: PathBuf, classification: &Classification) -> Self {
        Self {
            mod_id: classification.mod_id.clone(),
            path,
            side: classification.side,
            source: classification.source,
            rule: classification.verdict.as_ref().map(|v| v.rule),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub host_dist: Option<Dist>,
    pub dry_run: bool,
    pub modules: Vec<ModuleOutcome>,
    pub renames: Vec<RenameRecord>,
    /// Files a dry run would have renamed
    pub pending_renames: Vec<PathBuf>,
    pub rename_errors: Vec<String>,
}

impl RunReport {
    pub fn new(host_dist: Option<Dist>, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            host_dist,
            dry_run,
            modules: Vec::new(),
            renames: Vec::new(),
            pending_renames: Vec::new(),
            rename_errors: Vec::new(),
        }
    }

    /// Ignored and disabled modules are not counted
    pub fn distribution(&self) -> BTreeMap<Side, usize> {
        let mut counts = BTreeMap::new();
        for m in self.classified() {
            *counts.entry(m.side).or_insert(0) += 1;
        }
        counts
    }

    pub fn by_source(&self) -> BTreeMap<ResolutionSource, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.modules {
            *counts.entry(m.source).or_insert(0) += 1;
        }
        counts
    }

    pub fn outcome(&self, mod_id: &str) -> Option<&ModuleOutcome> {
        self.modules.iter().find(|m| m.mod_id == mod_id)
    }

    fn classified(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.modules
            .iter()
            .filter(|m| !matches!(m.source, ResolutionSource::Ignored | ResolutionSource::Disabled))
    }

    pub fn log_summary(&self) {
        info!("=== Classification Distribution ===");
        for (side, count) in self.distribution() {
            info!("{}: {} mods", side, count);
        }
        for (source, count) in self.by_source() {
            info!("  via {:?}: {}", source, count);
        }
        if !self.renames.is_empty() {
            info!("Renamed {} files", self.renames.len());
        }
        if !self.pending_renames.is_empty() {
            info!("Dry run: {} files would be renamed", self.pending_renames.len());
        }
        info!(
            "Run took {} ms",
            (self.finished_at - self.started_at).num_milliseconds()
        );
    }
}
