//! Classification Service
//!
//! Per-module resolution: ignored → forced lists → curated / analysis.
//! Weighted mode feeds curation into the evidence list; rule mode returns a
//! known curated side directly and otherwise runs the fallback table.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::accuracy::AccuracyTracker;
use crate::logic::cache::ClassificationCache;
use crate::logic::config::ClassifierConfig;
use crate::logic::curation::{CuratedEntry, CurationStore};
use crate::logic::enumerate::ModuleDescriptor;
use crate::logic::evidence::{
    aggregate_with_policy, classify_fallback, collect_evidence, DecisionRule, Evidence, EvidenceInputs,
    EvidenceSource, FallbackSignals, Side, Verdict,
};
use crate::logic::sidedness::{inspect_jar, ArchiveError, JarReport};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("classification task failed: {0}")]
    Task(String),
}

/// How the final side was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Disabled,
    Ignored,
    Cached,
    Config,
    Curated,
    Heuristic,
    /// Analysis panicked; side forced to UNIVERSAL
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub mod_id: String,
    pub side: Side,
    pub source: ResolutionSource,
    pub verdict: Option<Verdict>,
}

impl Classification {
    fn new(mod_id: &str, side: Side, source: ResolutionSource) -> Self {
        Self { mod_id: mod_id.to_string(), side, source, verdict: None }
    }

    pub fn failed(mod_id: &str) -> Self {
        Self::new(mod_id, Side::Universal, ResolutionSource::Failed)
    }
}

/// Everything the weighted engine saw for one jar
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub mod_id: String,
    pub curated: Option<CuratedEntry>,
    pub report: JarReport,
    pub evidence: Vec<Evidence>,
    pub verdict: Verdict,
    pub fallback: Verdict,
}

pub struct ClassificationService {
    config: ClassifierConfig,
    curation: Arc<CurationStore>,
    tracker: Arc<AccuracyTracker>,
    cache: Arc<ClassificationCache>,
}

impl ClassificationService {
    pub fn new(
        config: ClassifierConfig,
        curation: Arc<CurationStore>,
        tracker: Arc<AccuracyTracker>,
        cache: Arc<ClassificationCache>,
    ) -> Self {
        Self { config, curation, tracker, cache }
    }

    /// Fresh tracker and cache, policy taken from the config
    pub fn with_config(config: ClassifierConfig, curation: CurationStore) -> Self {
        let tracker = AccuracyTracker::new(config.accuracy);
        Self::new(config, Arc::new(curation), Arc::new(tracker), Arc::new(ClassificationCache::new()))
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn curation(&self) -> &CurationStore {
        &self.curation
    }

    pub fn tracker(&self) -> &AccuracyTracker {
        &self.tracker
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    /// Never fails; any internal failure yields UNIVERSAL
    pub fn classify(&self, module: &ModuleDescriptor) -> Side {
        self.classify_detailed(module).side
    }

    pub fn classify_detailed(&self, module: &ModuleDescriptor) -> Classification {
        let id = module.id.to_lowercase();

        if !self.config.enabled {
            return Classification::new(&id, Side::Unknown, ResolutionSource::Disabled);
        }
        if self.config.is_ignored(&id) {
            if self.config.verbose_logging {
                debug!("Skipping ignored mod: {}", id);
            }
            return Classification::new(&id, Side::Unknown, ResolutionSource::Ignored);
        }
        if let Some(side) = self.cache.get(&id) {
            return Classification::new(&id, side, ResolutionSource::Cached);
        }

        let mut outcome = match catch_unwind(AssertUnwindSafe(|| self.resolve(&id, module))) {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Classification of {} panicked, assuming universal", id);
                Classification::failed(&id)
            }
        };

        // A concurrent writer may have won; report what the run will use
        outcome.side = self.cache.insert_if_absent(&id, outcome.side);

        if self.config.verbose_logging || outcome.side != Side::Universal {
            info!("Classified mod {} as {} (source: {:?})", id, outcome.side, outcome.source);
        }
        outcome
    }

    fn resolve(&self, id: &str, module: &ModuleDescriptor) -> Classification {
        if let Some(side) = self.config.forced_side(id) {
            return Classification::new(id, side, ResolutionSource::Config);
        }

        let curated = self.curation.get(id);
        if self.config.enhanced_analysis {
            self.resolve_weighted(id, module, curated.as_ref())
        } else {
            self.resolve_rules(id, module, curated.as_ref())
        }
    }

    fn resolve_weighted(&self, id: &str, module: &ModuleDescriptor, curated: Option<&CuratedEntry>) -> Classification {
        let report = match inspect_jar(&module.path, self.config.max_classes_to_scan) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("No jar evidence for {}: {}", id, e);
                None
            }
        };
        let (evidence, verdict) = self.weigh(module, curated, report.as_ref());
        self.log_evidence(id, &evidence, &verdict);

        let source = match verdict.rule {
            DecisionRule::Definitive(EvidenceSource::ManualCuration) => ResolutionSource::Curated,
            _ => ResolutionSource::Heuristic,
        };
        Classification { mod_id: id.to_string(), side: verdict.side, source, verdict: Some(verdict) }
    }

    fn resolve_rules(&self, id: &str, module: &ModuleDescriptor, curated: Option<&CuratedEntry>) -> Classification {
        if let Some(entry) = curated.filter(|c| c.side != Side::Unknown) {
            return Classification::new(id, entry.side, ResolutionSource::Curated);
        }
        match inspect_jar(&module.path, self.config.max_classes_to_scan) {
            Ok(report) => {
                let verdict = fallback_verdict(&report);
                debug!("{}: {}", id, verdict.reasons.join("; "));
                Classification { mod_id: id.to_string(), side: verdict.side, source: ResolutionSource::Heuristic, verdict: Some(verdict) }
            }
            Err(e) => {
                debug!("Could not analyze jar file for mod {}: {}", id, e);
                Classification::new(id, Side::Unknown, ResolutionSource::Heuristic)
            }
        }
    }

    fn weigh(
        &self,
        module: &ModuleDescriptor,
        curated: Option<&CuratedEntry>,
        report: Option<&JarReport>,
    ) -> (Vec<Evidence>, Verdict) {
        let signal = curated.map(CuratedEntry::to_signal);
        let inputs = EvidenceInputs {
            curated: signal.as_ref(),
            dependencies: &module.dependencies,
            report,
        };
        let evidence = collect_evidence(&inputs, |source, base| self.adjust(source, base));
        let verdict = aggregate_with_policy(&evidence, &self.config.aggregation);
        (evidence, verdict)
    }

    fn adjust(&self, source: EvidenceSource, base: f64) -> f64 {
        if self.config.accuracy_tracking {
            self.tracker.adjusted_confidence(source, base)
        } else {
            base
        }
    }

    fn log_evidence(&self, id: &str, evidence: &[Evidence], verdict: &Verdict) {
        if !self.config.log_evidence_details {
            return;
        }
        debug!("Evidence for {} ({} items):", id, evidence.len());
        for ev in evidence {
            debug!("  {}", ev);
        }
        debug!("  => {} ({:?})", verdict.side, verdict.rule);
    }

    /// Full weighted and rule-based view of one jar; does not touch the cache
    pub fn inspect(&self, module: &ModuleDescriptor) -> Result<Inspection, ClassifyError> {
        let id = module.id.to_lowercase();
        let report = inspect_jar(&module.path, self.config.max_classes_to_scan)?;
        let curated = self.curation.get(&id);
        let (evidence, verdict) = self.weigh(module, curated.as_ref(), Some(&report));
        let fallback = fallback_verdict(&report);
        Ok(Inspection { mod_id: id, curated, report, evidence, verdict, fallback })
    }

    /// Feedback on a whole verdict, recorded against the pipeline source
    pub fn record_feedback(&self, mod_id: &str, actual: Side, predicted: Side) -> bool {
        let was_correct = actual == predicted;
        self.tracker.record_result(EvidenceSource::Pipeline, was_correct);
        info!(
            "Recorded feedback for {}: predicted={}, actual={}, correct={}",
            mod_id, predicted, actual, was_correct
        );
        was_correct
    }

    /// Per-source feedback: each record is judged against the actual side
    pub fn record_evidence_feedback(&self, evidence: &[Evidence], actual: Side) {
        for ev in evidence.iter().filter(|e| e.suggested_side() != Side::Unknown) {
            self.tracker.record_result(ev.source(), ev.suggested_side() == actual);
        }
    }
}

fn fallback_verdict(report: &JarReport) -> Verdict {
    let declared = report.manifest.as_ref().and_then(|m| m.declared_dist);
    classify_fallback(&FallbackSignals::from_scan(&report.scan, declared))
}
