//! Classifier Configuration
//!
//! Loaded from a JSON file, then overridden from `MOD_CLASSIFIER_*`
//! environment variables, then normalised. A missing or broken file is
//! never fatal: defaults are used and a warning is logged.

use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{self, DEFAULT_IGNORED_MODS, DEFAULT_MAX_CLASSES, DEFAULT_WORKER_THREADS};
use crate::logic::accuracy::TrackerPolicy;
use crate::logic::evidence::{AggregationPolicy, Side};

static MOD_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{1,63}$").unwrap());

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    // Toggles
    pub enabled: bool,
    pub enhanced_analysis: bool,
    pub file_renaming: bool,
    pub verbose_logging: bool,
    pub log_evidence_details: bool,
    pub accuracy_tracking: bool,

    // Bounds
    pub max_classes_to_scan: usize,
    /// 0 = min(4, available parallelism)
    pub worker_threads: usize,

    // Id lists
    pub forced_client: Vec<String>,
    pub forced_server: Vec<String>,
    pub forced_universal: Vec<String>,
    pub ignored: Vec<String>,

    pub aggregation: AggregationPolicy,
    pub accuracy: TrackerPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enhanced_analysis: true,
            file_renaming: true,
            verbose_logging: false,
            log_evidence_details: false,
            accuracy_tracking: true,
            max_classes_to_scan: DEFAULT_MAX_CLASSES,
            worker_threads: DEFAULT_WORKER_THREADS,
            forced_client: Vec::new(),
            forced_server: Vec::new(),
            forced_universal: Vec::new(),
            ignored: DEFAULT_IGNORED_MODS.iter().map(|s| s.to_string()).collect(),
            aggregation: AggregationPolicy::default(),
            accuracy: TrackerPolicy::default(),
        }
    }
}

pub fn is_valid_mod_id(id: &str) -> bool {
    MOD_ID_RE.is_match(id)
}

impl ClassifierConfig {
    /// Strict load of one file, normalised
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.normalized())
    }

    /// File (if any), then environment overrides. Never fails.
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = match path {
            Some(p) if p.exists() => match Self::from_file(p) {
                Ok(c) => {
                    info!("Loaded config from {}", p.display());
                    c
                }
                Err(e) => {
                    warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            Some(p) => {
                info!("No config at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env();
        config.normalized()
    }

    pub fn apply_env(&mut self) {
        if let Some(v) = constants::env_bool("ENABLED") {
            self.enabled = v;
        }
        if let Some(v) = constants::env_bool("ENHANCED_ANALYSIS") {
            self.enhanced_analysis = v;
        }
        if let Some(v) = constants::env_bool("FILE_RENAMING") {
            self.file_renaming = v;
        }
        if let Some(v) = constants::env_bool("VERBOSE_LOGGING") {
            self.verbose_logging = v;
        }
        if let Some(v) = constants::env_bool("LOG_EVIDENCE_DETAILS") {
            self.log_evidence_details = v;
        }
        if let Some(v) = constants::env_bool("ACCURACY_TRACKING") {
            self.accuracy_tracking = v;
        }
        if let Some(v) = constants::env_usize("MAX_CLASSES") {
            self.max_classes_to_scan = v;
        }
        if let Some(v) = constants::env_usize("WORKER_THREADS") {
            self.worker_threads = v;
        }
        if let Some(v) = constants::env_f64("MARGIN") {
            self.aggregation.margin = v;
        }
        if let Some(v) = constants::env_list("FORCED_CLIENT") {
            self.forced_client = v;
        }
        if let Some(v) = constants::env_list("FORCED_SERVER") {
            self.forced_server = v;
        }
        if let Some(v) = constants::env_list("FORCED_UNIVERSAL") {
            self.forced_universal = v;
        }
        if let Some(v) = constants::env_list("IGNORED") {
            self.ignored = v;
        }
    }

    /// Clamp bounds and clean id lists
    pub fn normalized(mut self) -> Self {
        self.max_classes_to_scan = self
            .max_classes_to_scan
            .clamp(constants::MIN_MAX_CLASSES, constants::MAX_MAX_CLASSES);
        self.worker_threads = self.worker_threads.min(constants::MAX_WORKER_THREADS);
        self.forced_client = clean_ids("forced_client", self.forced_client);
        self.forced_server = clean_ids("forced_server", self.forced_server);
        self.forced_universal = clean_ids("forced_universal", self.forced_universal);
        self.ignored = clean_ids("ignored", self.ignored);
        self.aggregation = self.aggregation.normalized();
        self.accuracy = self.accuracy.normalized();
        self
    }

    pub fn effective_workers(&self) -> usize {
        match self.worker_threads {
            0 => constants::auto_worker_threads(),
            n => n,
        }
    }

    /// Forced lists are checked client, server, universal
    pub fn forced_side(&self, mod_id: &str) -> Option<Side> {
        let id = mod_id.to_lowercase();
        if self.forced_client.contains(&id) {
            Some(Side::ClientOnly)
        } else if self.forced_server.contains(&id) {
            Some(Side::ServerOnly)
        } else if self.forced_universal.contains(&id) {
            Some(Side::Universal)
        } else {
            None
        }
    }

    pub fn is_ignored(&self, mod_id: &str) -> bool {
        self.ignored.contains(&mod_id.to_lowercase())
    }
}

fn clean_ids(list: &str, ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = raw.trim().to_lowercase();
        if !is_valid_mod_id(&id) {
            warn!("Dropping invalid mod id {:?} from {}", raw, list);
            continue;
        }
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
