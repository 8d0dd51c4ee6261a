//! Service Module
//!
//! Wires configuration, curation, the accuracy tracker and the cache into
//! one classification service, plus the bounded pool that runs it over a
//! whole mods directory.
//!
//! ## Usage
//! ```ignore
//! let service = Arc::new(ClassificationService::with_config(config, curation));
//! let report = run_blocking(service, enumerate_mods(dir)?, RunOptions::default())?;
//! ```

pub mod classifier;
pub mod pool;
pub mod report;


pub use classifier::{
    Classification, ClassificationService, ClassifyError, Inspection, ResolutionSource,
};
pub use pool::{build_runtime, classify_all, run, run_blocking, RunOptions};
pub use report::{ModuleOutcome, RunReport};
