//! Bounded classification pool
//!
//! Each module is classified synchronously inside `spawn_blocking`; a
//! semaphore sized from the config bounds how many run at once. A task that
//! dies is contained at its join point and recorded as UNIVERSAL.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;

use crate::logic::enumerate::ModuleDescriptor;
use crate::logic::evidence::Side;
use crate::logic::quarantine::{quarantine, quarantined_name, should_prevent_loading};
use crate::logic::sidedness::Dist;

use super::classifier::{Classification, ClassificationService};
use super::report::{ModuleOutcome, RunReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Unknown host side disables renaming
    pub host_dist: Option<Dist>,
    pub dry_run: bool,
}

pub fn build_runtime(workers: usize) -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(workers.max(1))
        .max_blocking_threads(workers.max(1))
        .thread_name("mod-sides-worker")
        .enable_all()
        .build()
}

/// Results keep the input order
pub async fn classify_all(
    service: Arc<ClassificationService>,
    modules: Vec<ModuleDescriptor>,
) -> Vec<(ModuleDescriptor, Classification)> {
    let permits = Arc::new(Semaphore::new(service.config().effective_workers().max(1)));

    let mut handles = Vec::with_capacity(modules.len());
    for module in modules {
        let service = service.clone();
        let permits = permits.clone();
        let task_module = module.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            tokio::task::spawn_blocking(move || service.classify_detailed(&task_module)).await
        });
        handles.push((module, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (module, handle) in handles {
        let classification = match handle.await {
            Ok(Ok(c)) => c,
            Ok(Err(e)) | Err(e) => {
                error!("Classification task for {} failed: {}", module.id, e);
                let mut failed = Classification::failed(&module.id.to_lowercase());
                failed.side = service.cache().insert_if_absent(&failed.mod_id, Side::Universal);
                failed
            }
        };
        results.push((module, classification));
    }
    results
}

pub async fn run(
    service: Arc<ClassificationService>,
    modules: Vec<ModuleDescriptor>,
    options: RunOptions,
) -> RunReport {
    let mut report = RunReport::new(options.host_dist, options.dry_run);
    if !service.config().enabled {
        info!("Mod classification disabled in config");
        return report;
    }

    info!("Starting mod classification of {} modules...", modules.len());
    let results = classify_all(service.clone(), modules).await;

    for (module, classification) in &results {
        report.modules.push(ModuleOutcome::new(module.path.clone(), classification));
        if service.config().file_renaming {
            apply_quarantine(&mut report, &module.path, classification, options);
        }
    }

    report.finished_at = Utc::now();
    info!("Mod classification completed");

    service.curation().log_summary();
    if service.config().accuracy_tracking {
        service.tracker().log_summary();
    }
    report.log_summary();
    report
}

fn apply_quarantine(report: &mut RunReport, path: &Path, classification: &Classification, options: RunOptions) {
    let Some(host) = options.host_dist else {
        return;
    };
    if !should_prevent_loading(classification.side, host) {
        return;
    }

    if options.dry_run {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if quarantined_name(name, classification.side).is_some() {
            info!("Dry run: would park {} ({})", path.display(), classification.side);
            report.pending_renames.push(path.to_path_buf());
        }
        return;
    }

    match quarantine(path, &classification.mod_id, classification.side, host) {
        Ok(Some(record)) => report.renames.push(record),
        Ok(None) => {}
        Err(e) => {
            warn!("Failed to rename mod file {}: {}", path.display(), e);
            report.rename_errors.push(format!("{}: {}", classification.mod_id, e));
        }
    }
}

/// Build a runtime sized from the config and run to completion
pub fn run_blocking(
    service: Arc<ClassificationService>,
    modules: Vec<ModuleDescriptor>,
    options: RunOptions,
) -> std::io::Result<RunReport> {
    let runtime = build_runtime(service.config().effective_workers())?;
    Ok(runtime.block_on(run(service, modules, options)))
}
