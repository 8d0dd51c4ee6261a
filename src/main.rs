//! mod-sides - Main Entry Point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use mod_sides::constants::{self, APP_NAME, APP_VERSION};
use mod_sides::logic::config::ClassifierConfig;
use mod_sides::logic::curation::CurationStore;
use mod_sides::logic::enumerate::{describe, enumerate_mods};
use mod_sides::logic::quarantine::{detect_host_dist, DistProbe, EnvDist, FixedDist, ServerPropertiesProbe};
use mod_sides::logic::service::{run_blocking, ClassificationService, RunOptions};
use mod_sides::logic::sidedness::Dist;

#[derive(Parser)]
#[command(name = "mod-sides", version, about = "Classify game mod jars as client-only, server-only or universal")]
struct Cli {
    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Config file (defaults to mod-sides.json or MOD_CLASSIFIER_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Curated overrides file (defaults to curated_mods.json or MOD_CLASSIFIER_CURATED)
    #[arg(long, global = true)]
    curated: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every jar in a mods directory and park wrong-side jars
    Scan {
        dir: PathBuf,
        /// Side of this host; probed from the environment and game dir when absent
        #[arg(long, value_enum)]
        dist: Option<HostSide>,
        /// Report renames without touching files
        #[arg(long)]
        dry_run: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show evidence and verdicts for one jar
    Inspect {
        jar: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HostSide {
    Client,
    Server,
}

impl From<HostSide> for Dist {
    fn from(side: HostSide) -> Self {
        match side {
            HostSide::Client => Dist::Client,
            HostSide::Server => Dist::DedicatedServer,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config_path = cli.config.clone().unwrap_or_else(constants::get_config_path);
    let config = ClassifierConfig::load(Some(&config_path));
    let curated_path = cli.curated.clone().unwrap_or_else(constants::get_curated_path);
    let curation = CurationStore::load(&curated_path);
    let service = Arc::new(ClassificationService::with_config(config, curation));

    match cli.cmd {
        Command::Scan { dir, dist, dry_run, json } => scan(service, &dir, dist, dry_run, json),
        Command::Inspect { jar, json } => inspect(&service, &jar, json),
    }
}

fn scan(
    service: Arc<ClassificationService>,
    dir: &Path,
    dist: Option<HostSide>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let modules = enumerate_mods(dir).with_context(|| format!("cannot list {}", dir.display()))?;

    let fixed = dist.map(|d| FixedDist(d.into()));
    let game_dir = dir.parent().map(Path::to_path_buf).unwrap_or_default();
    let props = ServerPropertiesProbe { game_dir };
    let mut probes: Vec<&dyn DistProbe> = Vec::new();
    if let Some(f) = fixed.as_ref() {
        probes.push(f);
    }
    probes.push(&EnvDist);
    probes.push(&props);
    let host_dist = detect_host_dist(&probes);
    if host_dist.is_none() && service.config().file_renaming {
        log::warn!("Host side unknown, files will not be renamed (use --dist)");
    }

    let report = run_blocking(service, modules, RunOptions { host_dist, dry_run })
        .context("cannot start classification pool")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for m in &report.modules {
            println!("{:<32} {:<12} {:?}", m.mod_id, m.side.as_str(), m.source);
        }
        for r in &report.renames {
            println!("renamed {} -> {} (sha256 {})", r.from.display(), r.to.display(), r.sha256);
        }
        for p in &report.pending_renames {
            println!("would rename {}", p.display());
        }
        for e in &report.rename_errors {
            println!("rename failed: {}", e);
        }
    }
    Ok(())
}

fn inspect(service: &ClassificationService, jar: &Path, json: bool) -> Result<()> {
    let module = describe(jar);
    let inspection = service
        .inspect(&module)
        .with_context(|| format!("cannot inspect {}", jar.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    println!("mod id:    {}", inspection.mod_id);
    println!(
        "units:     {} scanned, {} skipped, {} entries",
        inspection.report.scan.units_scanned, inspection.report.scan.units_skipped, inspection.report.entries
    );
    if let Some(c) = &inspection.curated {
        println!("curated:   {}", c);
    }
    println!("evidence:");
    for ev in &inspection.evidence {
        println!("  {}", ev);
    }
    println!("weighted:  {} ({:?})", inspection.verdict.side, inspection.verdict.rule);
    for reason in &inspection.verdict.reasons {
        println!("  {}", reason);
    }
    println!("rules:     {} ({:?})", inspection.fallback.side, inspection.fallback.rule);
    Ok(())
}
