//! Central Configuration Constants
//!
//! Single source of truth for configuration defaults and the
//! `MOD_CLASSIFIER_*` environment overrides.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "mod-sides";

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mod-sides.json";

/// Default curated override file
pub const DEFAULT_CURATED_FILE: &str = "curated_mods.json";

/// Default classes scanned per jar
pub const DEFAULT_MAX_CLASSES: usize = 50;
pub const MIN_MAX_CLASSES: usize = 10;
pub const MAX_MAX_CLASSES: usize = 500;

/// Worker threads (0 = auto)
pub const DEFAULT_WORKER_THREADS: usize = 0;
pub const MAX_WORKER_THREADS: usize = 16;
/// Upper bound for the automatic worker count
pub const AUTO_WORKER_CAP: usize = 4;

/// Ids never classified unless the configuration says otherwise
pub const DEFAULT_IGNORED_MODS: &[&str] = &["minecraft", "neoforge"];

/// File name suffixes used to park a jar on the wrong side
pub const CLIENT_SUFFIX: &str = ".CLIENT";
pub const SERVER_SUFFIX: &str = ".SERVER";

pub const ENV_PREFIX: &str = "MOD_CLASSIFIER_";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
}

/// Boolean override; anything but "false"/"0" counts as true
pub fn env_bool(key: &str) -> Option<bool> {
    env_var(key).map(|s| s.to_lowercase() != "false" && s != "0")
}

pub fn env_usize(key: &str) -> Option<usize> {
    env_var(key).and_then(|s| s.trim().parse().ok())
}

pub fn env_f64(key: &str) -> Option<f64> {
    env_var(key).and_then(|s| s.trim().parse().ok())
}

/// Comma separated id list; empty entries dropped
pub fn env_list(key: &str) -> Option<Vec<String>> {
    env_var(key).map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
}

/// Get config file path from environment or use default
pub fn get_config_path() -> std::path::PathBuf {
    env_var("CONFIG")
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
        .into()
}

/// Get curated file path from environment or use default
pub fn get_curated_path() -> std::path::PathBuf {
    env_var("CURATED")
        .unwrap_or_else(|| DEFAULT_CURATED_FILE.to_string())
        .into()
}

/// Host side forced through the environment ("client" / "server")
pub fn get_host_dist() -> Option<String> {
    env_var("DIST").map(|s| s.trim().to_lowercase())
}

/// Automatic worker count: min(4, available parallelism)
pub fn auto_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(AUTO_WORKER_CAP)
}
