//! Wrong-side Quarantine
//!
//! A jar that cannot run on this host is parked by appending `.CLIENT` or
//! `.SERVER` to its file name, so the loader no longer picks it up. Files
//! are renamed in place and never overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::constants::{self, CLIENT_SUFFIX, SERVER_SUFFIX};
use crate::logic::evidence::Side;
use crate::logic::sidedness::Dist;

// ============================================================================
// HOST SIDE
// ============================================================================

/// Something that can tell which side this host is
pub trait DistProbe {
    fn probe(&self) -> Option<Dist>;
}

/// Side given explicitly (CLI flag)
#[derive(Debug, Clone, Copy)]
pub struct FixedDist(pub Dist);

impl DistProbe for FixedDist {
    fn probe(&self) -> Option<Dist> {
        Some(self.0)
    }
}

/// `MOD_CLASSIFIER_DIST=client|server`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvDist;

impl DistProbe for EnvDist {
    fn probe(&self) -> Option<Dist> {
        parse_dist(&constants::get_host_dist()?)
    }
}

/// A `server.properties` next to the mods directory marks a dedicated server
#[derive(Debug, Clone)]
pub struct ServerPropertiesProbe {
    pub game_dir: PathBuf,
}

impl DistProbe for ServerPropertiesProbe {
    fn probe(&self) -> Option<Dist> {
        if self.game_dir.join("server.properties").is_file() {
            Some(Dist::DedicatedServer)
        } else if self.game_dir.join("options.txt").is_file() {
            Some(Dist::Client)
        } else {
            None
        }
    }
}

pub fn parse_dist(s: &str) -> Option<Dist> {
    match s.trim().to_lowercase().as_str() {
        "client" => Some(Dist::Client),
        "server" | "dedicated_server" => Some(Dist::DedicatedServer),
        _ => None,
    }
}

/// First probe with an answer wins
pub fn detect_host_dist(probes: &[&dyn DistProbe]) -> Option<Dist> {
    probes.iter().find_map(|p| p.probe())
}

/// CLIENT_ONLY on a server or SERVER_ONLY on a client
pub fn should_prevent_loading(side: Side, host: Dist) -> bool {
    matches!(
        (side, host),
        (Side::ClientOnly, Dist::DedicatedServer) | (Side::ServerOnly, Dist::Client)
    )
}

// ============================================================================
// RENAME
// ============================================================================

#[derive(Debug, Error)]
pub enum QuarantineError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("target already exists: {0}")]
    TargetExists(PathBuf),
    #[error("no file name in {0}")]
    NoFileName(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameRecord {
    pub mod_id: String,
    pub side: Side,
    pub from: PathBuf,
    pub to: PathBuf,
    pub sha256: String,
    pub renamed_at: DateTime<Utc>,
}

pub fn has_quarantine_suffix(file_name: &str) -> bool {
    file_name.ends_with(CLIENT_SUFFIX) || file_name.ends_with(SERVER_SUFFIX)
}

/// Name the file would get; None when it must stay as it is
pub fn quarantined_name(file_name: &str, side: Side) -> Option<String> {
    if has_quarantine_suffix(file_name) {
        return None;
    }
    match side {
        Side::ClientOnly => Some(format!("{}{}", file_name, CLIENT_SUFFIX)),
        Side::ServerOnly => Some(format!("{}{}", file_name, SERVER_SUFFIX)),
        Side::Universal | Side::Unknown => None,
    }
}

/// Rename when the side cannot load on this host. `Ok(None)` means nothing to do.
pub fn quarantine(
    path: &Path,
    mod_id: &str,
    side: Side,
    host: Dist,
) -> Result<Option<RenameRecord>, QuarantineError> {
    if !should_prevent_loading(side, host) {
        return Ok(None);
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| QuarantineError::NoFileName(path.to_path_buf()))?;
    let Some(new_name) = quarantined_name(file_name, side) else {
        debug!("{} already carries a side suffix", file_name);
        return Ok(None);
    };
    if !path.exists() {
        return Err(QuarantineError::NotFound(path.to_path_buf()));
    }

    let target = path.with_file_name(&new_name);
    if target.exists() {
        warn!("Target file already exists: {}", target.display());
        return Err(QuarantineError::TargetExists(target));
    }

    let sha256 = calculate_file_hash(path)?;
    fs::rename(path, &target).map_err(|source| QuarantineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Renamed {} to {}", file_name, new_name);
    warn!("Mod {} classified as {} and will not load on this side", mod_id, side);

    Ok(Some(RenameRecord {
        mod_id: mod_id.to_string(),
        side,
        from: path.to_path_buf(),
        to: target,
        sha256,
        renamed_at: Utc::now(),
    }))
}

fn calculate_file_hash(path: &Path) -> Result<String, QuarantineError> {
    use std::io::Read;

    let io_err = |source| QuarantineError::Io { path: path.to_path_buf(), source };
    let mut file = fs::File::open(path).map_err(io_err)?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(io_err)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
