//! Curated file loading
//!
//! The top-level JSON shape picks the format: an object with `data` is the
//! simple catalog, an array is the scanned list.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use super::types::{CuratedEntry, RichEntry, SimpleCatalog};

/// Confidence given to catalog entries, which carry none
pub const CATALOG_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("cannot read curated file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid curated data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unrecognised curated format (expected an object with `data` or an array)")]
    UnknownFormat,
}

pub fn load_file(path: &Path) -> Result<Vec<CuratedEntry>, CurationError> {
    let content = std::fs::read_to_string(path).map_err(|source| CurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_curated(&content)
}

pub fn parse_curated(content: &str) -> Result<Vec<CuratedEntry>, CurationError> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Object(ref map) if map.contains_key("data") => {
            let catalog: SimpleCatalog = serde_json::from_value(value)?;
            Ok(from_catalog(catalog))
        }
        Value::Array(_) => {
            let entries: Vec<RichEntry> = serde_json::from_value(value)?;
            Ok(from_rich(entries))
        }
        _ => Err(CurationError::UnknownFormat),
    }
}

fn from_catalog(catalog: SimpleCatalog) -> Vec<CuratedEntry> {
    let mut out = Vec::with_capacity(catalog.data.len());
    for entry in catalog.data {
        let id = entry.mod_id.as_deref().map(str::trim).unwrap_or_default();
        if id.is_empty() {
            warn!("Skipping curated entry with empty modId: {:?}", entry.name);
            continue;
        }
        let side = entry.side();
        debug!("Loaded curated classification: {} -> {}", id, side);
        out.push(CuratedEntry {
            mod_id: id.to_lowercase(),
            name: entry.name.clone().unwrap_or_else(|| id.to_string()),
            side,
            confidence: CATALOG_CONFIDENCE,
            source: entry.source.clone().unwrap_or_else(|| "catalog".to_string()),
            summary: entry.observations.clone().unwrap_or_else(|| "Curated catalog entry".to_string()),
            scanned_at: None,
        });
    }
    out
}

fn from_rich(entries: Vec<RichEntry>) -> Vec<CuratedEntry> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(id) = entry.mod_id() else {
            warn!("Skipping curated entry with invalid mod id: {:?}", entry.mod_name);
            continue;
        };
        let confidence = if entry.confidence.is_finite() { entry.confidence.clamp(0.0, 1.0) } else { 0.0 };
        out.push(CuratedEntry {
            name: entry.mod_name.clone().unwrap_or_else(|| id.clone()),
            side: entry.side(),
            confidence,
            source: entry.source.clone().unwrap_or_else(|| "unknown".to_string()),
            summary: entry.reason_summary(),
            scanned_at: entry.scanned_at.clone(),
            mod_id: id,
        });
    }
    out
}
