//! Mods directory enumeration
//!
//! Every `*.jar` that has not already been parked with a side suffix
//! becomes a module descriptor. The id comes from the loader manifest when
//! the jar has one, otherwise from the file stem.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::logic::curation::slugify;
use crate::logic::quarantine::has_quarantine_suffix;
use crate::logic::sidedness::{read_manifest, ArchiveError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: String,
    pub path: PathBuf,
    pub dependencies: Vec<String>,
}

impl ModuleDescriptor {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { id: id.into(), path: path.into(), dependencies: Vec::new() }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// Sorted by path. Only failure to list the directory is an error.
pub fn enumerate_mods(dir: &Path) -> Result<Vec<ModuleDescriptor>, ArchiveError> {
    let io_err = |source| ArchiveError::Io { path: dir.to_path_buf(), source };
    let mut jars: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || has_quarantine_suffix(name) {
            continue;
        }
        if name.to_lowercase().ends_with(".jar") {
            jars.push(path);
        }
    }
    jars.sort();

    Ok(jars.into_iter().map(|path| describe(&path)).collect())
}

pub fn describe(path: &Path) -> ModuleDescriptor {
    let fallback_id = stem_id(path);
    match read_manifest(path) {
        Ok(Some(manifest)) => {
            let id = manifest.mod_id.filter(|id| !id.is_empty()).unwrap_or(fallback_id);
            debug!("{} -> {} ({} dependencies)", path.display(), id, manifest.dependencies.len());
            ModuleDescriptor { id, path: path.to_path_buf(), dependencies: manifest.dependencies }
        }
        Ok(None) => ModuleDescriptor::new(fallback_id, path),
        Err(e) => {
            warn!("Cannot read manifest of {}: {}", path.display(), e);
            ModuleDescriptor::new(fallback_id, path)
        }
    }
}

/// `Sodium-Extra-0.5.4.jar` → `sodium_extra_0_5_4`
fn stem_id(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let slug = slugify(stem);
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}
