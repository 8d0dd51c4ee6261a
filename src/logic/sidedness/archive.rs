//! Jar inspection
//!
//! Opens a module archive once and collects everything the evidence layer
//! needs: the bytecode scan, loader metadata and file layout counts.
//! A unit that fails to decode is logged and skipped; only failure to open
//! the archive itself is an error.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;
use zip::ZipArchive;

use crate::logic::bytecode::walk;

use super::extractor::{DisplayTestScanner, SideExtractor};
use super::manifest::{
    parse_fabric_json, parse_mods_toml, ManifestInfo, ManifestKind, FABRIC_MOD_JSON, FORGE_MODS_TOML,
    NEOFORGE_MODS_TOML,
};
use super::scan::ModuleScan;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("module file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Counts of side-named entries anywhere in the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileLayout {
    pub client_files: usize,
    pub server_files: usize,
}

impl FileLayout {
    fn observe(&mut self, name: &str) {
        if name.contains("/client/") || name.ends_with("Client.class") {
            self.client_files += 1;
        }
        if name.contains("/server/") || name.ends_with("Server.class") {
            self.server_files += 1;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct JarReport {
    pub scan: ModuleScan,
    pub manifest: Option<ManifestInfo>,
    pub layout: FileLayout,
    pub entries: usize,
}

/// Walkable unit: a `.class` entry that is not a nested/anonymous class
pub fn is_scannable_unit(name: &str) -> bool {
    name.ends_with(".class") && !name.contains('$')
}

/// Nested or anonymous unit, checked for display-test registration only
pub fn is_nested_unit(name: &str) -> bool {
    name.ends_with(".class") && name.contains('$')
}

/// Inspect a jar, walking at most `max_classes` units in archive order.
/// Nested units get their own budget of `max_classes`.
pub fn inspect_jar(path: &Path, max_classes: usize) -> Result<JarReport, ArchiveError> {
    if !path.is_file() {
        return Err(ArchiveError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ArchiveError::Io { path: path.to_path_buf(), source })?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|source| ArchiveError::Zip { path: path.to_path_buf(), source })?;

    let mut extractor = SideExtractor::new();
    let mut report = JarReport { entries: archive.len(), ..Default::default() };
    let mut attempted = 0usize;
    let mut nested_attempted = 0usize;
    let mut neoforge_toml = None;
    let mut forge_toml = None;
    let mut fabric_json = None;

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry #{} in {}: {}", i, path.display(), e);
                continue;
            }
        };
        let name = entry.name().to_string();
        report.layout.observe(&name);

        match name.as_str() {
            NEOFORGE_MODS_TOML => neoforge_toml = read_text(&mut entry),
            FORGE_MODS_TOML => forge_toml = read_text(&mut entry),
            FABRIC_MOD_JSON => fabric_json = read_text(&mut entry),
            _ => {}
        }

        if is_nested_unit(&name) && nested_attempted < max_classes {
            nested_attempted += 1;
            let Some(bytes) = read_unit(&mut entry, &name) else { continue };
            let mut scanner = DisplayTestScanner::new(&mut extractor.scan_mut().display_test);
            if let Err(e) = walk(&bytes, &mut scanner) {
                debug!("Skipping malformed nested class {}: {}", name, e);
            }
            continue;
        }

        if !is_scannable_unit(&name) || attempted >= max_classes {
            continue;
        }
        attempted += 1;

        let Some(bytes) = read_unit(&mut entry, &name) else {
            extractor.scan_mut().units_skipped += 1;
            continue;
        };
        match walk(&bytes, &mut extractor) {
            Ok(_) => extractor.scan_mut().units_scanned += 1,
            Err(e) => {
                debug!("Skipping malformed class {}: {}", name, e);
                extractor.scan_mut().units_skipped += 1;
            }
        }
    }

    report.scan = extractor.finish();
    report.manifest = neoforge_toml
        .map(|t| parse_mods_toml(&t, ManifestKind::NeoForgeToml))
        .or_else(|| forge_toml.map(|t| parse_mods_toml(&t, ManifestKind::ForgeToml)))
        .or_else(|| fabric_json.and_then(|t| parse_fabric_json(&t)));

    if report.scan.units_skipped > 0 {
        warn!(
            "{}: {} of {} classes could not be decoded",
            path.display(),
            report.scan.units_skipped,
            attempted
        );
    }

    Ok(report)
}

/// Only the loader metadata, without walking any class
pub fn read_manifest(path: &Path) -> Result<Option<ManifestInfo>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io { path: path.to_path_buf(), source })?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|source| ArchiveError::Zip { path: path.to_path_buf(), source })?;

    for (name, kind) in [
        (NEOFORGE_MODS_TOML, ManifestKind::NeoForgeToml),
        (FORGE_MODS_TOML, ManifestKind::ForgeToml),
    ] {
        if let Ok(mut entry) = archive.by_name(name) {
            if let Some(text) = read_text(&mut entry) {
                return Ok(Some(parse_mods_toml(&text, kind)));
            }
        }
    }
    let fabric = match archive.by_name(FABRIC_MOD_JSON) {
        Ok(mut entry) => read_text(&mut entry).and_then(|t| parse_fabric_json(&t)),
        Err(_) => None,
    };
    Ok(fabric)
}

fn read_unit<R: Read>(entry: &mut R, name: &str) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    match entry.read_to_end(&mut bytes) {
        Ok(_) => Some(bytes),
        Err(e) => {
            debug!("Could not read class {}: {}", name, e);
            None
        }
    }
}

fn read_text<R: Read>(entry: &mut R) -> Option<String> {
    let mut text = String::new();
    match entry.read_to_string(&mut text) {
        Ok(_) => Some(text),
        Err(e) => {
            debug!("Could not read metadata entry: {}", e);
            None
        }
    }
}
