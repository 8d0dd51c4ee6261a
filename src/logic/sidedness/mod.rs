//! Sidedness Module
//!
//! Side-affinity signal extraction: walks the compiled units of a module
//! and reports which client-only and server-only symbols it touches, whether
//! those touches are gated behind a dist check or a side annotation, and
//! what the loader metadata declares.
//!
//! ## Structure
//! - `rules`: namespaces, sided annotations, dist queries
//! - `extractor`: the `UnitVisitor` implementation
//! - `scan`: the merged per-module summary
//! - `manifest`: mods.toml / fabric.mod.json readers
//! - `archive`: jar inspection

pub mod rules;
pub mod scan;
pub mod extractor;
pub mod manifest;
pub mod archive;


pub use rules::{namespace_affinity, Dist};
pub use scan::{DisplayTestSignals, ModuleScan};
pub use extractor::{DisplayTestScanner, SideExtractor};
pub use manifest::{ManifestInfo, ManifestKind};
pub use archive::{inspect_jar, read_manifest, ArchiveError, FileLayout, JarReport};
