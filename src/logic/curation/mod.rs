//! Curation Module
//!
//! Human-maintained side decisions, loaded from either curated file format
//! and consulted before any bytecode analysis.

pub mod types;
pub mod loader;
pub mod store;

#[cfg(test)]
mod tests;

pub use types::{slugify, CuratedEntry, ReasonEntry, RichEntry, SimpleEntry};
pub use loader::{load_file, parse_curated, CurationError, CATALOG_CONFIDENCE};
pub use store::{CurationStore, FALLBACK_SOURCE, RUNTIME_OVERRIDE_SOURCE};
