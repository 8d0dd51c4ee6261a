//! Logic Module - Classification Engines
//!
//! Leaves first: class-file walking, side signal extraction, evidence and
//! aggregation, accuracy tracking. On top: curation, configuration, the
//! cache and the service that runs a whole mods directory.

// Analysis core
pub mod bytecode;
pub mod sidedness;
pub mod evidence;
pub mod accuracy;

// Inputs
pub mod config;
pub mod curation;
pub mod enumerate;

// Run state & outputs
pub mod cache;
pub mod quarantine;
pub mod service;

#[cfg(test)]
pub mod testing;
