//! Mod Side Classifier
//!
//! Static client/server sidedness analysis for game mod jars.

pub mod constants;
pub mod logic;

pub use logic::config::ClassifierConfig;
pub use logic::enumerate::{enumerate_mods, ModuleDescriptor};
pub use logic::evidence::Side;
pub use logic::service::{ClassificationService, RunOptions, RunReport};
