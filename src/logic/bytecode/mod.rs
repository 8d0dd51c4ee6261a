//! Bytecode Module
//!
//! Static decoder for compiled JVM units. Nothing is loaded or executed:
//! the class file is parsed structurally and its symbol references are
//! surfaced through the `UnitVisitor` callbacks.
//!
//! ## Structure
//! - `reader`: big-endian cursor
//! - `constant_pool`: pool parsing and symbol resolution
//! - `descriptor`: field/method descriptor parsing
//! - `annotation`: annotation attribute decoding
//! - `instructions`: `Code` attribute decoding
//! - `class_file`: whole-unit layout
//! - `visitor`: callback trait and the `walk` driver

pub mod error;
pub mod reader;
pub mod constant_pool;
pub mod descriptor;
pub mod annotation;
pub mod instructions;
pub mod class_file;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use error::BytecodeError;
pub use annotation::{Annotation, ElementValue, MAX_ANNOTATION_DEPTH};
pub use class_file::ClassFile;
pub use visitor::{walk, AnnotationTarget, MethodHeader, RefKind, SymbolRef, UnitHeader, UnitVisitor};
