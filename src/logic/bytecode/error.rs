//! Decode errors for a single compiled unit.

use thiserror::Error;

/// Why a class file could not be decoded
///
/// Always scoped to one unit: the module scan logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    #[error("unexpected end of data at offset {offset} (needed {needed} bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic 0x{found:08X}, not a class file")]
    BadMagic { found: u32 },

    #[error("constant pool index {index} is out of range or unusable")]
    BadConstantIndex { index: u16 },

    #[error("constant pool entry {index} has tag {found}, expected {expected}")]
    UnexpectedConstant { index: u16, found: u8, expected: &'static str },

    #[error("unknown constant pool tag {tag} at entry {index}")]
    UnknownConstantTag { index: u16, tag: u8 },

    #[error("malformed modified UTF-8 in constant {index}")]
    InvalidUtf8 { index: u16 },

    #[error("unknown opcode 0x{opcode:02X} at bytecode offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("malformed descriptor `{descriptor}`")]
    BadDescriptor { descriptor: String },

    #[error("malformed annotation element tag `{tag}`")]
    BadElementTag { tag: char },

    #[error("annotation values nested deeper than {limit}")]
    AnnotationTooDeep { limit: u16 },
}
