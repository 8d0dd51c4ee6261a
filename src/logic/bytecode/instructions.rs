//! Bytecode instruction walker
//!
//! Decodes a `Code` attribute just far enough to surface symbol references:
//! invocations, field accesses, type instructions and `ldc` constants.
//! Every other opcode is skipped by its operand length.

use super::constant_pool::{ConstantPool, MemberRef};
use super::error::BytecodeError;
use super::reader::ByteReader;

// ============================================================================
// OPCODES (only the ones that carry symbols or have variable length)
// ============================================================================

pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;
pub const IINC: u8 = 0x84;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const GETSTATIC: u8 = 0xb2;
pub const PUTSTATIC: u8 = 0xb3;
pub const GETFIELD: u8 = 0xb4;
pub const PUTFIELD: u8 = 0xb5;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const INVOKEDYNAMIC: u8 = 0xba;
pub const NEW: u8 = 0xbb;
pub const ANEWARRAY: u8 = 0xbd;
pub const CHECKCAST: u8 = 0xc0;
pub const INSTANCEOF: u8 = 0xc1;
pub const WIDE: u8 = 0xc4;
pub const MULTIANEWARRAY: u8 = 0xc5;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction<'a> {
    /// invokevirtual / invokespecial / invokestatic / invokeinterface
    Invoke { opcode: u8, member: MemberRef<'a> },
    /// get/put static/field
    FieldAccess { opcode: u8, member: MemberRef<'a> },
    /// new / anewarray / checkcast / instanceof / multianewarray
    TypeInsn { opcode: u8, class_name: &'a str },
    /// ldc of a string constant
    StringLiteral(&'a str),
    /// ldc of a class literal
    ClassLiteral(&'a str),
}

// ============================================================================
// DECODER
// ============================================================================

/// Fixed operand length for opcodes without symbols; None = invalid opcode
fn operand_len(opcode: u8) -> Option<usize> {
    let len = match opcode {
        0x00..=0x0f => 0,
        0x10 => 1,               // bipush
        0x11 => 2,               // sipush
        0x15..=0x19 => 1,        // iload..aload
        0x1a..=0x35 => 0,        // *load_n, array loads
        0x36..=0x3a => 1,        // istore..astore
        0x3b..=0x83 => 0,        // *store_n, array stores, stack, arithmetic
        IINC => 2,
        0x85..=0x98 => 0,        // conversions, comparisons
        0x99..=0xa8 => 2,        // if*, goto, jsr
        0xa9 => 1,               // ret
        0xac..=0xb1 => 0,        // returns
        0xbc => 1,               // newarray
        0xbe | 0xbf => 0,        // arraylength, athrow
        0xc2 | 0xc3 => 0,        // monitorenter/exit
        0xc6 | 0xc7 => 2,        // ifnull, ifnonnull
        0xc8 | 0xc9 => 4,        // goto_w, jsr_w
        0xca | 0xfe | 0xff => 0, // breakpoint, impdep
        _ => return None,
    };
    Some(len)
}

/// Decode all symbol-bearing instructions of one method body
pub fn decode<'p>(code: &[u8], pool: &'p ConstantPool) -> Result<Vec<Instruction<'p>>, BytecodeError> {
    let mut reader = ByteReader::new(code);
    let mut out = Vec::new();

    while !reader.is_empty() {
        let offset = reader.position();
        let opcode = reader.u8()?;

        match opcode {
            LDC => push_ldc(reader.u8()? as u16, pool, &mut out)?,
            LDC_W => push_ldc(reader.u16()?, pool, &mut out)?,
            LDC2_W => {
                reader.u16()?;
            }
            GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD => {
                let member = pool.member_ref(reader.u16()?)?;
                out.push(Instruction::FieldAccess { opcode, member });
            }
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => {
                let member = pool.member_ref(reader.u16()?)?;
                out.push(Instruction::Invoke { opcode, member });
            }
            INVOKEINTERFACE => {
                let member = pool.member_ref(reader.u16()?)?;
                reader.skip(2)?;
                out.push(Instruction::Invoke { opcode, member });
            }
            INVOKEDYNAMIC => {
                // Call-site symbols live in the bootstrap table; nothing to report
                reader.skip(4)?;
            }
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                let class_name = pool.class_name(reader.u16()?)?;
                out.push(Instruction::TypeInsn { opcode, class_name });
            }
            MULTIANEWARRAY => {
                let class_name = pool.class_name(reader.u16()?)?;
                reader.skip(1)?;
                out.push(Instruction::TypeInsn { opcode, class_name });
            }
            TABLESWITCH => {
                skip_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let low = reader.i32()?;
                let high = reader.i32()?;
                let entries = (high as i64 - low as i64 + 1).max(0) as usize;
                reader.skip(entries.saturating_mul(4))?;
            }
            LOOKUPSWITCH => {
                skip_padding(&mut reader, offset)?;
                reader.skip(4)?; // default
                let pairs = reader.i32()?.max(0) as usize;
                reader.skip(pairs.saturating_mul(8))?;
            }
            WIDE => {
                let inner = reader.u8()?;
                reader.skip(if inner == IINC { 4 } else { 2 })?;
            }
            other => {
                let len = operand_len(other).ok_or(BytecodeError::UnknownOpcode { opcode: other, offset })?;
                reader.skip(len)?;
            }
        }
    }

    Ok(out)
}

fn push_ldc<'p>(index: u16, pool: &'p ConstantPool, out: &mut Vec<Instruction<'p>>) -> Result<(), BytecodeError> {
    if let Some(s) = pool.string_literal(index)? {
        out.push(Instruction::StringLiteral(s));
    } else if let Some(c) = pool.class_literal(index)? {
        out.push(Instruction::ClassLiteral(c));
    }
    Ok(())
}

/// Switch operands are 4-byte aligned relative to the start of the code array
fn skip_padding(reader: &mut ByteReader<'_>, opcode_offset: usize) -> Result<(), BytecodeError> {
    let pad = (4 - (opcode_offset + 1) % 4) % 4;
    reader.skip(pad)
}
