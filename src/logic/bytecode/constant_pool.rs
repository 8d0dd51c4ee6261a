//! Constant Pool
//!
//! Decodes the class file constant pool and resolves symbolic entries
//! (class names, member references, string literals).

use super::error::BytecodeError;
use super::reader::ByteReader;

// ============================================================================
// TAGS
// ============================================================================

pub const TAG_UTF8: u8 = 1;
pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 4;
pub const TAG_LONG: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_CLASS: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_FIELDREF: u8 = 9;
pub const TAG_METHODREF: u8 = 10;
pub const TAG_INTERFACE_METHODREF: u8 = 11;
pub const TAG_NAME_AND_TYPE: u8 = 12;
pub const TAG_METHOD_HANDLE: u8 = 15;
pub const TAG_METHOD_TYPE: u8 = 16;
pub const TAG_DYNAMIC: u8 = 17;
pub const TAG_INVOKE_DYNAMIC: u8 = 18;
pub const TAG_MODULE: u8 = 19;
pub const TAG_PACKAGE: u8 = 20;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(u64),
    Double(u64),
    Class { name_index: u16 },
    String { utf8_index: u16 },
    MemberRef { tag: u8, class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { tag: u8, bootstrap_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Second slot of a Long/Double, and slot 0
    Unusable,
}

impl Constant {
    fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => TAG_UTF8,
            Constant::Integer(_) => TAG_INTEGER,
            Constant::Float(_) => TAG_FLOAT,
            Constant::Long(_) => TAG_LONG,
            Constant::Double(_) => TAG_DOUBLE,
            Constant::Class { .. } => TAG_CLASS,
            Constant::String { .. } => TAG_STRING,
            Constant::MemberRef { tag, .. } => *tag,
            Constant::NameAndType { .. } => TAG_NAME_AND_TYPE,
            Constant::MethodHandle { .. } => TAG_METHOD_HANDLE,
            Constant::MethodType { .. } => TAG_METHOD_TYPE,
            Constant::Dynamic { tag, .. } => *tag,
            Constant::Module { .. } => TAG_MODULE,
            Constant::Package { .. } => TAG_PACKAGE,
            Constant::Unusable => 0,
        }
    }
}

/// A resolved field or method reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
    pub is_interface: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

// ============================================================================
// PARSING
// ============================================================================

impl ConstantPool {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BytecodeError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.u8()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = reader.u16()? as usize;
                    let raw = reader.bytes(len)?;
                    Constant::Utf8(decode_modified_utf8(raw).ok_or(BytecodeError::InvalidUtf8 { index })?)
                }
                TAG_INTEGER => Constant::Integer(reader.i32()?),
                TAG_FLOAT => Constant::Float(reader.u32()?),
                TAG_LONG | TAG_DOUBLE => {
                    let hi = reader.u32()? as u64;
                    let lo = reader.u32()? as u64;
                    let value = (hi << 32) | lo;
                    if tag == TAG_LONG { Constant::Long(value) } else { Constant::Double(value) }
                }
                TAG_CLASS => Constant::Class { name_index: reader.u16()? },
                TAG_STRING => Constant::String { utf8_index: reader.u16()? },
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF => Constant::MemberRef {
                    tag,
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                TAG_METHOD_HANDLE => Constant::MethodHandle {
                    kind: reader.u8()?,
                    reference_index: reader.u16()?,
                },
                TAG_METHOD_TYPE => Constant::MethodType { descriptor_index: reader.u16()? },
                TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => Constant::Dynamic {
                    tag,
                    bootstrap_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                TAG_MODULE => Constant::Module { name_index: reader.u16()? },
                TAG_PACKAGE => Constant::Package { name_index: reader.u16()? },
                other => return Err(BytecodeError::UnknownConstantTag { index, tag: other }),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    fn get(&self, index: u16) -> Result<&Constant, BytecodeError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(BytecodeError::BadConstantIndex { index }),
            Some(c) => Ok(c),
        }
    }

    fn unexpected(&self, index: u16, expected: &'static str) -> BytecodeError {
        let found = self.entries.get(index as usize).map(Constant::tag).unwrap_or(0);
        BytecodeError::UnexpectedConstant { index, found, expected }
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    pub fn utf8(&self, index: u16) -> Result<&str, BytecodeError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s.as_str()),
            _ => Err(self.unexpected(index, "Utf8")),
        }
    }

    /// Internal name of a Class entry (`net/minecraft/client/Minecraft`,
    /// or an array descriptor such as `[Lfoo/Bar;`)
    pub fn class_name(&self, index: u16) -> Result<&str, BytecodeError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(self.unexpected(index, "Class")),
        }
    }

    /// Optional class name: index 0 means "absent" (e.g. super of java/lang/Object)
    pub fn optional_class_name(&self, index: u16) -> Result<Option<&str>, BytecodeError> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    pub fn string(&self, index: u16) -> Result<&str, BytecodeError> {
        match self.get(index)? {
            Constant::String { utf8_index } => self.utf8(*utf8_index),
            _ => Err(self.unexpected(index, "String")),
        }
    }

    /// String literal behind an `ldc`, if the constant is a string
    pub fn string_literal(&self, index: u16) -> Result<Option<&str>, BytecodeError> {
        match self.get(index)? {
            Constant::String { utf8_index } => self.utf8(*utf8_index).map(Some),
            _ => Ok(None),
        }
    }

    /// Class name behind an `ldc` of a class literal (`Foo.class`)
    pub fn class_literal(&self, index: u16) -> Result<Option<&str>, BytecodeError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index).map(Some),
            _ => Ok(None),
        }
    }

    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, BytecodeError> {
        match self.get(index)? {
            Constant::MemberRef { tag, class_index, name_and_type_index } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok(MemberRef {
                    owner,
                    name,
                    descriptor,
                    is_interface: *tag == TAG_INTERFACE_METHODREF,
                })
            }
            _ => Err(self.unexpected(index, "Fieldref/Methodref")),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), BytecodeError> {
        match self.get(index)? {
            Constant::NameAndType { name_index, descriptor_index } => {
                Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
            }
            _ => Err(self.unexpected(index, "NameAndType")),
        }
    }
}

// ============================================================================
// MODIFIED UTF-8
// ============================================================================

/// Decode JVM "modified UTF-8" (2-byte NUL, surrogate pairs as two 3-byte
/// sequences). Returns None on a malformed byte sequence; unpaired
/// surrogates are replaced rather than rejected.
pub fn decode_modified_utf8(raw: &[u8]) -> Option<String> {
    if raw.iter().all(|b| *b < 0x80 && *b != 0) {
        return std::str::from_utf8(raw).ok().map(str::to_string);
    }

    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let a = raw[i];
        if a & 0x80 == 0 {
            if a == 0 {
                return None;
            }
            units.push(a as u16);
            i += 1;
        } else if a & 0xE0 == 0xC0 {
            let b = *raw.get(i + 1)?;
            if b & 0xC0 != 0x80 {
                return None;
            }
            units.push((((a & 0x1F) as u16) << 6) | (b & 0x3F) as u16);
            i += 2;
        } else if a & 0xF0 == 0xE0 {
            let b = *raw.get(i + 1)?;
            let c = *raw.get(i + 2)?;
            if b & 0xC0 != 0x80 || c & 0xC0 != 0x80 {
                return None;
            }
            units.push((((a & 0x0F) as u16) << 12) | (((b & 0x3F) as u16) << 6) | (c & 0x3F) as u16);
            i += 3;
        } else {
            return None;
        }
    }

    Some(String::from_utf16_lossy(&units))
}
