//! Class file structure
//!
//! Parses the fixed layout of a compiled unit: header, constant pool,
//! interfaces, fields, methods and the attributes we care about
//! (annotations, `Code`, `ConstantValue`). Everything else is skipped by length.

use super::annotation::{parse_annotations, Annotation};
use super::constant_pool::ConstantPool;
use super::error::BytecodeError;
use super::reader::ByteReader;

pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

const ATTR_CODE: &str = "Code";
const ATTR_CONSTANT_VALUE: &str = "ConstantValue";
const ATTR_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const ATTR_INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub major_version: u16,
    pub minor_version: u16,
    pub access_flags: u16,
    pub pool: ConstantPool,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
    /// Index of a `ConstantValue` attribute, if any
    pub constant_value: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<Annotation>,
    /// Raw bytecode of the `Code` attribute (absent for abstract/native)
    pub code: Option<Vec<u8>>,
}

/// Attributes collected from one attribute table
#[derive(Default)]
struct Attributes {
    annotations: Vec<Annotation>,
    code: Option<Vec<u8>>,
    constant_value: Option<u16>,
}

// ============================================================================
// PARSING
// ============================================================================

impl ClassFile {
    pub fn parse(data: &[u8]) -> Result<Self, BytecodeError> {
        let mut reader = ByteReader::new(data);

        let magic = reader.u32()?;
        if magic != CLASS_MAGIC {
            return Err(BytecodeError::BadMagic { found: magic });
        }
        let minor_version = reader.u16()?;
        let major_version = reader.u16()?;
        let pool = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.u16()?;
        let this_class = reader.u16()?;
        let super_class = reader.u16()?;

        let interface_count = reader.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(reader.u16()?);
        }

        let field_count = reader.u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let access_flags = reader.u16()?;
            let name = pool.utf8(reader.u16()?)?.to_string();
            let descriptor = pool.utf8(reader.u16()?)?.to_string();
            let attrs = parse_attributes(&mut reader, &pool)?;
            fields.push(FieldInfo {
                access_flags,
                name,
                descriptor,
                annotations: attrs.annotations,
                constant_value: attrs.constant_value,
            });
        }

        let method_count = reader.u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            let access_flags = reader.u16()?;
            let name = pool.utf8(reader.u16()?)?.to_string();
            let descriptor = pool.utf8(reader.u16()?)?.to_string();
            let attrs = parse_attributes(&mut reader, &pool)?;
            methods.push(MethodInfo {
                access_flags,
                name,
                descriptor,
                annotations: attrs.annotations,
                code: attrs.code,
            });
        }

        let class_attrs = parse_attributes(&mut reader, &pool)?;

        // Validate the header symbols up front so the walk cannot fail half-way
        pool.class_name(this_class)?;
        pool.optional_class_name(super_class)?;
        for iface in &interfaces {
            pool.class_name(*iface)?;
        }

        Ok(Self {
            major_version,
            minor_version,
            access_flags,
            pool,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            annotations: class_attrs.annotations,
        })
    }

    pub fn name(&self) -> &str {
        self.pool.class_name(self.this_class).unwrap_or("")
    }

    pub fn super_name(&self) -> Option<&str> {
        self.pool.optional_class_name(self.super_class).ok().flatten()
    }

    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces
            .iter()
            .filter_map(|i| self.pool.class_name(*i).ok())
            .collect()
    }
}

fn parse_attributes(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<Attributes, BytecodeError> {
    let count = reader.u16()?;
    let mut attrs = Attributes::default();

    for _ in 0..count {
        let name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()? as usize;
        let body = reader.bytes(len)?;
        let mut sub = ByteReader::new(body);

        match name {
            ATTR_VISIBLE_ANNOTATIONS => attrs.annotations.extend(parse_annotations(&mut sub, pool, true)?),
            ATTR_INVISIBLE_ANNOTATIONS => attrs.annotations.extend(parse_annotations(&mut sub, pool, false)?),
            ATTR_CODE => {
                sub.skip(4)?; // max_stack, max_locals
                let code_len = sub.u32()? as usize;
                attrs.code = Some(sub.bytes(code_len)?.to_vec());
            }
            ATTR_CONSTANT_VALUE => attrs.constant_value = Some(sub.u16()?),
            _ => {}
        }
    }

    Ok(attrs)
}
