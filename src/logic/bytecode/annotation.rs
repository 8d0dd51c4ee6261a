//! Annotation decoding (`RuntimeVisibleAnnotations` / `RuntimeInvisibleAnnotations`)

use super::constant_pool::ConstantPool;
use super::error::BytecodeError;
use super::reader::ByteReader;

/// Deepest nesting of array and annotation element values accepted
pub const MAX_ANNOTATION_DEPTH: u16 = 64;

/// One annotation instance with its element/value pairs
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Type descriptor, e.g. `Lnet/neoforged/api/distmarker/OnlyIn;`
    pub descriptor: String,
    pub elements: Vec<(String, ElementValue)>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Primitive constant, kept as its textual form
    Const(String),
    String(String),
    Enum { type_descriptor: String, constant: String },
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

impl Annotation {
    /// Enum constants bound to `name`, looking through array values
    /// (`@EventBusSubscriber(value = {Dist.CLIENT})` and `@OnlyIn(Dist.CLIENT)`
    /// both yield `(Lnet/.../Dist;, CLIENT)`).
    pub fn enum_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.elements
            .iter()
            .filter(move |(n, _)| n == name)
            .flat_map(|(_, v)| {
                let mut found = Vec::new();
                collect_enums(v, &mut found);
                found
            })
    }
}

fn collect_enums<'a>(value: &'a ElementValue, out: &mut Vec<(&'a str, &'a str)>) {
    match value {
        ElementValue::Enum { type_descriptor, constant } => {
            out.push((type_descriptor.as_str(), constant.as_str()))
        }
        ElementValue::Array(items) => items.iter().for_each(|v| collect_enums(v, out)),
        _ => {}
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse the body of an annotations attribute
pub fn parse_annotations(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    visible: bool,
) -> Result<Vec<Annotation>, BytecodeError> {
    let count = reader.u16()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(parse_annotation(reader, pool, visible, 0)?);
    }
    Ok(out)
}

fn parse_annotation(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    visible: bool,
    depth: u16,
) -> Result<Annotation, BytecodeError> {
    if depth > MAX_ANNOTATION_DEPTH {
        return Err(BytecodeError::AnnotationTooDeep { limit: MAX_ANNOTATION_DEPTH });
    }
    let descriptor = pool.utf8(reader.u16()?)?.to_string();
    let pairs = reader.u16()?;
    let mut elements = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let name = pool.utf8(reader.u16()?)?.to_string();
        let value = parse_element(reader, pool, visible, depth + 1)?;
        elements.push((name, value));
    }
    Ok(Annotation { descriptor, elements, visible })
}

fn parse_element(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    visible: bool,
    depth: u16,
) -> Result<ElementValue, BytecodeError> {
    if depth > MAX_ANNOTATION_DEPTH {
        return Err(BytecodeError::AnnotationTooDeep { limit: MAX_ANNOTATION_DEPTH });
    }
    let tag = reader.u8()? as char;
    let value = match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' => {
            // Primitive constants are not side signals; keep the tag only
            reader.u16()?;
            ElementValue::Const(tag.to_string())
        }
        's' => ElementValue::String(pool.utf8(reader.u16()?)?.to_string()),
        'e' => {
            let type_descriptor = pool.utf8(reader.u16()?)?.to_string();
            let constant = pool.utf8(reader.u16()?)?.to_string();
            ElementValue::Enum { type_descriptor, constant }
        }
        'c' => ElementValue::Class(pool.utf8(reader.u16()?)?.to_string()),
        '@' => ElementValue::Annotation(Box::new(parse_annotation(reader, pool, visible, depth + 1)?)),
        '[' => {
            let n = reader.u16()?;
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(parse_element(reader, pool, visible, depth + 1)?);
            }
            ElementValue::Array(items)
        }
        other => return Err(BytecodeError::BadElementTag { tag: other }),
    };
    Ok(value)
}
