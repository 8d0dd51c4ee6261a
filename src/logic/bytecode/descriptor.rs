//! Type descriptor parsing
//!
//! Only object types matter for side analysis, so primitives are skipped and
//! arrays are reduced to their element type.

use super::error::BytecodeError;

/// Object types named by a field descriptor (`Lfoo/Bar;`, `[[Lfoo/Bar;`, `I`)
pub fn field_object_types(descriptor: &str) -> Result<Vec<&str>, BytecodeError> {
    let mut out = Vec::with_capacity(1);
    let rest = parse_one(descriptor, descriptor, &mut out)?;
    if !rest.is_empty() {
        return Err(bad(descriptor));
    }
    Ok(out)
}

/// Object types named by a method descriptor: parameters first, then return
pub fn method_object_types(descriptor: &str) -> Result<Vec<&str>, BytecodeError> {
    let mut rest = descriptor.strip_prefix('(').ok_or_else(|| bad(descriptor))?;
    let mut out = Vec::new();

    while !rest.starts_with(')') {
        if rest.is_empty() {
            return Err(bad(descriptor));
        }
        rest = parse_one(rest, descriptor, &mut out)?;
    }
    rest = &rest[1..];

    if rest == "V" {
        return Ok(out);
    }
    let tail = parse_one(rest, descriptor, &mut out)?;
    if !tail.is_empty() {
        return Err(bad(descriptor));
    }
    Ok(out)
}

/// Element type of a Class constant: plain internal names pass through,
/// array descriptors resolve to their object element type (None for
/// primitive arrays).
pub fn class_constant_element(name: &str) -> Option<&str> {
    if !name.starts_with('[') {
        return Some(name);
    }
    let element = name.trim_start_matches('[');
    element.strip_prefix('L').and_then(|s| s.strip_suffix(';'))
}

fn parse_one<'a>(input: &'a str, whole: &str, out: &mut Vec<&'a str>) -> Result<&'a str, BytecodeError> {
    let trimmed = input.trim_start_matches('[');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => Ok(&trimmed[1..]),
        Some('L') => {
            let end = trimmed.find(';').ok_or_else(|| bad(whole))?;
            let name = &trimmed[1..end];
            if name.is_empty() {
                return Err(bad(whole));
            }
            out.push(name);
            Ok(&trimmed[end + 1..])
        }
        _ => Err(bad(whole)),
    }
}

fn bad(descriptor: &str) -> BytecodeError {
    BytecodeError::BadDescriptor { descriptor: descriptor.to_string() }
}
