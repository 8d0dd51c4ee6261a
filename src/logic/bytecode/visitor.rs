//! Symbol visitor
//!
//! `walk` decodes one compiled unit completely before issuing any callback, so
//! a malformed unit never leaves a visitor half-updated. Callbacks then arrive
//! in a fixed order:
//!
//! unit enter → class annotations → superclass / interfaces →
//! per field (enter, annotations, type, constant) →
//! per method (enter, annotations, signature, instructions + literals, exit) →
//! unit exit

use super::annotation::Annotation;
use super::class_file::ClassFile;
use super::descriptor::{class_constant_element, field_object_types, method_object_types};
use super::error::BytecodeError;
use super::instructions::{decode, Instruction};

// ============================================================================
// CALLBACK TYPES
// ============================================================================

/// Where a type reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Superclass,
    Interface,
    FieldType,
    MethodSignature,
    MethodCall,
    FieldRead,
    FieldWrite,
    TypeCheck,
    ClassLiteral,
}

/// One reference to another unit, in internal (`a/b/C`) form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef<'a> {
    pub owner: &'a str,
    /// Member name for calls and field accesses
    pub member: Option<&'a str>,
    pub kind: RefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationTarget<'a> {
    Class,
    Field(&'a str),
    Method(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub struct UnitHeader<'a> {
    pub name: &'a str,
    pub access_flags: u16,
    pub major_version: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct MethodHeader<'a> {
    pub name: &'a str,
    pub descriptor: &'a str,
    pub access_flags: u16,
}

/// Receiver of walk events
pub trait UnitVisitor {
    fn on_unit_enter(&mut self, _unit: &UnitHeader<'_>) {}
    fn on_unit_exit(&mut self) {}
    fn on_field_enter(&mut self, _name: &str, _access_flags: u16) {}

    fn on_type_reference(&mut self, reference: SymbolRef<'_>);
    fn on_annotation(&mut self, annotation: &Annotation, target: AnnotationTarget<'_>);
    fn on_method_enter(&mut self, method: &MethodHeader<'_>);
    fn on_method_exit(&mut self);
    fn on_literal(&mut self, literal: &str);
}

// ============================================================================
// WALK
// ============================================================================

/// Decode `bytes` and drive `visitor` over it. Returns the unit name.
pub fn walk<V: UnitVisitor + ?Sized>(bytes: &[u8], visitor: &mut V) -> Result<String, BytecodeError> {
    let class = ClassFile::parse(bytes)?;

    // Decode every method body and descriptor before the first callback
    let mut bodies = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        let signature = method_object_types(&method.descriptor)?;
        let instructions = match &method.code {
            Some(code) => decode(code, &class.pool)?,
            None => Vec::new(),
        };
        bodies.push((signature, instructions));
    }
    let mut field_types = Vec::with_capacity(class.fields.len());
    for field in &class.fields {
        let constant = match field.constant_value {
            Some(index) => class.pool.string_literal(index)?,
            None => None,
        };
        field_types.push((field_object_types(&field.descriptor)?, constant));
    }

    let name = class.name();
    visitor.on_unit_enter(&UnitHeader {
        name,
        access_flags: class.access_flags,
        major_version: class.major_version,
    });

    for annotation in &class.annotations {
        visitor.on_annotation(annotation, AnnotationTarget::Class);
    }

    if let Some(super_name) = class.super_name() {
        emit_class(visitor, super_name, RefKind::Superclass);
    }
    for iface in class.interface_names() {
        emit_class(visitor, iface, RefKind::Interface);
    }

    for (field, (types, constant)) in class.fields.iter().zip(&field_types) {
        visitor.on_field_enter(&field.name, field.access_flags);
        for annotation in &field.annotations {
            visitor.on_annotation(annotation, AnnotationTarget::Field(&field.name));
        }
        for owner in types.iter().copied() {
            visitor.on_type_reference(SymbolRef { owner, member: None, kind: RefKind::FieldType });
        }
        if let Some(literal) = constant {
            visitor.on_literal(literal);
        }
    }

    for (method, (signature, instructions)) in class.methods.iter().zip(&bodies) {
        visitor.on_method_enter(&MethodHeader {
            name: &method.name,
            descriptor: &method.descriptor,
            access_flags: method.access_flags,
        });
        for annotation in &method.annotations {
            visitor.on_annotation(annotation, AnnotationTarget::Method(&method.name));
        }
        for owner in signature.iter().copied() {
            visitor.on_type_reference(SymbolRef { owner, member: None, kind: RefKind::MethodSignature });
        }
        for insn in instructions {
            emit_instruction(visitor, insn);
        }
        visitor.on_method_exit();
    }

    visitor.on_unit_exit();
    Ok(name.to_string())
}

fn emit_class<V: UnitVisitor + ?Sized>(visitor: &mut V, name: &str, kind: RefKind) {
    if let Some(owner) = class_constant_element(name) {
        visitor.on_type_reference(SymbolRef { owner, member: None, kind });
    }
}

fn emit_instruction<V: UnitVisitor + ?Sized>(visitor: &mut V, insn: &Instruction<'_>) {
    use super::instructions::{GETFIELD, GETSTATIC};

    match insn {
        Instruction::Invoke { member, .. } => {
            if let Some(owner) = class_constant_element(member.owner) {
                visitor.on_type_reference(SymbolRef {
                    owner,
                    member: Some(member.name),
                    kind: RefKind::MethodCall,
                });
            }
        }
        Instruction::FieldAccess { opcode, member } => {
            let kind = if matches!(*opcode, GETSTATIC | GETFIELD) { RefKind::FieldRead } else { RefKind::FieldWrite };
            if let Some(owner) = class_constant_element(member.owner) {
                visitor.on_type_reference(SymbolRef { owner, member: Some(member.name), kind });
            }
        }
        Instruction::TypeInsn { class_name, .. } => emit_class(visitor, class_name, RefKind::TypeCheck),
        Instruction::ClassLiteral(name) => emit_class(visitor, name, RefKind::ClassLiteral),
        Instruction::StringLiteral(s) => visitor.on_literal(s),
    }
}
