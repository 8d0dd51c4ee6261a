//! Test fixtures: a minimal class file writer and a jar writer.
//!
//! Produces well-formed class files so the walker and the extractor
//! are exercised on the same bytes a compiler would emit.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const NEO_ONLY_IN: &str = "Lnet/neoforged/api/distmarker/OnlyIn;";
pub const NEO_DIST: &str = "Lnet/neoforged/api/distmarker/Dist;";
pub const NEO_SUBSCRIBER: &str = "Lnet/neoforged/fml/common/EventBusSubscriber;";
pub const FORGE_ONLY_IN: &str = "Lnet/minecraftforge/api/distmarker/OnlyIn;";
pub const FORGE_DIST: &str = "Lnet/minecraftforge/api/distmarker/Dist;";

pub const MINECRAFT: &str = "net/minecraft/client/Minecraft";
pub const DEDICATED_SERVER: &str = "net/minecraft/server/dedicated/DedicatedServer";
pub const FML_ENVIRONMENT: &str = "net/neoforged/fml/loading/FMLEnvironment";

// ============================================================================
// SPECS
// ============================================================================

#[derive(Debug, Clone)]
pub enum ValueSpec {
    Enum(String, String),
    EnumArray(Vec<(String, String)>),
    Str(String),
    /// Arrays nested this many levels deep around an empty array
    NestedArray(usize),
}

#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    pub descriptor: String,
    pub values: Vec<(String, ValueSpec)>,
}

impl AnnotationSpec {
    pub fn marker(descriptor: &str) -> Self {
        Self { descriptor: descriptor.to_string(), values: Vec::new() }
    }

    /// `@OnlyIn(Dist.<constant>)` from the NeoForge distmarker package
    pub fn only_in(constant: &str) -> Self {
        Self {
            descriptor: NEO_ONLY_IN.to_string(),
            values: vec![("value".to_string(), ValueSpec::Enum(NEO_DIST.to_string(), constant.to_string()))],
        }
    }

    /// `@EventBusSubscriber(modid = "demo", value = {Dist.<constants>})`
    pub fn subscriber(constants: &[&str]) -> Self {
        let dists = constants.iter().map(|c| (NEO_DIST.to_string(), c.to_string())).collect();
        Self {
            descriptor: NEO_SUBSCRIBER.to_string(),
            values: vec![
                ("modid".to_string(), ValueSpec::Str("demo".to_string())),
                ("value".to_string(), ValueSpec::EnumArray(dists)),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum Op {
    InvokeStatic { owner: String, name: String, descriptor: String },
    InvokeVirtual { owner: String, name: String, descriptor: String },
    InvokeInterface { owner: String, name: String, descriptor: String },
    GetStatic { owner: String, name: String, descriptor: String },
    New(String),
    Ldc(String),
    LdcClass(String),
    Pop,
    Return,
}

impl Op {
    pub fn call(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeStatic { owner: owner.into(), name: name.into(), descriptor: descriptor.into() }
    }

    pub fn virtual_call(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::InvokeVirtual { owner: owner.into(), name: name.into(), descriptor: descriptor.into() }
    }

    pub fn get_static(owner: &str, name: &str, descriptor: &str) -> Self {
        Op::GetStatic { owner: owner.into(), name: name.into(), descriptor: descriptor.into() }
    }

    /// `Minecraft.getInstance()`
    pub fn minecraft_instance() -> Self {
        Op::call(MINECRAFT, "getInstance", "()Lnet/minecraft/client/Minecraft;")
    }

    /// `FMLEnvironment.dist` field read
    pub fn dist_check() -> Self {
        Op::get_static(FML_ENVIRONMENT, "dist", "Lnet/neoforged/api/distmarker/Dist;")
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    descriptor: String,
    annotations: Vec<AnnotationSpec>,
    constant: Option<String>,
}

#[derive(Debug, Clone)]
struct MethodSpec {
    name: String,
    descriptor: String,
    annotations: Vec<AnnotationSpec>,
    code: Option<Vec<Op>>,
}

// ============================================================================
// CLASS BUILDER
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access_flags: u16,
    annotations: Vec<AnnotationSpec>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access_flags: 0x0021,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, iface: &str) -> Self {
        self.interfaces.push(iface.to_string());
        self
    }

    pub fn annotate(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.annotated_field(name, descriptor, Vec::new())
    }

    pub fn annotated_field(mut self, name: &str, descriptor: &str, annotations: Vec<AnnotationSpec>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations,
            constant: None,
        });
        self
    }

    /// `static final String <name> = "<value>"`
    pub fn string_constant(mut self, name: &str, value: &str) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            descriptor: "Ljava/lang/String;".to_string(),
            annotations: Vec::new(),
            constant: Some(value.to_string()),
        });
        self
    }

    pub fn method(self, name: &str, descriptor: &str, code: Vec<Op>) -> Self {
        self.annotated_method(name, descriptor, Vec::new(), code)
    }

    pub fn annotated_method(
        mut self,
        name: &str,
        descriptor: &str,
        annotations: Vec<AnnotationSpec>,
        code: Vec<Op>,
    ) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations,
            code: Some(code),
        });
        self
    }

    pub fn abstract_method(mut self, name: &str, descriptor: &str) -> Self {
        self.methods.push(MethodSpec {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
            code: None,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();

        let this_index = pool.class(&self.name);
        let super_index = self.super_name.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        let interfaces: Vec<u16> = self.interfaces.iter().map(|i| pool.class(i)).collect();

        let mut body = Vec::new();
        put_u16(&mut body, self.access_flags);
        put_u16(&mut body, this_index);
        put_u16(&mut body, super_index);
        put_u16(&mut body, interfaces.len() as u16);
        for i in &interfaces {
            put_u16(&mut body, *i);
        }

        put_u16(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            put_u16(&mut body, 0x0019);
            put_u16(&mut body, pool.utf8(&field.name));
            put_u16(&mut body, pool.utf8(&field.descriptor));
            let mut attrs = Vec::new();
            if !field.annotations.is_empty() {
                attrs.push(annotations_attribute(&mut pool, &field.annotations));
            }
            if let Some(value) = &field.constant {
                let mut attr = Vec::new();
                put_u16(&mut attr, pool.utf8("ConstantValue"));
                put_u32(&mut attr, 2);
                put_u16(&mut attr, pool.string(value));
                attrs.push(attr);
            }
            write_attributes(&mut body, attrs);
        }

        put_u16(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            put_u16(&mut body, if method.code.is_some() { 0x0009 } else { 0x0401 });
            put_u16(&mut body, pool.utf8(&method.name));
            put_u16(&mut body, pool.utf8(&method.descriptor));
            let mut attrs = Vec::new();
            if !method.annotations.is_empty() {
                attrs.push(annotations_attribute(&mut pool, &method.annotations));
            }
            if let Some(ops) = &method.code {
                attrs.push(code_attribute(&mut pool, ops));
            }
            write_attributes(&mut body, attrs);
        }

        let mut class_attrs = Vec::new();
        if !self.annotations.is_empty() {
            class_attrs.push(annotations_attribute(&mut pool, &self.annotations));
        }
        write_attributes(&mut body, class_attrs);

        let mut out = Vec::new();
        put_u32(&mut out, 0xCAFE_BABE);
        put_u16(&mut out, 0);
        put_u16(&mut out, 65);
        put_u16(&mut out, pool.next);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

#[derive(Debug)]
struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
    cache: HashMap<(u8, String), u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self { bytes: Vec::new(), next: 1, cache: HashMap::new() }
    }
}

impl PoolWriter {
    fn intern(&mut self, tag: u8, key: String, payload: Vec<u8>) -> u16 {
        if let Some(index) = self.cache.get(&(tag, key.clone())) {
            return *index;
        }
        let index = self.next;
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&payload);
        self.next += 1;
        self.cache.insert((tag, key), index);
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut payload = Vec::new();
        put_u16(&mut payload, s.len() as u16);
        payload.extend_from_slice(s.as_bytes());
        self.intern(1, s.to_string(), payload)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.intern(7, name.to_string(), name_index.to_be_bytes().to_vec())
    }

    fn string(&mut self, s: &str) -> u16 {
        let utf8_index = self.utf8(s);
        self.intern(8, s.to_string(), utf8_index.to_be_bytes().to_vec())
    }

    fn member(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut nat = Vec::new();
        put_u16(&mut nat, name_index);
        put_u16(&mut nat, descriptor_index);
        let nat_index = self.intern(12, format!("{name}:{descriptor}"), nat);

        let mut payload = Vec::new();
        put_u16(&mut payload, class_index);
        put_u16(&mut payload, nat_index);
        self.intern(tag, format!("{owner}.{name}:{descriptor}"), payload)
    }
}

fn code_attribute(pool: &mut PoolWriter, ops: &[Op]) -> Vec<u8> {
    let mut code = Vec::new();
    for op in ops {
        match op {
            Op::InvokeStatic { owner, name, descriptor } => {
                code.push(0xb8);
                put_u16(&mut code, pool.member(10, owner, name, descriptor));
            }
            Op::InvokeVirtual { owner, name, descriptor } => {
                code.push(0xb6);
                put_u16(&mut code, pool.member(10, owner, name, descriptor));
            }
            Op::InvokeInterface { owner, name, descriptor } => {
                code.push(0xb9);
                put_u16(&mut code, pool.member(11, owner, name, descriptor));
                code.extend_from_slice(&[1, 0]);
            }
            Op::GetStatic { owner, name, descriptor } => {
                code.push(0xb2);
                put_u16(&mut code, pool.member(9, owner, name, descriptor));
            }
            Op::New(class) => {
                code.push(0xbb);
                put_u16(&mut code, pool.class(class));
            }
            Op::Ldc(s) => {
                let index = pool.string(s);
                if index < 256 {
                    code.extend_from_slice(&[0x12, index as u8]);
                } else {
                    code.push(0x13);
                    put_u16(&mut code, index);
                }
            }
            Op::LdcClass(class) => {
                code.push(0x13);
                put_u16(&mut code, pool.class(class));
            }
            Op::Pop => code.push(0x57),
            Op::Return => code.push(0xb1),
        }
    }
    if !matches!(ops.last(), Some(Op::Return)) {
        code.push(0xb1);
    }

    let mut attr = Vec::new();
    put_u16(&mut attr, pool.utf8("Code"));
    put_u32(&mut attr, (12 + code.len()) as u32);
    put_u16(&mut attr, 8); // max_stack
    put_u16(&mut attr, 8); // max_locals
    put_u32(&mut attr, code.len() as u32);
    attr.extend_from_slice(&code);
    put_u16(&mut attr, 0); // exception table
    put_u16(&mut attr, 0); // attributes
    attr
}

fn annotations_attribute(pool: &mut PoolWriter, annotations: &[AnnotationSpec]) -> Vec<u8> {
    let mut data = Vec::new();
    put_u16(&mut data, annotations.len() as u16);
    for annotation in annotations {
        put_u16(&mut data, pool.utf8(&annotation.descriptor));
        put_u16(&mut data, annotation.values.len() as u16);
        for (name, value) in &annotation.values {
            put_u16(&mut data, pool.utf8(name));
            match value {
                ValueSpec::Enum(ty, constant) => write_enum(&mut data, pool, ty, constant),
                ValueSpec::EnumArray(items) => {
                    data.push(b'[');
                    put_u16(&mut data, items.len() as u16);
                    for (ty, constant) in items {
                        write_enum(&mut data, pool, ty, constant);
                    }
                }
                ValueSpec::Str(s) => {
                    data.push(b's');
                    put_u16(&mut data, pool.utf8(s));
                }
                ValueSpec::NestedArray(depth) => {
                    for _ in 0..*depth {
                        data.push(b'[');
                        put_u16(&mut data, 1);
                    }
                    data.push(b'[');
                    put_u16(&mut data, 0);
                }
            }
        }
    }

    let mut attr = Vec::new();
    put_u16(&mut attr, pool.utf8("RuntimeVisibleAnnotations"));
    put_u32(&mut attr, data.len() as u32);
    attr.extend_from_slice(&data);
    attr
}

fn write_enum(data: &mut Vec<u8>, pool: &mut PoolWriter, ty: &str, constant: &str) {
    data.push(b'e');
    put_u16(data, pool.utf8(ty));
    put_u16(data, pool.utf8(constant));
}

fn write_attributes(out: &mut Vec<u8>, attrs: Vec<Vec<u8>>) {
    put_u16(out, attrs.len() as u16);
    for attr in attrs {
        out.extend_from_slice(&attr);
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

// ============================================================================
// JAR WRITER
// ============================================================================

/// Write a jar at `path` holding the given `(entry name, bytes)` pairs in order
pub fn write_jar<S: AsRef<str>>(path: &Path, entries: &[(S, Vec<u8>)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(name.as_ref(), options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Class entry `(path.class, bytes)` for a builder
pub fn class_entry(builder: &ClassBuilder) -> (String, Vec<u8>) {
    (format!("{}.class", builder.name), builder.build())
}
