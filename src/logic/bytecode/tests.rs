use super::*;
use crate::logic::testing::{AnnotationSpec, ClassBuilder, Op, ValueSpec, DEDICATED_SERVER, MINECRAFT};

/// Records every callback as a line of text
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl UnitVisitor for Recorder {
    fn on_unit_enter(&mut self, unit: &UnitHeader<'_>) {
        self.events.push(format!("enter {}", unit.name));
    }

    fn on_unit_exit(&mut self) {
        self.events.push("exit".to_string());
    }

    fn on_type_reference(&mut self, reference: SymbolRef<'_>) {
        match reference.member {
            Some(m) => self.events.push(format!("ref {:?} {}.{}", reference.kind, reference.owner, m)),
            None => self.events.push(format!("ref {:?} {}", reference.kind, reference.owner)),
        }
    }

    fn on_annotation(&mut self, annotation: &Annotation, target: AnnotationTarget<'_>) {
        self.events.push(format!("annotation {:?} {}", target, annotation.descriptor));
    }

    fn on_method_enter(&mut self, method: &MethodHeader<'_>) {
        self.events.push(format!("method {}{}", method.name, method.descriptor));
    }

    fn on_method_exit(&mut self) {
        self.events.push("method exit".to_string());
    }

    fn on_literal(&mut self, literal: &str) {
        self.events.push(format!("literal {}", literal));
    }
}

#[test]
fn test_walk_callback_order() {
    let bytes = ClassBuilder::new("com/example/Demo")
        .extends("com/example/Base")
        .implements("java/lang/Runnable")
        .annotate(AnnotationSpec::only_in("CLIENT"))
        .field("mc", "Lnet/minecraft/client/Minecraft;")
        .string_constant("MODE", "IGNORESERVERONLY")
        .method(
            "run",
            "(Lnet/minecraft/server/level/ServerLevel;)V",
            vec![Op::minecraft_instance(), Op::Pop, Op::Ldc("hello".into()), Op::Pop],
        )
        .build();

    let mut recorder = Recorder::default();
    let name = walk(&bytes, &mut recorder).unwrap();
    assert_eq!(name, "com/example/Demo");

    assert_eq!(
        recorder.events,
        vec![
            "enter com/example/Demo".to_string(),
            "annotation Class Lnet/neoforged/api/distmarker/OnlyIn;".to_string(),
            "ref Superclass com/example/Base".to_string(),
            "ref Interface java/lang/Runnable".to_string(),
            "ref FieldType net/minecraft/client/Minecraft".to_string(),
            "ref FieldType java/lang/String".to_string(),
            "literal IGNORESERVERONLY".to_string(),
            "method run(Lnet/minecraft/server/level/ServerLevel;)V".to_string(),
            "ref MethodSignature net/minecraft/server/level/ServerLevel".to_string(),
            format!("ref MethodCall {}.getInstance", MINECRAFT),
            "literal hello".to_string(),
            "method exit".to_string(),
            "exit".to_string(),
        ]
    );
}

#[test]
fn test_type_instructions_and_class_literals() {
    let bytes = ClassBuilder::new("com/example/Types")
        .method(
            "make",
            "()V",
            vec![
                Op::New(DEDICATED_SERVER.into()),
                Op::Pop,
                Op::LdcClass("[Lnet/minecraft/client/gui/screens/Screen;".into()),
                Op::Pop,
                Op::LdcClass("[I".into()),
                Op::Pop,
            ],
        )
        .build();

    let mut recorder = Recorder::default();
    walk(&bytes, &mut recorder).unwrap();

    assert!(recorder.events.contains(&format!("ref TypeCheck {}", DEDICATED_SERVER)));
    assert!(recorder.events.contains(&"ref ClassLiteral net/minecraft/client/gui/screens/Screen".to_string()));
    // primitive arrays carry no owner
    assert_eq!(recorder.events.iter().filter(|e| e.starts_with("ref ClassLiteral")).count(), 1);
}

#[test]
fn test_interface_call_and_field_read() {
    let bytes = ClassBuilder::new("com/example/Calls")
        .method(
            "go",
            "()V",
            vec![
                Op::InvokeInterface {
                    owner: "net/minecraft/client/gui/components/Renderable".into(),
                    name: "render".into(),
                    descriptor: "()V".into(),
                },
                Op::dist_check(),
                Op::Pop,
            ],
        )
        .build();

    let mut recorder = Recorder::default();
    walk(&bytes, &mut recorder).unwrap();
    assert!(recorder.events.contains(&"ref MethodCall net/minecraft/client/gui/components/Renderable.render".to_string()));
    assert!(recorder.events.contains(&"ref FieldRead net/neoforged/fml/loading/FMLEnvironment.dist".to_string()));
}

#[test]
fn test_abstract_method_has_no_body() {
    let bytes = ClassBuilder::new("com/example/Api").abstract_method("tick", "()V").build();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.methods.len(), 1);
    assert!(class.methods[0].code.is_none());

    let mut recorder = Recorder::default();
    walk(&bytes, &mut recorder).unwrap();
    assert!(recorder.events.contains(&"method tick()V".to_string()));
}

#[test]
fn test_class_file_header_fields() {
    let bytes = ClassBuilder::new("com/example/Header").implements("java/io/Serializable").build();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.name(), "com/example/Header");
    assert_eq!(class.super_name(), Some("java/lang/Object"));
    assert_eq!(class.interface_names(), vec!["java/io/Serializable"]);
    assert_eq!(class.major_version, 65);
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = ClassBuilder::new("com/example/X").build();
    bytes[0] = 0x00;
    let mut recorder = Recorder::default();
    assert!(matches!(walk(&bytes, &mut recorder), Err(BytecodeError::BadMagic { .. })));
    assert!(recorder.events.is_empty());
}

#[test]
fn test_truncated_unit_issues_no_callbacks() {
    let bytes = ClassBuilder::new("com/example/Cut")
        .method("a", "()V", vec![Op::minecraft_instance(), Op::Pop])
        .build();
    let cut = &bytes[..bytes.len() - 3];

    let mut recorder = Recorder::default();
    assert!(walk(cut, &mut recorder).is_err());
    assert!(recorder.events.is_empty());
}

fn nested_annotation(depth: usize) -> AnnotationSpec {
    AnnotationSpec {
        descriptor: "Lcom/example/Deep;".to_string(),
        values: vec![("value".to_string(), ValueSpec::NestedArray(depth))],
    }
}

#[test]
fn test_annotation_nesting_within_limit_is_decoded() {
    let bytes = ClassBuilder::new("com/example/Shallow")
        .annotate(nested_annotation(MAX_ANNOTATION_DEPTH as usize - 2))
        .build();

    let mut recorder = Recorder::default();
    assert_eq!(walk(&bytes, &mut recorder).unwrap(), "com/example/Shallow");
    assert!(recorder.events.contains(&"annotation Class Lcom/example/Deep;".to_string()));
}

#[test]
fn test_deeply_nested_annotation_is_rejected() {
    // far past the limit; unbounded recursion would exhaust the stack here
    let bytes = ClassBuilder::new("com/example/Deep").annotate(nested_annotation(200_000)).build();

    let mut recorder = Recorder::default();
    assert_eq!(
        walk(&bytes, &mut recorder),
        Err(BytecodeError::AnnotationTooDeep { limit: MAX_ANNOTATION_DEPTH })
    );
    assert!(recorder.events.is_empty());
}
