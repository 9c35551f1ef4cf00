use classforge_bytecode::{
    AnnotationNode, ClassFileVersion, ClassHeader, ClassVisitor, ClassWriter, FieldVisitor,
    MethodVisitor,
};
use classforge_core::ModifierReviewable;
use classforge_core::modifier::{ACC_ABSTRACT, ACC_PUBLIC, ACC_SUPER};
use indoc::indoc;

use super::{FieldToken, MethodToken, TypeDefinition, TypePool, lang};
use crate::Error;
use crate::test_utils::{BASE, MARKER, SEALED, pool};

#[test]
fn starts_with_language_types() {
    let pool = TypePool::new();
    for name in [
        lang::OBJECT,
        lang::STRING,
        lang::THROWABLE,
        lang::RUNTIME_EXCEPTION,
        lang::RETENTION,
        lang::INHERITED,
    ] {
        assert!(pool.contains(name), "{name}");
    }
    assert!(pool.contains("int"));
    assert!(pool.contains("java.lang.String[]"));
    assert!(!pool.contains("demo.Missing"));
    assert!(!pool.contains("demo.Missing[]"));
}

#[test]
fn unknown_type_is_not_found() {
    let pool = TypePool::new();
    assert!(matches!(pool.describe("demo.Missing"), Err(Error::NotFound(_))));
}

#[test]
fn pools_are_independent() {
    let first = TypePool::new();
    let second = TypePool::new();
    first.define(TypeDefinition::class("demo.Only")).unwrap();

    assert!(first.contains("demo.Only"));
    assert!(!second.contains("demo.Only"));
    assert!(first.clone().contains("demo.Only"));
}

#[test]
fn define_defaults_supertype_to_object() {
    let pool = TypePool::new();
    let ty = pool.define(TypeDefinition::class("demo.Plain")).unwrap();
    assert_eq!(ty.super_type().unwrap().name(), lang::OBJECT);

    let interface = pool.define(TypeDefinition::interface("demo.Api")).unwrap();
    assert!(interface.super_type().is_none());
    assert!(interface.is_interface());
    assert!(interface.is_abstract());
}

#[test]
fn define_all_allows_mutual_references() {
    let pool = TypePool::new();
    let defined = pool
        .define_all([
            TypeDefinition::class("demo.Node").field(FieldToken::new("next", "demo.Node")),
            TypeDefinition::class("demo.Leaf")
                .extends("demo.Node")
                .method(MethodToken::new("parent", "demo.Node")),
        ])
        .unwrap();

    assert_eq!(defined.len(), 2);
    assert_eq!(defined[1].super_type().unwrap().name(), "demo.Node");
}

#[test]
fn rejects_invalid_definitions() {
    let pool = pool();
    let cases = [
        TypeDefinition::class("demo.public"),
        TypeDefinition::class(".demo.Foo"),
        TypeDefinition::class(BASE),
        TypeDefinition::class("demo.Foo").extends("demo.Missing"),
        TypeDefinition::class("demo.Foo").extends(lang::CHAR_SEQUENCE),
        TypeDefinition::class("demo.Foo").extends(SEALED),
        TypeDefinition::class("demo.Foo").implements(lang::OBJECT),
        TypeDefinition::class("demo.Foo")
            .implements(lang::CLONEABLE)
            .implements(lang::CLONEABLE),
        TypeDefinition::class("demo.Foo").field(FieldToken::new("x", "demo.Missing")),
        TypeDefinition::class("demo.Foo").field(FieldToken::new("x", "void")),
        TypeDefinition::class("demo.Foo").field(FieldToken::new("class", "int")),
        TypeDefinition::class("demo.Foo").method(MethodToken::new("<run>", "void")),
        TypeDefinition::class("demo.Foo")
            .method(MethodToken::new("run", "void"))
            .method(MethodToken::new("run", "void")),
        TypeDefinition::class("demo.Foo").annotation(super::AnnotationToken::new("demo.Missing")),
    ];

    for definition in cases {
        let debug = format!("{definition:?}");
        assert!(
            matches!(pool.define(definition), Err(Error::InvalidArgument(_))),
            "{debug}"
        );
    }
}

#[test]
fn rejects_cycles_and_duplicates_in_batch() {
    let pool = TypePool::new();
    let cycle = pool.define_all([
        TypeDefinition::class("demo.A").extends("demo.B"),
        TypeDefinition::class("demo.B").extends("demo.A"),
    ]);
    assert!(matches!(cycle, Err(Error::InvalidArgument(_))));
    assert!(!pool.contains("demo.A"));

    let twice = pool.define_all([
        TypeDefinition::class("demo.A"),
        TypeDefinition::class("demo.A"),
    ]);
    assert!(matches!(twice, Err(Error::InvalidArgument(_))));
}

#[test]
fn loads_manifest() {
    let pool = pool();
    let json = indoc! {r#"
        [
          {
            "name": "demo.Service",
            "modifiers": ["public", "interface", "abstract"],
            "methods": [
              { "name": "call", "descriptor": "(I)Ljava/lang/Object;",
                "modifiers": ["public", "abstract"], "exceptions": ["java.lang.Exception"] }
            ],
            "annotations": [
              { "type": "demo.Marker", "values": { "value": "svc" } }
            ]
          },
          {
            "name": "demo.ServiceImpl",
            "modifiers": ["public"],
            "interfaces": ["demo.Service"],
            "fields": [ { "name": "calls", "descriptor": "J", "modifiers": ["private"] } ]
          }
        ]
    "#};

    let defined = pool.load_manifest(json).unwrap();
    let service = &defined[0];
    assert!(service.is_interface());
    let call = &service.declared_methods()[0];
    assert_eq!(call.descriptor(), "(I)Ljava/lang/Object;");
    assert_eq!(call.exception_types()[0].name(), lang::EXCEPTION);
    assert_eq!(service.declared_annotations()[0].annotation_type().name(), MARKER);

    let implementation = &defined[1];
    assert!(implementation.is_assignable_to(service));
    assert_eq!(implementation.declared_fields()[0].field_type().name(), "long");
}

#[test]
fn manifest_errors_are_invalid_arguments() {
    let pool = TypePool::new();
    let cases = [
        r#"[{ "name": 1 }]"#,
        r#"[{ "name": "demo.X", "modifiers": ["sealed"] }]"#,
        r#"[{ "name": "demo.X", "annotations": [{ "type": "java.lang.annotation.Inherited", "values": { "v": 1.5 } }] }]"#,
    ];
    for json in cases {
        assert!(matches!(pool.load_manifest(json), Err(Error::InvalidArgument(_))), "{json}");
    }
    let bad_descriptor = r#"[{ "name": "demo.X", "fields": [{ "name": "x", "descriptor": "Q" }] }]"#;
    assert!(matches!(pool.load_manifest(bad_descriptor), Err(Error::ClassFile(_))));
}

#[test]
fn defines_class_file() {
    let mut writer = ClassWriter::new();
    writer.visit(ClassHeader {
        version: ClassFileVersion::JAVA_V8,
        access: ACC_PUBLIC | ACC_SUPER | ACC_ABSTRACT,
        name: "demo/Image".into(),
        super_name: Some("demo/Base".into()),
        interfaces: vec!["java/lang/Cloneable".into()],
    });
    writer.visit_annotation(AnnotationNode::new("Ldemo/Marker;", true));
    writer.visit_field(FieldVisitor::new(ACC_PUBLIC, "items", "[Ljava/lang/String;").visit_end());
    writer.visit_method(
        MethodVisitor::new(
            ACC_PUBLIC | ACC_ABSTRACT,
            "run",
            "(J)V",
            vec!["demo/CheckedException".into()],
        )
        .visit_end(),
    );
    writer.visit_end();
    let bytes = writer.to_bytes().unwrap();

    let pool = pool();
    let image = pool.define_class_file(&bytes).unwrap();

    assert_eq!(image.name(), "demo.Image");
    assert_eq!(image.modifiers(), ACC_PUBLIC | ACC_ABSTRACT);
    assert_eq!(image.super_type().unwrap().name(), BASE);
    assert_eq!(image.interfaces()[0].name(), lang::CLONEABLE);
    assert_eq!(image.declared_fields()[0].field_type().name(), "[Ljava.lang.String;");
    let run = &image.declared_methods()[0];
    assert_eq!(run.signature(), "run(J)V");
    assert_eq!(run.exception_types()[0].name(), "demo.CheckedException");
    assert_eq!(image.declared_annotations()[0].annotation_type().name(), MARKER);
}
