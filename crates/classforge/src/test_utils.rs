//! Shared fixtures for unit tests.

use classforge_bytecode::{
    AnnotationValue, ClassFile, ClassFileVersion, ClassReader, MethodVisitor, dump,
};
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_BRIDGE, ACC_FINAL, ACC_NATIVE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
    ACC_STATIC, ACC_SYNTHETIC, ModifierReviewable,
};

use crate::Result;
use crate::description::{
    AnnotationToken, FieldToken, MethodDescription, MethodToken, TypeDefinition, TypeDescription,
    TypePool, lang,
};
use crate::instrumentation::{ByteCodeAppender, CodeSize};
use crate::scaffold::{
    InstrumentationTarget, InstrumentedType, MethodLookupEngine, OriginTypeIdentifier,
    SubclassTargetFactory, TargetFactory,
};

pub const BASE: &str = "demo.Base";
pub const CHILD: &str = "demo.Child";
pub const SIBLING: &str = "demo.Sibling";
pub const OUTSIDER: &str = "other.Outsider";
pub const GREETER: &str = "demo.Greeter";
pub const MARKER_INTERFACE: &str = "demo.Named";
pub const SEALED: &str = "demo.Sealed";
pub const CHECKED: &str = "demo.CheckedException";
pub const MARKER: &str = "demo.Marker";
pub const TAG: &str = "demo.Tag";
pub const HIDDEN: &str = "demo.Hidden";

/// A pool with a small `demo` hierarchy:
///
/// - `demo.Base`: constructors `()`, `(int)`, private `(String)`, plus
///   methods of every visibility, a final, a static and a native one.
///   Annotated `@Marker` and `@Tag`.
/// - `demo.Child extends Base`: overrides `greet`, adds a visibility bridge.
/// - `demo.Greeter`: interface with default `foo()` and abstract `name()`.
/// - `demo.Named`: interface extending nothing with abstract `name()`.
/// - `other.Outsider`: a class in another package.
pub fn pool() -> TypePool {
    let pool = TypePool::new();
    pool.define_all([
        TypeDefinition::annotation_type(MARKER)
            .annotation(retention("RUNTIME"))
            .method(MethodToken::new("value", lang::STRING).modifiers(ACC_PUBLIC | ACC_ABSTRACT)),
        TypeDefinition::annotation_type(TAG)
            .annotation(retention("CLASS"))
            .annotation(AnnotationToken::new(lang::INHERITED)),
        TypeDefinition::annotation_type(HIDDEN).annotation(retention("SOURCE")),
        TypeDefinition::class(CHECKED)
            .extends(lang::EXCEPTION)
            .method(MethodToken::constructor().modifiers(ACC_PUBLIC)),
        TypeDefinition::class(BASE)
            .annotation(
                AnnotationToken::new(MARKER).value("value", AnnotationValue::String("base".into())),
            )
            .annotation(AnnotationToken::new(TAG))
            .field(FieldToken::new("count", "int").modifiers(ACC_PROTECTED))
            .method(MethodToken::constructor().modifiers(ACC_PUBLIC))
            .method(
                MethodToken::constructor()
                    .parameters(["int"])
                    .modifiers(ACC_PUBLIC),
            )
            .method(
                MethodToken::constructor()
                    .parameters([lang::STRING])
                    .modifiers(ACC_PRIVATE),
            )
            .method(
                MethodToken::new("greet", lang::STRING)
                    .parameters([lang::STRING])
                    .modifiers(ACC_PUBLIC)
                    .annotation(AnnotationToken::new(MARKER)),
            )
            .method(
                MethodToken::new("count", "int")
                    .throws([CHECKED])
                    .modifiers(ACC_PROTECTED),
            )
            .method(MethodToken::new("internal", "void"))
            .method(MethodToken::new("secret", "void").modifiers(ACC_PRIVATE))
            .method(MethodToken::new("locked", "void").modifiers(ACC_PUBLIC | ACC_FINAL))
            .method(MethodToken::new("create", BASE).modifiers(ACC_PUBLIC | ACC_STATIC))
            .method(MethodToken::new("address", "long").modifiers(ACC_PUBLIC | ACC_NATIVE))
            .method(MethodToken::new("isReady", "boolean").modifiers(ACC_PUBLIC))
            .method(
                MethodToken::new("setCount", "void")
                    .parameters(["int"])
                    .modifiers(ACC_PUBLIC),
            ),
        TypeDefinition::class(CHILD)
            .extends(BASE)
            .method(MethodToken::constructor().modifiers(ACC_PUBLIC))
            .method(
                MethodToken::new("greet", lang::STRING)
                    .parameters([lang::STRING])
                    .modifiers(ACC_PUBLIC),
            )
            .method(
                MethodToken::new("isReady", "boolean")
                    .modifiers(ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC),
            ),
        TypeDefinition::class(SIBLING).modifiers(0),
        TypeDefinition::class(SEALED)
            .modifiers(ACC_PUBLIC | ACC_FINAL)
            .method(MethodToken::constructor().modifiers(ACC_PUBLIC)),
        TypeDefinition::class(OUTSIDER)
            .method(MethodToken::constructor().modifiers(ACC_PROTECTED))
            .method(MethodToken::new("visit", "void").modifiers(ACC_PROTECTED)),
        TypeDefinition::interface(GREETER)
            .method(MethodToken::new("foo", lang::OBJECT).modifiers(ACC_PUBLIC))
            .method(MethodToken::new("name", lang::STRING).modifiers(ACC_PUBLIC | ACC_ABSTRACT)),
        TypeDefinition::interface(MARKER_INTERFACE)
            .method(MethodToken::new("name", lang::STRING).modifiers(ACC_PUBLIC | ACC_ABSTRACT)),
    ])
    .unwrap();
    pool
}

pub fn describe(pool: &TypePool, name: &str) -> TypeDescription {
    pool.describe(name).unwrap()
}

fn retention(policy: &str) -> AnnotationToken {
    AnnotationToken::new(lang::RETENTION).value(
        "value",
        AnnotationValue::Enum {
            descriptor: "Ljava/lang/annotation/RetentionPolicy;".into(),
            name: policy.into(),
        },
    )
}

pub fn read(bytes: &[u8]) -> ClassFile {
    ClassReader::new(bytes).read().unwrap()
}

pub fn dump_image(bytes: &[u8]) -> String {
    dump(&read(bytes))
}

pub const SUB: &str = "demo.Sub";

/// An empty public `demo.Sub` extending `super_type`.
pub fn instrumented(pool: &TypePool, super_type: &str, interfaces: &[&str]) -> InstrumentedType {
    let interfaces: Vec<_> = interfaces.iter().map(|name| describe(pool, name)).collect();
    InstrumentedType::new(
        pool,
        SUB,
        ACC_PUBLIC,
        Some(&describe(pool, super_type)),
        &interfaces,
        Vec::new(),
    )
}

pub fn target(
    instrumented_type: &InstrumentedType,
    version: ClassFileVersion,
) -> InstrumentationTarget {
    let description = instrumented_type.description();
    let lookup = MethodLookupEngine::new(version.supports_default_methods()).process(description);
    SubclassTargetFactory {
        origin: OriginTypeIdentifier::SuperType,
        class_file_version: version,
    }
    .make(description, lookup)
}

/// The invokable method of `target`'s type with the given name.
pub fn invokable(target: &InstrumentationTarget, name: &str) -> MethodDescription {
    target
        .lookup()
        .invokable()
        .map(|entry| &entry.method)
        .find(|m| m.internal_name() == name)
        .cloned()
        .unwrap()
}

/// Run `appender` on `method` and render the emitted instructions.
pub fn apply(
    appender: &dyn ByteCodeAppender,
    method: &MethodDescription,
) -> Result<(CodeSize, String)> {
    let mut visitor = MethodVisitor::new(
        method.modifiers(),
        method.internal_name(),
        method.descriptor(),
        Vec::new(),
    );
    let size = appender.apply(&mut visitor, method)?;
    let text = visitor
        .instructions()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    Ok((size, text))
}
