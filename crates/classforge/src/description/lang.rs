//! The language types every pool starts with.

use classforge_bytecode::AnnotationValue;
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_ENUM, ACC_FINAL, ACC_NATIVE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
};

use super::{AnnotationToken, FieldToken, MethodToken, TypeDefinition};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const CHAR_SEQUENCE: &str = "java.lang.CharSequence";
pub const CLASS: &str = "java.lang.Class";
pub const BOOLEAN: &str = "java.lang.Boolean";
pub const CLONEABLE: &str = "java.lang.Cloneable";
pub const SERIALIZABLE: &str = "java.io.Serializable";
pub const THROWABLE: &str = "java.lang.Throwable";
pub const EXCEPTION: &str = "java.lang.Exception";
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
pub const ERROR: &str = "java.lang.Error";
pub const CLONE_NOT_SUPPORTED_EXCEPTION: &str = "java.lang.CloneNotSupportedException";
pub const ANNOTATION: &str = "java.lang.annotation.Annotation";
pub const RETENTION: &str = "java.lang.annotation.Retention";
pub const RETENTION_POLICY: &str = "java.lang.annotation.RetentionPolicy";
pub const INHERITED: &str = "java.lang.annotation.Inherited";

const RETENTION_POLICY_DESCRIPTOR: &str = "Ljava/lang/annotation/RetentionPolicy;";

pub(crate) fn definitions() -> Vec<TypeDefinition> {
    vec![
        object(),
        TypeDefinition::interface(SERIALIZABLE),
        TypeDefinition::interface(CLONEABLE),
        TypeDefinition::interface(CHAR_SEQUENCE)
            .method(MethodToken::new("length", "int").modifiers(ACC_PUBLIC | ACC_ABSTRACT))
            .method(
                MethodToken::new("toString", STRING).modifiers(ACC_PUBLIC | ACC_ABSTRACT),
            ),
        TypeDefinition::class(STRING)
            .modifiers(ACC_PUBLIC | ACC_FINAL)
            .implements(SERIALIZABLE)
            .implements(CHAR_SEQUENCE)
            .method(MethodToken::constructor().modifiers(ACC_PUBLIC))
            .method(MethodToken::new("length", "int").modifiers(ACC_PUBLIC))
            .method(MethodToken::new("toString", STRING).modifiers(ACC_PUBLIC)),
        TypeDefinition::class(CLASS)
            .modifiers(ACC_PUBLIC | ACC_FINAL)
            .implements(SERIALIZABLE)
            .method(MethodToken::new("getName", STRING).modifiers(ACC_PUBLIC)),
        TypeDefinition::class(BOOLEAN)
            .modifiers(ACC_PUBLIC | ACC_FINAL)
            .implements(SERIALIZABLE)
            .field(FieldToken::new("TRUE", BOOLEAN).modifiers(ACC_PUBLIC | ACC_STATIC | ACC_FINAL))
            .field(FieldToken::new("FALSE", BOOLEAN).modifiers(ACC_PUBLIC | ACC_STATIC | ACC_FINAL))
            .method(MethodToken::new("booleanValue", "boolean").modifiers(ACC_PUBLIC))
            .method(
                MethodToken::new("valueOf", BOOLEAN)
                    .parameters(["boolean"])
                    .modifiers(ACC_PUBLIC | ACC_STATIC),
            ),
        throwable(THROWABLE, OBJECT).implements(SERIALIZABLE),
        throwable(EXCEPTION, THROWABLE),
        throwable(RUNTIME_EXCEPTION, EXCEPTION),
        throwable(ERROR, THROWABLE),
        throwable(CLONE_NOT_SUPPORTED_EXCEPTION, EXCEPTION),
        TypeDefinition::interface(ANNOTATION)
            .method(
                MethodToken::new("annotationType", CLASS).modifiers(ACC_PUBLIC | ACC_ABSTRACT),
            ),
        TypeDefinition::class(RETENTION_POLICY)
            .modifiers(ACC_PUBLIC | ACC_FINAL | ACC_ENUM)
            .field(enum_constant("SOURCE"))
            .field(enum_constant("CLASS"))
            .field(enum_constant("RUNTIME")),
        TypeDefinition::annotation_type(RETENTION)
            .annotation(runtime_retention())
            .method(
                MethodToken::new("value", RETENTION_POLICY)
                    .modifiers(ACC_PUBLIC | ACC_ABSTRACT),
            ),
        TypeDefinition::annotation_type(INHERITED).annotation(runtime_retention()),
    ]
}

fn object() -> TypeDefinition {
    TypeDefinition::class(OBJECT)
        .method(MethodToken::constructor().modifiers(ACC_PUBLIC))
        .method(MethodToken::new("getClass", CLASS).modifiers(ACC_PUBLIC | ACC_FINAL | ACC_NATIVE))
        .method(MethodToken::new("hashCode", "int").modifiers(ACC_PUBLIC | ACC_NATIVE))
        .method(
            MethodToken::new("equals", "boolean")
                .parameters([OBJECT])
                .modifiers(ACC_PUBLIC),
        )
        .method(MethodToken::new("toString", STRING).modifiers(ACC_PUBLIC))
        .method(
            MethodToken::new("clone", OBJECT)
                .throws([CLONE_NOT_SUPPORTED_EXCEPTION])
                .modifiers(ACC_PROTECTED | ACC_NATIVE),
        )
        .method(MethodToken::new("notify", "void").modifiers(ACC_PUBLIC | ACC_FINAL | ACC_NATIVE))
        .method(
            MethodToken::new("finalize", "void")
                .throws([THROWABLE])
                .modifiers(ACC_PROTECTED),
        )
}

fn throwable(name: &str, parent: &str) -> TypeDefinition {
    TypeDefinition::class(name)
        .extends(parent)
        .method(MethodToken::constructor().modifiers(ACC_PUBLIC))
        .method(
            MethodToken::constructor()
                .parameters([STRING])
                .modifiers(ACC_PUBLIC),
        )
        .method(MethodToken::new("getMessage", STRING).modifiers(ACC_PUBLIC))
}

fn enum_constant(name: &str) -> FieldToken {
    FieldToken::new(name, RETENTION_POLICY)
        .modifiers(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM)
}

fn runtime_retention() -> AnnotationToken {
    AnnotationToken::new(RETENTION).value(
        "value",
        AnnotationValue::Enum {
            descriptor: RETENTION_POLICY_DESCRIPTOR.to_string(),
            name: "RUNTIME".to_string(),
        },
    )
}
