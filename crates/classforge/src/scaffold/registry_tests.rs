use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use classforge_bytecode::ClassFileVersion;
use classforge_core::modifier::ACC_PUBLIC;

use super::{
    Compiled, CompiledEntry, FieldRegistry, InstrumentationTarget, InstrumentedType,
    MethodLookupEngine, MethodRegistry, OriginTypeIdentifier, SubclassTargetFactory,
};
use crate::description::{AnnotationDescription, FieldToken, MethodToken, lang};
use crate::instrumentation::{
    ByteCodeAppender, FieldAttributeAppender, FixedValue, Instrumentation, MethodAttributeAppender,
    StubMethod,
};
use crate::matcher::{LatentMatcher, MethodMatcher, any, is_constructor, is_method, named};
use crate::test_utils::{BASE, SUB, apply, describe, instrumented, pool};
use crate::{Error, Result};

fn compile(registry: &MethodRegistry, ty: InstrumentedType) -> Result<Compiled> {
    registry.prepare(ty)?.compile(
        &SubclassTargetFactory {
            origin: OriginTypeIdentifier::SuperType,
            class_file_version: ClassFileVersion::JAVA_V8,
        },
        &MethodLookupEngine::new(true),
        CompiledEntry::Skip,
    )
}

fn method(name: &str) -> MethodMatcher {
    named(name)
}

fn body(compiled: &Compiled, name: &str) -> Option<String> {
    let method = compiled
        .invokable_methods()
        .iter()
        .find(|m| m.internal_name() == name)
        .unwrap();
    match compiled.entry_for(method) {
        CompiledEntry::Skip => None,
        CompiledEntry::Define { appender, .. } => Some(apply(appender.as_ref(), method).unwrap().1),
    }
}

/// Counts how often it is prepared and asked for an appender.
#[derive(Debug, Default)]
struct Counting {
    prepared: AtomicUsize,
    appenders: AtomicUsize,
}

impl Instrumentation for Counting {
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType> {
        let n = self.prepared.fetch_add(1, Ordering::SeqCst);
        instrumented_type.with_field(FieldToken::new(format!("prepared{n}"), "int"))
    }

    fn appender(&self, _target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>> {
        self.appenders.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubMethod))
    }
}

#[test]
fn first_matching_entry_wins() {
    let pool = pool();
    let registry = MethodRegistry::new()
        .append(
            method("toString"),
            Arc::new(FixedValue::value("appended")),
            MethodAttributeAppender::NoOp,
        )
        .append(is_method(), Arc::new(StubMethod), MethodAttributeAppender::NoOp)
        .prepend(
            method("toString"),
            Arc::new(FixedValue::value("prepended")),
            MethodAttributeAppender::NoOp,
        );

    let compiled = compile(&registry, instrumented(&pool, BASE, &[])).unwrap();

    insta::assert_snapshot!(body(&compiled, "toString").unwrap(), @r#"
    ldc "prepended"
    areturn
    "#);
    insta::assert_snapshot!(body(&compiled, "hashCode").unwrap(), @r"
    iconst_0
    ireturn
    ");
}

#[test]
fn prepended_constructor_entry_beats_appended_catch_all() {
    let pool = pool();
    let ty = instrumented(&pool, BASE, &[])
        .with_method(MethodToken::constructor().modifiers(ACC_PUBLIC))
        .unwrap();
    let catch_all: MethodMatcher = any();
    let registry = MethodRegistry::new()
        .prepend(is_constructor(), Arc::new(StubMethod), MethodAttributeAppender::NoOp)
        .append(
            catch_all,
            Arc::new(FixedValue::value("b")),
            MethodAttributeAppender::NoOp,
        );

    let compiled = compile(&registry, ty).unwrap();

    assert_eq!(body(&compiled, "<init>").unwrap(), "return");
    assert_eq!(body(&compiled, "toString").unwrap(), "ldc \"b\"\nareturn");
}

#[test]
fn unmatched_methods_get_fallback() {
    let pool = pool();
    let registry = MethodRegistry::new().append(
        method("toString"),
        Arc::new(StubMethod),
        MethodAttributeAppender::NoOp,
    );

    let compiled = compile(&registry, instrumented(&pool, BASE, &[])).unwrap();

    assert!(body(&compiled, "toString").is_some());
    assert!(body(&compiled, "greet").is_none());
    let foreign = &describe(&pool, BASE).declared_methods()[0];
    assert!(!compiled.entry_for(foreign).is_defined());
}

#[test]
fn shared_instrumentation_is_prepared_once() {
    let pool = pool();
    let counting = Arc::new(Counting::default());
    let shared: Arc<dyn Instrumentation> = counting.clone();
    let registry = MethodRegistry::new()
        .append(method("toString"), Arc::clone(&shared), MethodAttributeAppender::NoOp)
        .append(method("hashCode"), Arc::clone(&shared), MethodAttributeAppender::NoOp)
        .append(method("equals"), Arc::new(StubMethod), MethodAttributeAppender::NoOp);

    let compiled = compile(&registry, instrumented(&pool, BASE, &[])).unwrap();

    assert_eq!(counting.prepared.load(Ordering::SeqCst), 1);
    assert_eq!(counting.appenders.load(Ordering::SeqCst), 2);
    let fields: Vec<_> = compiled
        .instrumented_type()
        .declared_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(fields, ["prepared0"]);
}

#[test]
fn prepare_failure_aborts() {
    let pool = pool();
    let registry = MethodRegistry::new()
        .append(method("a"), Arc::new(Counting::default()), MethodAttributeAppender::NoOp)
        .append(method("b"), Arc::new(Counting::default()), MethodAttributeAppender::NoOp);

    let err = registry.prepare(instrumented(&pool, BASE, &[])).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn appenders_are_built_once_per_entry() {
    let pool = pool();
    let counting = Arc::new(Counting::default());
    let registry = MethodRegistry::new().append(
        is_method(),
        counting.clone() as Arc<dyn Instrumentation>,
        MethodAttributeAppender::NoOp,
    );

    let compiled = compile(&registry, instrumented(&pool, BASE, &[])).unwrap();

    assert!(compiled.invokable_methods().len() > 1);
    assert_eq!(counting.appenders.load(Ordering::SeqCst), 1);
}

#[test]
fn declared_matcher_resolves_against_instrumented_type() {
    let pool = pool();
    let token = MethodToken::new("toString", lang::STRING).modifiers(ACC_PUBLIC);
    let ty = instrumented(&pool, BASE, &[]).with_method(token.clone()).unwrap();
    let registry = MethodRegistry::new().append(
        LatentMatcher::Declared(token),
        Arc::new(FixedValue::value("declared")),
        MethodAttributeAppender::NoOp,
    );

    let compiled = compile(&registry, ty).unwrap();

    let to_string = &compiled.invokable_methods()[0];
    assert_eq!(to_string.declaring_type().name(), SUB);
    assert!(compiled.entry_for(to_string).is_defined());
    assert!(body(&compiled, "hashCode").is_none());
}

#[test]
fn prepend_all_keeps_order() {
    let pool = pool();
    let to_string = method("toString");
    let first = MethodRegistry::new()
        .append(to_string.clone(), Arc::new(FixedValue::value("1")), MethodAttributeAppender::NoOp)
        .append(to_string.clone(), Arc::new(FixedValue::value("2")), MethodAttributeAppender::NoOp);
    let second = MethodRegistry::new().append(
        to_string,
        Arc::new(FixedValue::value("3")),
        MethodAttributeAppender::NoOp,
    );

    let registry = second.prepend_all(first);
    let compiled = compile(&registry, instrumented(&pool, BASE, &[])).unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(body(&compiled, "toString").unwrap(), "ldc \"1\"\nareturn");
}

#[test]
fn field_registry_falls_back_to_default() {
    let pool = pool();
    let marker: AnnotationDescription = describe(&pool, BASE).declared_annotations().remove(0);
    let ty = instrumented(&pool, BASE, &[])
        .with_field(FieldToken::new("a", "int"))
        .unwrap()
        .with_field(FieldToken::new("b", "int"))
        .unwrap();
    let registry = FieldRegistry::new().register(
        "a",
        FieldAttributeAppender::ForAnnotations(vec![marker.clone()]),
    );

    let compiled = registry.compile(FieldAttributeAppender::ForInstrumentedField);
    let fields = ty.description().declared_fields();

    assert_eq!(
        compiled.target(&fields[0]),
        &FieldAttributeAppender::ForAnnotations(vec![marker])
    );
    assert_eq!(
        compiled.target(&fields[1]),
        &FieldAttributeAppender::ForInstrumentedField
    );
}
