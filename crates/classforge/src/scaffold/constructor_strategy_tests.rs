use std::sync::Arc;

use classforge_core::modifier::{ACC_PROTECTED, ACC_PUBLIC};

use super::{ConstructorStrategy, MethodRegistry};
use crate::Error;
use crate::description::{MethodToken, TypeDefinition};
use crate::instrumentation::{MethodAttributeAppender, StubMethod};
use crate::matcher::{MethodMatcher, any};
use crate::test_utils::{BASE, CHECKED, OUTSIDER, SIBLING, instrumented, pool};

fn signatures(tokens: Vec<MethodToken>) -> Vec<(String, u16)> {
    tokens
        .into_iter()
        .map(|t| (t.signature(), t.modifiers))
        .collect()
}

#[test]
fn no_constructors() {
    let pool = pool();
    let ty = instrumented(&pool, BASE, &[]);

    let constructors = ConstructorStrategy::NoConstructors
        .extract_constructors(ty.description())
        .unwrap();

    assert!(constructors.is_empty());
}

#[test]
fn default_constructor_copies_the_super_constructor() {
    let pool = pool();

    for (super_type, modifiers) in [(BASE, ACC_PUBLIC), (OUTSIDER, ACC_PROTECTED)] {
        let ty = instrumented(&pool, super_type, &[]);
        let constructors = ConstructorStrategy::DefaultConstructor
            .extract_constructors(ty.description())
            .unwrap();

        assert_eq!(signatures(constructors), vec![("<init>()V".to_string(), modifiers)]);
    }
}

#[test]
fn default_constructor_keeps_exceptions() {
    let pool = pool();
    pool.define(
        TypeDefinition::class("demo.Guarded")
            .method(
                MethodToken::constructor()
                    .throws([CHECKED])
                    .modifiers(ACC_PROTECTED),
            )
            .method(
                MethodToken::constructor()
                    .parameters(["int"])
                    .modifiers(ACC_PUBLIC),
            ),
    )
    .unwrap();
    let ty = instrumented(&pool, "demo.Guarded", &[]);

    let constructors = ConstructorStrategy::DefaultConstructor
        .extract_constructors(ty.description())
        .unwrap();

    assert_eq!(
        constructors,
        vec![
            MethodToken::constructor()
                .throws([CHECKED])
                .modifiers(ACC_PROTECTED)
        ]
    );
}

#[test]
fn default_constructor_needs_visible_no_argument_constructor() {
    let pool = pool();
    let ty = instrumented(&pool, SIBLING, &[]);

    let err = ConstructorStrategy::DefaultConstructor
        .extract_constructors(ty.description())
        .unwrap_err();

    insta::assert_snapshot!(err, @"not found: visible no-argument constructor of demo.Sibling");
}

#[test]
fn imitate_copies_visible_constructors() {
    let pool = pool();
    let ty = instrumented(&pool, BASE, &[]);

    let constructors = ConstructorStrategy::ImitateSuperType
        .extract_constructors(ty.description())
        .unwrap();

    assert_eq!(
        signatures(constructors),
        vec![
            ("<init>()V".to_string(), ACC_PUBLIC),
            ("<init>(I)V".to_string(), ACC_PUBLIC),
        ]
    );
}

#[test]
fn imitate_keeps_modifiers_and_exceptions() {
    let pool = pool();
    pool.define(
        TypeDefinition::class("demo.Risky").method(
            MethodToken::constructor()
                .parameters(["long"])
                .throws([CHECKED])
                .modifiers(ACC_PROTECTED),
        ),
    )
    .unwrap();
    let ty = instrumented(&pool, "demo.Risky", &[]);

    let constructors = ConstructorStrategy::ImitateSuperType
        .extract_constructors(ty.description())
        .unwrap();

    assert_eq!(
        constructors,
        vec![
            MethodToken::constructor()
                .parameters(["long"])
                .throws([CHECKED])
                .modifiers(ACC_PROTECTED)
        ]
    );
}

#[test]
fn imitate_public_drops_protected_constructors() {
    let pool = pool();
    let ty = instrumented(&pool, OUTSIDER, &[]);

    let all = ConstructorStrategy::ImitateSuperType
        .extract_constructors(ty.description())
        .unwrap();
    let public = ConstructorStrategy::ImitateSuperTypePublic
        .extract_constructors(ty.description())
        .unwrap();

    assert_eq!(signatures(all), vec![("<init>()V".to_string(), ACC_PROTECTED)]);
    assert!(public.is_empty());
}

#[test]
fn missing_super_type() {
    let pool = pool();
    let ty = super::InstrumentedType::new(&pool, "demo.Root", ACC_PUBLIC, None, &[], Vec::new());

    assert!(matches!(
        ConstructorStrategy::DefaultConstructor.extract_constructors(ty.description()),
        Err(Error::IllegalState(_))
    ));
}

#[test]
fn inject_prepends_super_call_entry() {
    let matcher: MethodMatcher = any();
    let registry = MethodRegistry::new().append(
        matcher,
        Arc::new(StubMethod),
        MethodAttributeAppender::NoOp,
    );

    let unchanged = ConstructorStrategy::NoConstructors
        .inject(registry.clone(), MethodAttributeAppender::NoOp);
    let injected = ConstructorStrategy::ImitateSuperType
        .inject(registry, MethodAttributeAppender::NoOp);

    assert_eq!(unchanged.len(), 1);
    assert_eq!(injected.len(), 2);
}
