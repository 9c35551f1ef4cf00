use classforge_core::ModifierReviewable;

use super::{ByteCodeElement, MethodSort, MethodToken, lang};
use crate::test_utils::{BASE, CHILD, GREETER, describe, pool};

fn method(pool: &super::TypePool, owner: &str, name: &str) -> super::MethodDescription {
    describe(pool, owner)
        .declared_methods()
        .into_iter()
        .find(|m| m.internal_name() == name)
        .unwrap()
}

#[test]
fn token_from_descriptor() {
    let token =
        MethodToken::from_descriptor("run", "(I[Ljava/lang/String;J)Ljava/lang/Object;").unwrap();

    assert_eq!(token.return_type_name(), lang::OBJECT);
    assert_eq!(
        token.parameter_type_names(),
        &["int", "[Ljava.lang.String;", "long"]
    );
    assert_eq!(token.descriptor(), "(I[Ljava/lang/String;J)Ljava/lang/Object;");
    assert_eq!(token.signature(), "run(I[Ljava/lang/String;J)Ljava/lang/Object;");
}

#[test]
fn token_rejects_malformed_descriptor() {
    assert!(MethodToken::from_descriptor("run", "(I").is_err());
}

#[test]
fn sorts() {
    assert_eq!(MethodToken::constructor().sort(), MethodSort::Constructor);
    assert_eq!(MethodToken::type_initializer().sort(), MethodSort::TypeInitializer);
    assert_eq!(MethodToken::new("run", "void").sort(), MethodSort::Method);
}

#[test]
fn constructor_shape() {
    let pool = pool();
    let constructors: Vec<_> = describe(&pool, BASE)
        .declared_methods()
        .into_iter()
        .filter(|m| m.is_constructor())
        .collect();

    assert_eq!(constructors.len(), 3);
    for constructor in &constructors {
        assert!(constructor.return_type().is_void());
        assert_eq!(constructor.source_code_name(), "");
        assert!(!constructor.is_overridable());
    }
    assert_eq!(constructors[1].descriptor(), "(I)V");
    assert_eq!(constructors[1].parameter_size(), 1);
    assert_eq!(constructors[1].stack_size(), 2);
}

#[test]
fn overridability() {
    let pool = pool();
    assert!(method(&pool, BASE, "greet").is_overridable());
    assert!(method(&pool, BASE, "count").is_overridable());
    assert!(method(&pool, BASE, "internal").is_overridable());
    assert!(!method(&pool, BASE, "secret").is_overridable());
    assert!(!method(&pool, BASE, "locked").is_overridable());
    assert!(!method(&pool, BASE, "create").is_overridable());
}

#[test]
fn default_methods() {
    let pool = pool();
    assert!(method(&pool, GREETER, "foo").is_default_method());
    assert!(!method(&pool, GREETER, "name").is_default_method());
    assert!(!method(&pool, BASE, "greet").is_default_method());
}

#[test]
fn bridges() {
    let pool = pool();
    let bridge = method(&pool, CHILD, "isReady");
    assert!(bridge.is_bridge());
    assert!(bridge.is_visibility_bridge());
    assert!(bridge.is_synthetic());
    assert!(!method(&pool, CHILD, "greet").is_visibility_bridge());
}

#[test]
fn resolves_member_types() {
    let pool = pool();
    let count = method(&pool, BASE, "count");

    assert_eq!(count.return_type().name(), "int");
    assert_eq!(count.exception_types()[0].name(), "demo.CheckedException");
    assert_eq!(count.declaring_type().name(), BASE);
    assert_eq!(count.to_string(), "demo.Base.count()I");
}

#[test]
fn equality_uses_declaring_type_and_signature() {
    let pool = pool();
    let base_greet = method(&pool, BASE, "greet");
    let child_greet = method(&pool, CHILD, "greet");

    assert_ne!(base_greet, child_greet);
    assert_eq!(base_greet.signature(), child_greet.signature());
    assert_eq!(base_greet, method(&pool, BASE, "greet"));
    assert_eq!(
        base_greet.redeclared_by(describe(&pool, CHILD)),
        child_greet
    );
}
