use classforge_core::ModifierReviewable;

use super::*;
use crate::Error;
use crate::description::{MethodDescription, TypeDescription, TypePool, lang};
use crate::test_utils::{
    BASE, CHECKED, CHILD, GREETER, MARKER, OUTSIDER, SIBLING, TAG, describe, pool,
};

fn method(pool: &TypePool, owner: &str, name: &str) -> MethodDescription {
    describe(pool, owner)
        .declared_methods()
        .into_iter()
        .find(|m| m.internal_name() == name)
        .unwrap()
}

fn matching(pool: &TypePool, owner: &str, matcher: &MethodMatcher) -> Vec<String> {
    describe(pool, owner)
        .declared_methods()
        .iter()
        .filter(|m| matcher.matches(m))
        .map(|m| m.signature())
        .collect()
}

#[test]
fn method_kinds() {
    let pool = pool();
    assert_eq!(matching(&pool, BASE, &is_constructor()).len(), 3);
    assert_eq!(
        matching(&pool, BASE, &is_default_constructor()),
        vec!["<init>()V"]
    );
    assert!(is_default_method().matches(&method(&pool, GREETER, "foo")));
    assert!(!is_default_method().matches(&method(&pool, GREETER, "name")));
    assert!(is_visibility_bridge().matches(&method(&pool, CHILD, "isReady")));
    assert!(is_overridable().matches(&method(&pool, BASE, "greet")));
    assert!(!is_overridable().matches(&method(&pool, BASE, "locked")));
    assert!(!is_method().matches(&method(&pool, BASE, "<init>")));
}

#[test]
fn constructors_have_no_source_name() {
    let pool = pool();
    let init = method(&pool, BASE, "<init>");
    assert!(!named::<MethodLeaf>("<init>").matches(&init));
    assert!(named::<MethodLeaf>("").matches(&init));
}

#[test]
fn object_method_identities() {
    let pool = pool();
    let object = lang::OBJECT;
    assert!(is_hash_code().matches(&method(&pool, object, "hashCode")));
    assert!(is_equals().matches(&method(&pool, object, "equals")));
    assert!(is_to_string().matches(&method(&pool, object, "toString")));
    assert!(is_clone().matches(&method(&pool, object, "clone")));
    assert!(is_finalizer().matches(&method(&pool, object, "finalize")));
    assert!(is_default_finalizer().matches(&method(&pool, object, "finalize")));
    assert!(!is_equals().matches(&method(&pool, object, "hashCode")));
}

#[test]
fn names() {
    let pool = pool();
    let greet = method(&pool, BASE, "greet");
    assert!(named::<MethodLeaf>("greet").matches(&greet));
    assert!(named_ignore_case::<MethodLeaf>("GREET").matches(&greet));
    assert!(name_starts_with::<MethodLeaf>("gr").matches(&greet));
    assert!(name_ends_with_ignore_case::<MethodLeaf>("EET").matches(&greet));
    assert!(name_contains::<MethodLeaf>("ree").matches(&greet));
    assert!(name_matches::<MethodLeaf>("g.*t").unwrap().matches(&greet));
    assert!(!name_matches::<MethodLeaf>("g").unwrap().matches(&greet));
    assert!(matches!(name_matches::<MethodLeaf>("("), Err(Error::InvalidArgument(_))));
    assert!(name_starts_with::<TypeLeaf>("demo.").matches(&describe(&pool, BASE)));
    assert!(has_descriptor::<MethodLeaf>("(Ljava/lang/String;)Ljava/lang/String;").matches(&greet));
}

#[test]
fn modifiers() {
    let pool = pool();
    assert_eq!(
        matching(&pool, BASE, &is_static()),
        vec!["create()Ldemo/Base;"]
    );
    assert_eq!(matching(&pool, BASE, &is_native()), vec!["address()J"]);
    assert_eq!(matching(&pool, BASE, &is_final()), vec!["locked()V"]);
    assert_eq!(
        matching(&pool, BASE, &is_private()),
        vec!["<init>(Ljava/lang/String;)V", "secret()V"]
    );
    assert_eq!(matching(&pool, BASE, &is_package_private()), vec!["internal()V"]);
    assert_eq!(matching(&pool, CHILD, &is_bridge()), vec!["isReady()Z"]);
    assert_eq!(matching(&pool, CHILD, &is_synthetic()), vec!["isReady()Z"]);
}

#[test]
fn package_private_is_absence_of_visibility() {
    let pool = pool();
    let explicit = not(is_public::<MethodLeaf>()
        .or(is_protected())
        .or(is_private()));
    assert_eq!(is_package_private::<MethodLeaf>(), explicit);

    for ty in [BASE, CHILD, OUTSIDER, lang::OBJECT] {
        for method in describe(&pool, ty).declared_methods() {
            assert_eq!(
                is_package_private::<MethodLeaf>().matches(&method),
                method.is_package_private(),
                "{method}"
            );
        }
    }
}

#[test]
fn visibility_matcher_agrees_with_rule() {
    let pool = pool();
    let types: Vec<TypeDescription> = [BASE, CHILD, SIBLING, OUTSIDER, lang::OBJECT]
        .into_iter()
        .map(|name| describe(&pool, name))
        .collect();

    for declaring in &types {
        for method in declaring.declared_methods() {
            for viewer in &types {
                let expected = method.is_public()
                    || (method.is_private() && viewer == declaring)
                    || (method.is_protected() && viewer.is_assignable_to(declaring))
                    || (!method.is_private() && viewer.package_name() == declaring.package_name());
                assert_eq!(
                    is_visible_to::<MethodLeaf>(viewer.clone()).matches(&method),
                    expected,
                    "{method} viewed from {viewer}"
                );
            }
        }
    }
}

#[test]
fn structure() {
    let pool = pool();
    let string = describe(&pool, lang::STRING);
    let greet = method(&pool, BASE, "greet");

    assert!(returns_type(string.clone()).matches(&greet));
    assert!(returns(is_sub_type_of(describe(&pool, lang::CHAR_SEQUENCE))).matches(&greet));
    assert!(takes_argument_types([string.clone()]).matches(&greet));
    assert!(takes_arguments_count(1).matches(&greet));
    assert!(takes_argument(0, named(lang::STRING)).matches(&greet));
    assert!(!takes_argument(1, any()).matches(&greet));
    assert!(takes_arguments(list_contains(is(string))).matches(&greet));

    let count = method(&pool, BASE, "count");
    assert!(throwing_types([describe(&pool, CHECKED)]).matches(&count));
    assert!(throwing(list_size(1)).matches(&count));
    assert!(!throwing(list_size(1)).matches(&greet));
}

#[test]
fn getters_and_setters() {
    let pool = pool();
    assert_eq!(matching(&pool, BASE, &is_getter()), vec!["isReady()Z"]);
    assert_eq!(matching(&pool, BASE, &is_setter()), vec!["setCount(I)V"]);
    assert_eq!(
        matching(&pool, BASE, &is_setter_of(describe(&pool, "int"))),
        vec!["setCount(I)V"]
    );
    assert!(matching(&pool, BASE, &is_setter_of(describe(&pool, "long"))).is_empty());
    assert_eq!(
        matching(&pool, BASE, &is_getter_of(describe(&pool, "boolean"))),
        vec!["isReady()Z"]
    );
    assert!(is_getter().matches(&method(&pool, lang::THROWABLE, "getMessage")));
    assert!(!is_getter().matches(&method(&pool, lang::OBJECT, "hashCode")));
}

#[test]
fn can_throw_law() {
    let pool = pool();
    let methods: Vec<_> = [BASE, CHILD, lang::OBJECT]
        .into_iter()
        .flat_map(|name| describe(&pool, name).declared_methods())
        .collect();

    for unchecked in [lang::RUNTIME_EXCEPTION, lang::ERROR] {
        let matcher = can_throw(&describe(&pool, unchecked)).unwrap();
        assert!(methods.iter().all(|m| matcher.matches(m)));
    }

    let checked = describe(&pool, CHECKED);
    let matcher = can_throw(&checked).unwrap();
    for method in &methods {
        let expected = method
            .exception_types()
            .iter()
            .any(|declared| declared.is_assignable_from(&checked));
        assert_eq!(matcher.matches(method), expected, "{method}");
    }
    assert!(matcher.matches(&method(&pool, BASE, "count")));
    assert!(matcher.matches(&method(&pool, lang::OBJECT, "finalize")));
    assert!(!matcher.matches(&method(&pool, BASE, "greet")));
}

#[test]
fn can_throw_rejects_non_throwables() {
    let pool = pool();
    assert!(matches!(
        can_throw(&describe(&pool, BASE)),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn specialization() {
    let pool = pool();
    let general = method(&pool, BASE, "greet");
    let matcher = is_specialization_of(general.clone());

    assert!(matcher.matches(&general));
    assert!(matcher.matches(&method(&pool, CHILD, "greet")));
    assert!(!matcher.matches(&method(&pool, BASE, "count")));
    assert!(!is_specialization_of(method(&pool, lang::OBJECT, "equals"))
        .matches(&method(&pool, BASE, "greet")));
}

#[test]
fn type_relations() {
    let pool = pool();
    let base = describe(&pool, BASE);
    let child = describe(&pool, CHILD);

    assert!(is_sub_type_of(base.clone()).matches(&child));
    assert!(!is_sub_type_of(child.clone()).matches(&base));
    assert!(is_super_type_of(child.clone()).matches(&base));
    assert!(declares_method(named("greet")).matches(&child));
    assert!(!declares_method(named("count")).matches(&child));
    assert!(
        declares_field(named("count").and(has_field_type(describe(&pool, "int")))).matches(&base)
    );
    assert!(inherits_annotation(named(TAG)).matches(&child));
    assert!(!inherits_annotation(named(MARKER)).matches(&child));
    assert!(inherits_annotation(named(MARKER)).matches(&base));
}

#[test]
fn type_matchers_nest_through_members() {
    let pool = pool();
    let returns_counted_type = || {
        declares_method(returns(
            declares_field(named("count")).and(inherits_annotation(named(MARKER))),
        ))
    };

    assert!(returns_counted_type().matches(&describe(&pool, BASE)));
    assert!(!returns_counted_type().matches(&describe(&pool, CHILD)));
    assert_eq!(returns_counted_type(), returns_counted_type());
    assert_ne!(returns_counted_type(), not(returns_counted_type()));
}

#[test]
fn declarers_and_annotations() {
    let pool = pool();
    let base = describe(&pool, BASE);
    let greet = method(&pool, BASE, "greet");

    assert!(is_declared_by_type::<MethodLeaf>(base.clone()).matches(&greet));
    assert!(!is_declared_by_type::<MethodLeaf>(describe(&pool, CHILD)).matches(&greet));
    assert!(is_annotated_with_type::<MethodLeaf>(describe(&pool, MARKER)).matches(&greet));
    assert!(is_annotated_with::<TypeLeaf>(named(TAG)).matches(&base));
    assert!(
        declares_annotation::<TypeLeaf>(has_annotation_type(describe(&pool, MARKER)))
            .matches(&base)
    );
    assert!(!is_annotated_with::<TypeLeaf>(named(TAG)).matches(&describe(&pool, CHILD)));
}

#[test]
fn identity_lists() {
    let pool = pool();
    let base = describe(&pool, BASE);
    let child = describe(&pool, CHILD);
    let outsider = describe(&pool, OUTSIDER);

    let either = any_of([base.clone(), child.clone()]);
    assert!(either.matches(&base));
    assert!(either.matches(&child));
    assert!(!either.matches(&outsider));
    assert_eq!(either, any_of([child.clone(), base.clone()]));

    let neither = none_of([base.clone(), child.clone()]);
    assert!(!neither.matches(&base));
    assert!(neither.matches(&outsider));
    assert_eq!(any_of(Vec::<TypeDescription>::new()), none());
}
