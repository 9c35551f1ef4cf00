//! Matcher constructors.
//!
//! Functions generic over [`ElementKind`] build matchers for any of types,
//! methods and fields; the element kind is inferred from the use site.

use super::{
    AnnotationLeaf, AnnotationMatcher, ElementKind, ElementLeaf, FieldLeaf, FieldMatcher,
    Identity, Junction, Leaf, MethodKind, MethodLeaf, MethodMatcher, ModifierMatch, Pattern,
    StringMatcher, TypeLeaf, TypeListLeaf, TypeListMatcher, TypeMatcher,
};
use crate::description::{MethodDescription, TypeDescription, lang};
use crate::{Error, Result};

pub fn is<T: Identity>(value: T) -> Junction<T::Leaf> {
    Junction::Leaf(value.identity())
}

pub fn any<L: Leaf>() -> Junction<L> {
    Junction::Bool(true)
}

pub fn none<L: Leaf>() -> Junction<L> {
    Junction::Bool(false)
}

pub fn not<L: Leaf>(matcher: Junction<L>) -> Junction<L> {
    !matcher
}

/// Disjunction of [`is`] over `values`.
pub fn any_of<T: Identity>(values: impl IntoIterator<Item = T>) -> Junction<T::Leaf> {
    values
        .into_iter()
        .fold(none(), |matcher, value| matcher.or(is(value)))
}

/// Conjunction of negated [`is`] over `values`.
pub fn none_of<T: Identity>(values: impl IntoIterator<Item = T>) -> Junction<T::Leaf> {
    values
        .into_iter()
        .fold(any(), |matcher, value| matcher.and(not(is(value))))
}

fn element<L: ElementKind>(leaf: ElementLeaf) -> Junction<L> {
    Junction::Leaf(L::element(leaf))
}

fn name<L: ElementKind>(matcher: StringMatcher) -> Junction<L> {
    element(ElementLeaf::Name(matcher))
}

pub fn named<L: ElementKind>(name: impl Into<String>) -> Junction<L> {
    self::name(StringMatcher::Equals(name.into()))
}

pub fn named_ignore_case<L: ElementKind>(name: impl Into<String>) -> Junction<L> {
    self::name(StringMatcher::EqualsIgnoreCase(name.into()))
}

pub fn name_starts_with<L: ElementKind>(prefix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::StartsWith(prefix.into()))
}

pub fn name_starts_with_ignore_case<L: ElementKind>(prefix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::StartsWithIgnoreCase(prefix.into()))
}

pub fn name_ends_with<L: ElementKind>(suffix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::EndsWith(suffix.into()))
}

pub fn name_ends_with_ignore_case<L: ElementKind>(suffix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::EndsWithIgnoreCase(suffix.into()))
}

pub fn name_contains<L: ElementKind>(infix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::Contains(infix.into()))
}

pub fn name_contains_ignore_case<L: ElementKind>(infix: impl Into<String>) -> Junction<L> {
    name(StringMatcher::ContainsIgnoreCase(infix.into()))
}

/// Names fully matching a regular expression.
pub fn name_matches<L: ElementKind>(pattern: &str) -> Result<Junction<L>> {
    Ok(name(StringMatcher::Matches(Pattern::new(pattern)?)))
}

pub fn has_descriptor<L: ElementKind>(descriptor: impl Into<String>) -> Junction<L> {
    element(ElementLeaf::Descriptor(descriptor.into()))
}

fn modifier<L: ElementKind>(modifier: ModifierMatch) -> Junction<L> {
    element(ElementLeaf::Modifier(modifier))
}

pub fn is_public<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Public)
}

pub fn is_protected<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Protected)
}

pub fn is_private<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Private)
}

pub fn is_package_private<L: ElementKind>() -> Junction<L> {
    not(is_public().or(is_protected()).or(is_private()))
}

pub fn is_final<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Final)
}

pub fn is_static<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Static)
}

pub fn is_abstract<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Abstract)
}

pub fn is_synthetic<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Synthetic)
}

pub fn is_synchronized<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Synchronized)
}

pub fn is_native<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Native)
}

pub fn is_strict<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Strict)
}

pub fn is_var_args<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::VarArgs)
}

pub fn is_bridge<L: ElementKind>() -> Junction<L> {
    modifier(ModifierMatch::Bridge)
}

pub fn is_visible_to<L: ElementKind>(viewer: TypeDescription) -> Junction<L> {
    element(ElementLeaf::VisibleTo(viewer))
}

pub fn is_declared_by<L: ElementKind>(matcher: TypeMatcher) -> Junction<L> {
    element(ElementLeaf::DeclaredBy(Box::new(matcher)))
}

pub fn is_declared_by_type<L: ElementKind>(ty: TypeDescription) -> Junction<L> {
    is_declared_by(is(ty))
}

pub fn declares_annotation<L: ElementKind>(matcher: AnnotationMatcher) -> Junction<L> {
    element(ElementLeaf::DeclaresAnnotation(Box::new(matcher)))
}

pub fn is_annotated_with<L: ElementKind>(matcher: TypeMatcher) -> Junction<L> {
    declares_annotation(annotation_type(matcher))
}

pub fn is_annotated_with_type<L: ElementKind>(ty: TypeDescription) -> Junction<L> {
    is_annotated_with(is(ty))
}

fn kind(kind: MethodKind) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::Kind(kind))
}

pub fn is_method() -> MethodMatcher {
    kind(MethodKind::Method)
}

pub fn is_constructor() -> MethodMatcher {
    kind(MethodKind::Constructor)
}

pub fn is_type_initializer() -> MethodMatcher {
    kind(MethodKind::TypeInitializer)
}

pub fn is_visibility_bridge() -> MethodMatcher {
    kind(MethodKind::VisibilityBridge)
}

pub fn is_overridable() -> MethodMatcher {
    kind(MethodKind::Overridable)
}

pub fn is_default_method() -> MethodMatcher {
    kind(MethodKind::DefaultMethod)
}

pub fn is_default_constructor() -> MethodMatcher {
    is_constructor().and(takes_arguments_count(0))
}

/// `finalize()V` declared anywhere.
pub fn is_finalizer() -> MethodMatcher {
    named("finalize")
        .and(takes_arguments_count(0))
        .and(returns(named("void")))
}

/// The finalizer inherited from `java.lang.Object`.
pub fn is_default_finalizer() -> MethodMatcher {
    is_finalizer().and(is_declared_by(named(lang::OBJECT)))
}

pub fn is_hash_code() -> MethodMatcher {
    named("hashCode")
        .and(takes_arguments_count(0))
        .and(returns(named("int")))
}

pub fn is_equals() -> MethodMatcher {
    named("equals")
        .and(takes_arguments(one_to_one([named(lang::OBJECT)])))
        .and(returns(named("boolean")))
}

pub fn is_to_string() -> MethodMatcher {
    named("toString")
        .and(takes_arguments_count(0))
        .and(returns(named(lang::STRING)))
}

pub fn is_clone() -> MethodMatcher {
    named("clone").and(takes_arguments_count(0))
}

/// No arguments, a non-void return, and a name starting with `get`, or
/// starting with `is` when returning `boolean` or `Boolean`.
pub fn is_getter() -> MethodMatcher {
    let boolean = returns(named("boolean").or(named(lang::BOOLEAN)));
    takes_arguments_count(0)
        .and(not(returns(named("void"))))
        .and(name_starts_with("get").or(name_starts_with("is").and(boolean)))
}

pub fn is_getter_of(ty: TypeDescription) -> MethodMatcher {
    is_getter().and(returns_type(ty))
}

/// One argument, a void return and a name starting with `set`.
pub fn is_setter() -> MethodMatcher {
    name_starts_with("set")
        .and(takes_arguments_count(1))
        .and(returns(named("void")))
}

pub fn is_setter_of(ty: TypeDescription) -> MethodMatcher {
    is_setter().and(takes_argument(0, is(ty)))
}

pub fn is_specialization_of(method: MethodDescription) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::SpecializationOf(method))
}

pub fn returns(matcher: TypeMatcher) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::Returns(matcher))
}

pub fn returns_type(ty: TypeDescription) -> MethodMatcher {
    returns(is(ty))
}

pub fn takes_arguments(matcher: TypeListMatcher) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::Parameters(matcher))
}

pub fn takes_argument_types(types: impl IntoIterator<Item = TypeDescription>) -> MethodMatcher {
    takes_arguments(one_to_one(types.into_iter().map(is)))
}

pub fn takes_arguments_count(count: usize) -> MethodMatcher {
    takes_arguments(list_size(count))
}

pub fn takes_argument(index: usize, matcher: TypeMatcher) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::Argument { index, matcher })
}

pub fn throwing(matcher: TypeListMatcher) -> MethodMatcher {
    Junction::Leaf(MethodLeaf::Exceptions(matcher))
}

pub fn throwing_types(types: impl IntoIterator<Item = TypeDescription>) -> MethodMatcher {
    throwing(one_to_one(types.into_iter().map(is)))
}

/// Methods allowed to throw `exception`: any method for unchecked
/// exceptions, otherwise methods declaring a supertype of `exception`.
pub fn can_throw(exception: &TypeDescription) -> Result<MethodMatcher> {
    let pool = exception.pool();
    if !exception.is_assignable_to(&pool.describe(lang::THROWABLE)?) {
        return Err(Error::invalid(format!(
            "`{}` is not a throwable type",
            exception.name()
        )));
    }
    let unchecked = exception.is_assignable_to(&pool.describe(lang::RUNTIME_EXCEPTION)?)
        || exception.is_assignable_to(&pool.describe(lang::ERROR)?);
    if unchecked {
        return Ok(any());
    }
    Ok(throwing(list_contains(is_super_type_of(exception.clone()))))
}

pub fn is_sub_type_of(ty: TypeDescription) -> TypeMatcher {
    Junction::Leaf(TypeLeaf::SubTypeOf(ty))
}

pub fn is_super_type_of(ty: TypeDescription) -> TypeMatcher {
    Junction::Leaf(TypeLeaf::SuperTypeOf(ty))
}

pub fn declares_field(matcher: FieldMatcher) -> TypeMatcher {
    Junction::Leaf(TypeLeaf::DeclaresField(Box::new(matcher)))
}

pub fn declares_method(matcher: MethodMatcher) -> TypeMatcher {
    Junction::Leaf(TypeLeaf::DeclaresMethod(Box::new(matcher)))
}

/// Types whose declared or `@Inherited` annotations include one whose type
/// matches.
pub fn inherits_annotation(matcher: TypeMatcher) -> TypeMatcher {
    Junction::Leaf(TypeLeaf::InheritsAnnotation(Box::new(matcher)))
}

pub fn field_type(matcher: TypeMatcher) -> FieldMatcher {
    Junction::Leaf(FieldLeaf::FieldType(matcher))
}

pub fn has_field_type(ty: TypeDescription) -> FieldMatcher {
    field_type(is(ty))
}

pub fn annotation_type(matcher: TypeMatcher) -> AnnotationMatcher {
    Junction::Leaf(AnnotationLeaf::AnnotationType(matcher))
}

pub fn has_annotation_type(ty: TypeDescription) -> AnnotationMatcher {
    annotation_type(is(ty))
}

pub fn one_to_one(matchers: impl IntoIterator<Item = TypeMatcher>) -> TypeListMatcher {
    Junction::Leaf(TypeListLeaf::OneToOne(matchers.into_iter().collect()))
}

pub fn list_size(size: usize) -> TypeListMatcher {
    Junction::Leaf(TypeListLeaf::Size(size))
}

pub fn list_contains(matcher: TypeMatcher) -> TypeListMatcher {
    Junction::Leaf(TypeListLeaf::Contains(matcher))
}
