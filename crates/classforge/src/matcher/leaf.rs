use classforge_core::ModifierReviewable;
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_BRIDGE, ACC_FINAL, ACC_NATIVE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
    ACC_STATIC, ACC_STRICT, ACC_SYNCHRONIZED, ACC_SYNTHETIC, ACC_VARARGS,
};

use super::{
    AnnotationMatcher, FieldMatcher, Leaf, MethodMatcher, StringMatcher, TypeListMatcher,
    TypeMatcher,
};
use crate::description::{
    AnnotationDescription, ByteCodeElement, FieldDescription, MethodDescription, TypeDescription,
};

/// A single modifier bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierMatch {
    Public,
    Protected,
    Private,
    Final,
    Static,
    Abstract,
    Synthetic,
    Synchronized,
    Native,
    Strict,
    VarArgs,
    Bridge,
}

impl ModifierMatch {
    pub fn mask(self) -> u16 {
        match self {
            Self::Public => ACC_PUBLIC,
            Self::Protected => ACC_PROTECTED,
            Self::Private => ACC_PRIVATE,
            Self::Final => ACC_FINAL,
            Self::Static => ACC_STATIC,
            Self::Abstract => ACC_ABSTRACT,
            Self::Synthetic => ACC_SYNTHETIC,
            Self::Synchronized => ACC_SYNCHRONIZED,
            Self::Native => ACC_NATIVE,
            Self::Strict => ACC_STRICT,
            Self::VarArgs => ACC_VARARGS,
            Self::Bridge => ACC_BRIDGE,
        }
    }

    pub fn matches(self, modifiers: u16) -> bool {
        modifiers & self.mask() != 0
    }
}

/// Predicates shared by every byte code element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementLeaf {
    /// Source code name; empty for constructors and type initializers.
    Name(StringMatcher),
    Descriptor(String),
    Modifier(ModifierMatch),
    DeclaredBy(Box<TypeMatcher>),
    VisibleTo(TypeDescription),
    DeclaresAnnotation(Box<AnnotationMatcher>),
}

impl ElementLeaf {
    pub fn matches<E: ByteCodeElement + ?Sized>(&self, element: &E) -> bool {
        match self {
            Self::Name(name) => name.matches(element.source_code_name()),
            Self::Descriptor(descriptor) => element.descriptor() == *descriptor,
            Self::Modifier(modifier) => modifier.matches(element.modifiers()),
            Self::DeclaredBy(matcher) => element
                .declaring_type()
                .is_some_and(|declaring| matcher.matches(&declaring)),
            Self::VisibleTo(viewer) => element.is_visible_to(viewer),
            Self::DeclaresAnnotation(matcher) => element
                .declared_annotations()
                .iter()
                .any(|annotation| matcher.matches(annotation)),
        }
    }
}

/// Leaves that embed the shared element predicates.
pub trait ElementKind: Leaf {
    fn element(leaf: ElementLeaf) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
    TypeInitializer,
    VisibilityBridge,
    Overridable,
    DefaultMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MethodLeaf {
    Is(MethodDescription),
    Element(ElementLeaf),
    Kind(MethodKind),
    Returns(TypeMatcher),
    Parameters(TypeListMatcher),
    Argument { index: usize, matcher: TypeMatcher },
    Exceptions(TypeListMatcher),
    /// Same name and staticness with covariant return and parameter types.
    SpecializationOf(MethodDescription),
}

impl Leaf for MethodLeaf {
    type Target = MethodDescription;

    fn matches(&self, method: &MethodDescription) -> bool {
        match self {
            Self::Is(expected) => method == expected,
            Self::Element(leaf) => leaf.matches(method),
            Self::Kind(kind) => match kind {
                MethodKind::Method => method.is_method(),
                MethodKind::Constructor => method.is_constructor(),
                MethodKind::TypeInitializer => method.is_type_initializer(),
                MethodKind::VisibilityBridge => method.is_visibility_bridge(),
                MethodKind::Overridable => method.is_overridable(),
                MethodKind::DefaultMethod => method.is_default_method(),
            },
            Self::Returns(matcher) => matcher.matches(&method.return_type()),
            Self::Parameters(matcher) => matcher.matches(method.parameter_types().as_slice()),
            Self::Argument { index, matcher } => method
                .parameter_types()
                .get(*index)
                .is_some_and(|parameter| matcher.matches(parameter)),
            Self::Exceptions(matcher) => matcher.matches(method.exception_types().as_slice()),
            Self::SpecializationOf(general) => is_specialization(method, general),
        }
    }
}

impl ElementKind for MethodLeaf {
    fn element(leaf: ElementLeaf) -> Self {
        Self::Element(leaf)
    }
}

fn is_specialization(method: &MethodDescription, general: &MethodDescription) -> bool {
    if method.internal_name() != general.internal_name()
        || method.is_static() != general.is_static()
    {
        return false;
    }
    let covariant = |special: &TypeDescription, base: &TypeDescription| {
        if special.is_primitive() || base.is_primitive() {
            special == base
        } else {
            special.is_assignable_to(base)
        }
    };
    let parameters = method.parameter_types();
    let general_parameters = general.parameter_types();
    parameters.len() == general_parameters.len()
        && covariant(&method.return_type(), &general.return_type())
        && parameters
            .iter()
            .zip(&general_parameters)
            .all(|(special, base)| covariant(special, base))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeLeaf {
    Is(TypeDescription),
    Element(ElementLeaf),
    SubTypeOf(TypeDescription),
    SuperTypeOf(TypeDescription),
    DeclaresField(Box<FieldMatcher>),
    DeclaresMethod(Box<MethodMatcher>),
    InheritsAnnotation(Box<TypeMatcher>),
}

impl Leaf for TypeLeaf {
    type Target = TypeDescription;

    fn matches(&self, ty: &TypeDescription) -> bool {
        match self {
            Self::Is(expected) => ty == expected,
            Self::Element(leaf) => leaf.matches(ty),
            Self::SubTypeOf(parent) => ty.is_assignable_to(parent),
            Self::SuperTypeOf(child) => ty.is_assignable_from(child),
            Self::DeclaresField(matcher) => ty.declared_fields().iter().any(|f| matcher.matches(f)),
            Self::DeclaresMethod(matcher) => {
                ty.declared_methods().iter().any(|m| matcher.matches(m))
            }
            Self::InheritsAnnotation(matcher) => ty
                .inherited_annotations()
                .iter()
                .any(|a| matcher.matches(a.annotation_type())),
        }
    }
}

impl ElementKind for TypeLeaf {
    fn element(leaf: ElementLeaf) -> Self {
        Self::Element(leaf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldLeaf {
    Is(FieldDescription),
    Element(ElementLeaf),
    FieldType(TypeMatcher),
}

impl Leaf for FieldLeaf {
    type Target = FieldDescription;

    fn matches(&self, field: &FieldDescription) -> bool {
        match self {
            Self::Is(expected) => field == expected,
            Self::Element(leaf) => leaf.matches(field),
            Self::FieldType(matcher) => matcher.matches(&field.field_type()),
        }
    }
}

impl ElementKind for FieldLeaf {
    fn element(leaf: ElementLeaf) -> Self {
        Self::Element(leaf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationLeaf {
    Is(AnnotationDescription),
    AnnotationType(TypeMatcher),
}

impl Leaf for AnnotationLeaf {
    type Target = AnnotationDescription;

    fn matches(&self, annotation: &AnnotationDescription) -> bool {
        match self {
            Self::Is(expected) => annotation == expected,
            Self::AnnotationType(matcher) => matcher.matches(annotation.annotation_type()),
        }
    }
}

/// Predicates over ordered type lists such as parameter or exception types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeListLeaf {
    /// Same length, each element matched by the matcher at its position.
    OneToOne(Vec<TypeMatcher>),
    Size(usize),
    Contains(TypeMatcher),
}

impl Leaf for TypeListLeaf {
    type Target = [TypeDescription];

    fn matches(&self, types: &[TypeDescription]) -> bool {
        match self {
            Self::OneToOne(matchers) => {
                matchers.len() == types.len()
                    && matchers.iter().zip(types).all(|(m, ty)| m.matches(ty))
            }
            Self::Size(size) => types.len() == *size,
            Self::Contains(matcher) => types.iter().any(|ty| matcher.matches(ty)),
        }
    }
}
