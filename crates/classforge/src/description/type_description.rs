use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use classforge_bytecode::FieldType;
use classforge_core::ModifierReviewable;
use classforge_core::modifier::{ACC_ANNOTATION, ACC_INTERFACE};

use super::lang;
use super::names::{self, VOID};
use super::{
    AnnotationDescription, AnnotationToken, FieldDescription, FieldToken, MethodDescription,
    MethodToken, TypePool,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub fn descriptor(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn from_descriptor(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() == c)
    }

    pub(crate) fn from_field_type(ty: &FieldType) -> Option<Self> {
        let primitive = match ty {
            FieldType::Boolean => Self::Boolean,
            FieldType::Byte => Self::Byte,
            FieldType::Char => Self::Char,
            FieldType::Short => Self::Short,
            FieldType::Int => Self::Int,
            FieldType::Long => Self::Long,
            FieldType::Float => Self::Float,
            FieldType::Double => Self::Double,
            FieldType::Object(_) | FieldType::Array(_) => return None,
        };
        Some(primitive)
    }

    pub fn stack_size(self) -> StackSize {
        match self {
            Self::Long | Self::Double => StackSize::Double,
            _ => StackSize::Single,
        }
    }
}

/// Operand stack slots taken by a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StackSize {
    Zero,
    Single,
    Double,
}

impl StackSize {
    pub fn size(self) -> u16 {
        match self {
            Self::Zero => 0,
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    pub fn maximum(self, other: StackSize) -> StackSize {
        self.max(other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeSort {
    Void,
    Primitive(Primitive),
    Array { component: String },
    Class,
}

/// Whether a type was described from an existing class or is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    Loaded,
    Latent,
}

#[derive(Debug, Clone)]
pub(crate) struct TypeData {
    pub(crate) name: String,
    pub(crate) sort: TypeSort,
    pub(crate) modifiers: u16,
    pub(crate) super_type: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) fields: Vec<Arc<FieldToken>>,
    pub(crate) methods: Vec<Arc<MethodToken>>,
    pub(crate) annotations: Vec<AnnotationToken>,
    pub(crate) origin: TypeOrigin,
}

impl TypeData {
    pub(crate) fn class(name: impl Into<String>, modifiers: u16, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            sort: TypeSort::Class,
            modifiers,
            super_type: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            origin,
        }
    }
}

/// Description of a type.
///
/// Other types are referenced by name and resolved through the pool the
/// description belongs to, so descriptions never own each other. Equality,
/// ordering and hashing use the binary name only.
#[derive(Clone)]
pub struct TypeDescription {
    data: Arc<TypeData>,
    pool: TypePool,
}

impl TypeDescription {
    pub(crate) fn new(data: Arc<TypeData>, pool: TypePool) -> Self {
        Self { data, pool }
    }

    pub(crate) fn data(&self) -> &TypeData {
        &self.data
    }

    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    /// Binary name (`java.lang.Object`, `int`, `[Ljava.lang.String;`).
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Name as used inside class files (`java/lang/Object`).
    pub fn internal_name(&self) -> String {
        match &self.data.sort {
            TypeSort::Class => self.data.name.replace('.', "/"),
            TypeSort::Array { .. } => self.descriptor(),
            TypeSort::Void | TypeSort::Primitive(_) => self.data.name.clone(),
        }
    }

    pub fn descriptor(&self) -> String {
        names::descriptor_of(&self.data.name)
    }

    pub fn simple_name(&self) -> &str {
        self.data
            .name
            .rsplit_once('.')
            .map_or(self.data.name.as_str(), |(_, simple)| simple)
    }

    /// Package of a class or interface; empty for the default package and
    /// for primitives. Arrays report their element type's package.
    pub fn package_name(&self) -> String {
        match &self.data.sort {
            TypeSort::Class => self
                .data
                .name
                .rsplit_once('.')
                .map(|(package, _)| package.to_string())
                .unwrap_or_default(),
            TypeSort::Array { .. } => self
                .component_type()
                .map(|c| c.package_name())
                .unwrap_or_default(),
            TypeSort::Void | TypeSort::Primitive(_) => String::new(),
        }
    }

    pub fn origin(&self) -> TypeOrigin {
        self.data.origin
    }

    pub fn is_void(&self) -> bool {
        self.data.sort == TypeSort::Void
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.data.sort, TypeSort::Primitive(_) | TypeSort::Void)
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.data.sort {
            TypeSort::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data.sort, TypeSort::Array { .. })
    }

    pub fn is_interface(&self) -> bool {
        self.data.modifiers & ACC_INTERFACE != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.data.modifiers & ACC_ANNOTATION != 0
    }

    /// Whether the name equals `name`.
    pub fn represents(&self, name: &str) -> bool {
        self.data.name == name
    }

    pub fn component_type(&self) -> Option<TypeDescription> {
        match &self.data.sort {
            TypeSort::Array { component } => Some(self.resolve(component)),
            _ => None,
        }
    }

    /// The array type with this type as its component.
    pub fn array_type(&self) -> TypeDescription {
        self.resolve(&names::array_name_of(&self.data.name))
    }

    pub fn stack_size(&self) -> StackSize {
        match self.data.sort {
            TypeSort::Void => StackSize::Zero,
            TypeSort::Primitive(p) => p.stack_size(),
            TypeSort::Array { .. } | TypeSort::Class => StackSize::Single,
        }
    }

    pub fn super_type(&self) -> Option<TypeDescription> {
        self.data.super_type.as_deref().map(|name| self.resolve(name))
    }

    pub fn interfaces(&self) -> Vec<TypeDescription> {
        self.data
            .interfaces
            .iter()
            .map(|name| self.resolve(name))
            .collect()
    }

    /// Superclass chain, nearest first, excluding this type.
    pub fn super_classes(&self) -> Vec<TypeDescription> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.super_type();
        while let Some(ty) = current {
            if !seen.insert(ty.name().to_string()) {
                break;
            }
            current = ty.super_type();
            chain.push(ty);
        }
        chain
    }

    /// Every interface implemented directly or through supertypes, in
    /// breadth-first discovery order.
    pub fn all_interfaces(&self) -> Vec<TypeDescription> {
        let mut queue: VecDeque<TypeDescription> = VecDeque::new();
        queue.extend(self.interfaces());
        for class in self.super_classes() {
            queue.extend(class.interfaces());
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        while let Some(interface) = queue.pop_front() {
            if !seen.insert(interface.name().to_string()) {
                continue;
            }
            queue.extend(interface.interfaces());
            out.push(interface);
        }
        out
    }

    pub fn declared_methods(&self) -> Vec<MethodDescription> {
        self.data
            .methods
            .iter()
            .map(|token| MethodDescription::new(self.clone(), Arc::clone(token)))
            .collect()
    }

    pub fn declared_fields(&self) -> Vec<FieldDescription> {
        self.data
            .fields
            .iter()
            .map(|token| FieldDescription::new(self.clone(), Arc::clone(token)))
            .collect()
    }

    pub fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        self.data
            .annotations
            .iter()
            .map(|token| token.describe(self))
            .collect()
    }

    /// Declared annotations plus those whose type is `@Inherited`, collected
    /// along the superclass chain. The nearest declaration of a type wins.
    pub fn inherited_annotations(&self) -> Vec<AnnotationDescription> {
        let mut annotations = self.declared_annotations();
        let mut seen: HashSet<String> = annotations
            .iter()
            .map(|a| a.annotation_type().name().to_string())
            .collect();
        for class in self.super_classes() {
            for annotation in class.declared_annotations() {
                if annotation.is_inherited()
                    && seen.insert(annotation.annotation_type().name().to_string())
                {
                    annotations.push(annotation);
                }
            }
        }
        annotations
    }

    /// Whether a value of this type can be assigned to `target` without
    /// conversion.
    pub fn is_assignable_to(&self, target: &TypeDescription) -> bool {
        if self == target {
            return true;
        }
        match (&self.data.sort, &target.data.sort) {
            (TypeSort::Void | TypeSort::Primitive(_), _)
            | (_, TypeSort::Void | TypeSort::Primitive(_)) => false,
            (TypeSort::Array { .. }, TypeSort::Array { .. }) => {
                match (self.component_type(), target.component_type()) {
                    (Some(a), Some(b)) if !a.is_primitive() && !b.is_primitive() => {
                        a.is_assignable_to(&b)
                    }
                    _ => false,
                }
            }
            _ if target.represents(lang::OBJECT) => true,
            _ => self.any_super_type(|ty| ty == target),
        }
    }

    pub fn is_assignable_from(&self, source: &TypeDescription) -> bool {
        source.is_assignable_to(self)
    }

    /// Breadth-first walk over all supertypes (classes and interfaces).
    fn any_super_type(&self, mut found: impl FnMut(&TypeDescription) -> bool) -> bool {
        let mut queue = VecDeque::from([self.clone()]);
        let mut seen = HashSet::new();
        while let Some(ty) = queue.pop_front() {
            if !seen.insert(ty.name().to_string()) {
                continue;
            }
            if found(&ty) {
                return true;
            }
            queue.extend(ty.super_type());
            queue.extend(ty.interfaces());
        }
        false
    }

    pub fn is_same_package(&self, other: &TypeDescription) -> bool {
        self.package_name() == other.package_name()
    }

    /// Whether `viewer` may refer to this type: primitives always, arrays
    /// when their element type is visible, classes when public or in the
    /// viewer's package.
    pub fn is_visible_to(&self, viewer: &TypeDescription) -> bool {
        match &self.data.sort {
            TypeSort::Void | TypeSort::Primitive(_) => true,
            TypeSort::Array { .. } => self
                .component_type()
                .is_some_and(|component| component.is_visible_to(viewer)),
            TypeSort::Class => self.is_public() || self.is_same_package(viewer),
        }
    }

    /// Resolve a referenced type name from this type's point of view.
    pub(crate) fn resolve(&self, name: &str) -> TypeDescription {
        if name == self.data.name {
            self.clone()
        } else {
            self.pool.resolve(name)
        }
    }

    pub(crate) fn void(pool: TypePool) -> Self {
        let mut data = TypeData::class(VOID, 0, TypeOrigin::Loaded);
        data.sort = TypeSort::Void;
        Self::new(Arc::new(data), pool)
    }
}

impl ModifierReviewable for TypeDescription {
    fn modifiers(&self) -> u16 {
        self.data.modifiers
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.data.name == other.data.name
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.name.hash(state);
    }
}

impl PartialOrd for TypeDescription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDescription {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.name.cmp(&other.data.name)
    }
}

impl fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescription").field(&self.data.name).finish()
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data.name)
    }
}
