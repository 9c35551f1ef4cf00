use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use classforge_bytecode::MethodDescriptor;
use classforge_core::ModifierReviewable;
use classforge_core::modifier::{ACC_ABSTRACT, ACC_BRIDGE, ACC_FINAL, ACC_PRIVATE, ACC_STATIC};

use super::names::{self, VOID};
use super::{AnnotationDescription, AnnotationToken, ByteCodeElement, TypeDescription, is_visible};
use crate::Result;

pub(crate) const CONSTRUCTOR_NAME: &str = "<init>";
pub(crate) const TYPE_INITIALIZER_NAME: &str = "<clinit>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodSort {
    Constructor,
    Method,
    TypeInitializer,
}

/// The shape of a method, independent of its declaring type.
///
/// Types are held by binary name and resolved against the declaring type
/// when described.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodToken {
    pub(crate) internal_name: String,
    pub(crate) return_type: String,
    pub(crate) parameter_types: Vec<String>,
    pub(crate) exception_types: Vec<String>,
    pub(crate) modifiers: u16,
    pub(crate) annotations: Vec<AnnotationToken>,
}

impl MethodToken {
    pub fn new(internal_name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            return_type: names::normalize_name(&return_type.into()),
            parameter_types: Vec::new(),
            exception_types: Vec::new(),
            modifiers: 0,
            annotations: Vec::new(),
        }
    }

    pub fn constructor() -> Self {
        Self::new(CONSTRUCTOR_NAME, VOID)
    }

    pub fn type_initializer() -> Self {
        Self::new(TYPE_INITIALIZER_NAME, VOID).modifiers(ACC_STATIC)
    }

    /// Build a token from a JVM method descriptor (`(ILjava/lang/String;)V`).
    pub fn from_descriptor(internal_name: impl Into<String>, descriptor: &str) -> Result<Self> {
        let parsed = MethodDescriptor::parse(descriptor)?;
        let return_type = parsed
            .return_type
            .as_ref()
            .map_or_else(|| VOID.to_string(), names::binary_name_of);
        Ok(Self::new(internal_name, return_type)
            .parameters(parsed.parameters.iter().map(names::binary_name_of)))
    }

    pub fn parameters<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.parameter_types
            .extend(types.into_iter().map(|t| names::normalize_name(&t.into())));
        self
    }

    pub fn throws<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.exception_types
            .extend(types.into_iter().map(|t| names::normalize_name(&t.into())));
        self
    }

    pub fn modifiers(mut self, modifiers: u16) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn annotation(mut self, annotation: AnnotationToken) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn return_type_name(&self) -> &str {
        &self.return_type
    }

    pub fn parameter_type_names(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn exception_type_names(&self) -> &[String] {
        &self.exception_types
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for parameter in &self.parameter_types {
            out.push_str(&names::descriptor_of(parameter));
        }
        out.push(')');
        out.push_str(&names::descriptor_of(&self.return_type));
        out
    }

    /// Name plus descriptor; two methods with equal signatures override each
    /// other.
    pub fn signature(&self) -> String {
        format!("{}{}", self.internal_name, self.descriptor())
    }

    pub fn sort(&self) -> MethodSort {
        match self.internal_name.as_str() {
            CONSTRUCTOR_NAME => MethodSort::Constructor,
            TYPE_INITIALIZER_NAME => MethodSort::TypeInitializer,
            _ => MethodSort::Method,
        }
    }
}

/// A method, constructor or type initializer of a declaring type.
///
/// Two descriptions are equal when they share declaring type, internal name
/// and descriptor.
#[derive(Clone)]
pub struct MethodDescription {
    declaring_type: TypeDescription,
    token: Arc<MethodToken>,
}

impl MethodDescription {
    pub(crate) fn new(declaring_type: TypeDescription, token: Arc<MethodToken>) -> Self {
        Self {
            declaring_type,
            token,
        }
    }

    pub fn token(&self) -> &MethodToken {
        &self.token
    }

    pub fn declaring_type(&self) -> &TypeDescription {
        &self.declaring_type
    }

    pub fn internal_name(&self) -> &str {
        &self.token.internal_name
    }

    pub fn sort(&self) -> MethodSort {
        self.token.sort()
    }

    pub fn return_type(&self) -> TypeDescription {
        self.declaring_type.resolve(&self.token.return_type)
    }

    pub fn parameter_types(&self) -> Vec<TypeDescription> {
        self.token
            .parameter_types
            .iter()
            .map(|name| self.declaring_type.resolve(name))
            .collect()
    }

    pub fn exception_types(&self) -> Vec<TypeDescription> {
        self.token
            .exception_types
            .iter()
            .map(|name| self.declaring_type.resolve(name))
            .collect()
    }

    pub fn descriptor(&self) -> String {
        self.token.descriptor()
    }

    pub fn signature(&self) -> String {
        self.token.signature()
    }

    /// Local variable slots taken by the arguments, excluding `this`.
    pub fn parameter_size(&self) -> u16 {
        self.parameter_types()
            .iter()
            .map(|t| t.stack_size().size())
            .sum()
    }

    /// Local variable slots taken by `this` (if any) and the arguments.
    pub fn stack_size(&self) -> u16 {
        let receiver = if self.is_static() { 0 } else { 1 };
        receiver + self.parameter_size()
    }

    pub fn is_constructor(&self) -> bool {
        self.sort() == MethodSort::Constructor
    }

    pub fn is_method(&self) -> bool {
        self.sort() == MethodSort::Method
    }

    pub fn is_type_initializer(&self) -> bool {
        self.sort() == MethodSort::TypeInitializer
    }

    pub fn is_bridge(&self) -> bool {
        self.token.modifiers & ACC_BRIDGE != 0
    }

    /// A non-abstract instance method with a body declared by an interface.
    pub fn is_default_method(&self) -> bool {
        self.declaring_type.is_interface()
            && self.is_method()
            && self.token.modifiers & (ACC_ABSTRACT | ACC_STATIC | ACC_PRIVATE) == 0
    }

    /// Whether a subclass may override this method.
    pub fn is_overridable(&self) -> bool {
        self.is_method() && self.token.modifiers & (ACC_STATIC | ACC_PRIVATE | ACC_FINAL) == 0
    }

    /// A bridge method whose signature is also declared by the declaring
    /// type's superclass, i.e. one generated only to widen visibility.
    pub fn is_visibility_bridge(&self) -> bool {
        if !self.is_bridge() {
            return false;
        }
        let signature = self.signature();
        self.declaring_type.super_type().is_some_and(|parent| {
            parent
                .declared_methods()
                .iter()
                .any(|m| m.signature() == signature)
        })
    }

    pub fn is_visible_to(&self, viewer: &TypeDescription) -> bool {
        is_visible(&self.declaring_type, self.token.modifiers, viewer)
    }

    pub fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        self.token
            .annotations
            .iter()
            .map(|token| token.describe(&self.declaring_type))
            .collect()
    }

    /// The same method attached to another declaring type.
    pub(crate) fn redeclared_by(&self, declaring_type: TypeDescription) -> Self {
        Self::new(declaring_type, Arc::clone(&self.token))
    }
}

impl ModifierReviewable for MethodDescription {
    fn modifiers(&self) -> u16 {
        self.token.modifiers
    }
}

impl ByteCodeElement for MethodDescription {
    fn source_code_name(&self) -> &str {
        if self.is_method() {
            &self.token.internal_name
        } else {
            ""
        }
    }

    fn descriptor(&self) -> String {
        self.token.descriptor()
    }

    fn declaring_type(&self) -> Option<TypeDescription> {
        Some(self.declaring_type.clone())
    }

    fn is_visible_to(&self, viewer: &TypeDescription) -> bool {
        MethodDescription::is_visible_to(self, viewer)
    }

    fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        MethodDescription::declared_annotations(self)
    }
}

impl PartialEq for MethodDescription {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.token.internal_name == other.token.internal_name
            && self.token.descriptor() == other.token.descriptor()
    }
}

impl Eq for MethodDescription {}

impl Hash for MethodDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_type.hash(state);
        self.token.internal_name.hash(state);
        self.token.descriptor().hash(state);
    }
}

impl PartialOrd for MethodDescription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MethodDescription {
    fn cmp(&self, other: &Self) -> Ordering {
        self.declaring_type
            .cmp(&other.declaring_type)
            .then_with(|| self.token.internal_name.cmp(&other.token.internal_name))
            .then_with(|| self.token.descriptor().cmp(&other.token.descriptor()))
    }
}

impl fmt::Debug for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodDescription({self})")
    }
}

impl fmt::Display for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.declaring_type.name(),
            self.token.internal_name,
            self.token.descriptor()
        )
    }
}
