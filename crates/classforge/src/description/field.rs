use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use classforge_core::ModifierReviewable;

use super::names;
use super::{AnnotationDescription, AnnotationToken, ByteCodeElement, TypeDescription, is_visible};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldToken {
    pub(crate) name: String,
    pub(crate) field_type: String,
    pub(crate) modifiers: u16,
    pub(crate) annotations: Vec<AnnotationToken>,
}

impl FieldToken {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: names::normalize_name(&field_type.into()),
            modifiers: 0,
            annotations: Vec::new(),
        }
    }

    pub fn modifiers(mut self, modifiers: u16) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn annotation(mut self, annotation: AnnotationToken) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type_name(&self) -> &str {
        &self.field_type
    }

    pub fn descriptor(&self) -> String {
        names::descriptor_of(&self.field_type)
    }
}

#[derive(Clone)]
pub struct FieldDescription {
    declaring_type: TypeDescription,
    token: Arc<FieldToken>,
}

impl FieldDescription {
    pub(crate) fn new(declaring_type: TypeDescription, token: Arc<FieldToken>) -> Self {
        Self {
            declaring_type,
            token,
        }
    }

    pub fn token(&self) -> &FieldToken {
        &self.token
    }

    pub fn name(&self) -> &str {
        &self.token.name
    }

    pub fn declaring_type(&self) -> &TypeDescription {
        &self.declaring_type
    }

    pub fn field_type(&self) -> TypeDescription {
        self.declaring_type.resolve(&self.token.field_type)
    }

    pub fn descriptor(&self) -> String {
        self.token.descriptor()
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
}

impl ModifierReviewable for FieldDescription {
    fn modifiers(&self) -> u16 {
        self.token.modifiers
    }
}

impl ByteCodeElement for FieldDescription {
    fn source_code_name(&self) -> &str {
        &self.token.name
    }

    fn descriptor(&self) -> String {
        self.token.descriptor()
    }

    fn declaring_type(&self) -> Option<TypeDescription> {
        Some(self.declaring_type.clone())
    }

    fn is_visible_to(&self, viewer: &TypeDescription) -> bool {
        FieldDescription::is_visible_to(self, viewer)
    }

    fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        FieldDescription::declared_annotations(self)
    }
}

impl PartialEq for FieldDescription {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.token.name == other.token.name
            && self.token.field_type == other.token.field_type
    }
}

impl Eq for FieldDescription {}

impl Hash for FieldDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaring_type.hash(state);
        self.token.name.hash(state);
        self.token.field_type.hash(state);
    }
}

impl PartialOrd for FieldDescription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldDescription {
    fn cmp(&self, other: &Self) -> Ordering {
        self.declaring_type
            .cmp(&other.declaring_type)
            .then_with(|| self.token.name.cmp(&other.token.name))
            .then_with(|| self.token.field_type.cmp(&other.token.field_type))
    }
}

impl fmt::Debug for FieldDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldDescription({}.{}:{})",
            self.declaring_type.name(),
            self.token.name,
            self.token.descriptor()
        )
    }
}
