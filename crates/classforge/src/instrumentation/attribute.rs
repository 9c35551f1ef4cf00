//! Attribute appenders write annotations onto the emitted type, its fields
//! and its methods. Annotations with source retention are never written.

use classforge_bytecode::{ClassVisitor, FieldVisitor, MethodVisitor};

use crate::description::{
    AnnotationDescription, FieldDescription, MethodDescription, RetentionPolicy, TypeDescription,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeAttributeAppender {
    #[default]
    NoOp,
    ForAnnotations(Vec<AnnotationDescription>),
    /// Copy the runtime-visible annotations declared by the given type.
    ForType(TypeDescription),
    Compound(Vec<TypeAttributeAppender>),
}

impl TypeAttributeAppender {
    pub fn apply(&self, visitor: &mut dyn ClassVisitor, instrumented_type: &TypeDescription) {
        match self {
            Self::NoOp => {}
            Self::ForAnnotations(annotations) => {
                for node in annotations.iter().filter_map(AnnotationDescription::to_node) {
                    visitor.visit_annotation(node);
                }
            }
            Self::ForType(ty) => {
                for node in ty
                    .declared_annotations()
                    .iter()
                    .filter(|a| a.retention() == RetentionPolicy::Runtime)
                    .filter_map(AnnotationDescription::to_node)
                {
                    visitor.visit_annotation(node);
                }
            }
            Self::Compound(all) => {
                for appender in all {
                    appender.apply(visitor, instrumented_type);
                }
            }
        }
    }

    pub fn compound(self, other: TypeAttributeAppender) -> Self {
        match (self, other) {
            (Self::NoOp, other) => other,
            (this, Self::NoOp) => this,
            (Self::Compound(mut all), other) => {
                all.push(other);
                Self::Compound(all)
            }
            (this, other) => Self::Compound(vec![this, other]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldAttributeAppender {
    #[default]
    NoOp,
    ForAnnotations(Vec<AnnotationDescription>),
    /// Write the annotations the field itself declares.
    ForInstrumentedField,
}

impl FieldAttributeAppender {
    pub fn apply(&self, visitor: &mut FieldVisitor, field: &FieldDescription) {
        let annotations = match self {
            Self::NoOp => return,
            Self::ForAnnotations(annotations) => annotations.clone(),
            Self::ForInstrumentedField => field.declared_annotations(),
        };
        for node in annotations.iter().filter_map(AnnotationDescription::to_node) {
            visitor.visit_annotation(node);
        }
    }
}

/// Writes method annotations. Every variant is its own factory: a registry
/// entry keeps the appender and calls [`make`](Self::make) once the
/// instrumented type is final.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MethodAttributeAppender {
    #[default]
    NoOp,
    ForAnnotations(Vec<AnnotationDescription>),
    /// Copy the annotations of the method being implemented, which for an
    /// override are those of the overridden method.
    ForInstrumentedMethod,
    Compound(Vec<MethodAttributeAppender>),
}

impl MethodAttributeAppender {
    pub fn make(&self, _instrumented_type: &TypeDescription) -> MethodAttributeAppender {
        self.clone()
    }

    pub fn apply(&self, visitor: &mut MethodVisitor, method: &MethodDescription) {
        match self {
            Self::NoOp => {}
            Self::ForAnnotations(annotations) => {
                for node in annotations.iter().filter_map(AnnotationDescription::to_node) {
                    visitor.visit_annotation(node);
                }
            }
            Self::ForInstrumentedMethod => {
                for node in method
                    .declared_annotations()
                    .iter()
                    .filter_map(AnnotationDescription::to_node)
                {
                    visitor.visit_annotation(node);
                }
            }
            Self::Compound(all) => {
                for appender in all {
                    appender.apply(visitor, method);
                }
            }
        }
    }

    pub fn compound(self, other: MethodAttributeAppender) -> Self {
        match (self, other) {
            (Self::NoOp, other) => other,
            (this, Self::NoOp) => this,
            (Self::Compound(mut all), other) => {
                all.push(other);
                Self::Compound(all)
            }
            (this, other) => Self::Compound(vec![this, other]),
        }
    }
}
