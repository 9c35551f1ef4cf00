//! Descriptions of program elements.
//!
//! Types, methods, fields and annotations are described by immutable values
//! that reference other types by name only:
//! - Type descriptions, either loaded (from a [`TypePool`]) or latent (the type under construction)
//! - Method and field descriptions, pairing a declaring type with a member token
//! - Annotation descriptions with retention derived from `@Retention`
//! - The visibility rule shared by matchers and constructor strategies

mod annotation;
mod field;
pub mod lang;
mod method;
mod names;
mod pool;
mod type_description;
mod visibility;

#[cfg(test)]
mod method_tests;
#[cfg(test)]
mod pool_tests;

use classforge_core::ModifierReviewable;

pub use annotation::{AnnotationDescription, AnnotationToken, RetentionPolicy};
pub use field::{FieldDescription, FieldToken};
pub use method::{MethodDescription, MethodSort, MethodToken};
pub use pool::{TypeDefinition, TypePool};
pub use type_description::{Primitive, StackSize, TypeDescription, TypeOrigin};
pub use visibility::is_visible;

pub(crate) use method::TYPE_INITIALIZER_NAME;
pub(crate) use type_description::TypeData;

/// Common view of types, methods and fields.
pub trait ByteCodeElement: ModifierReviewable {
    /// Name as written in source; empty for constructors and type initializers.
    fn source_code_name(&self) -> &str;

    fn descriptor(&self) -> String;

    /// `None` for top-level types.
    fn declaring_type(&self) -> Option<TypeDescription>;

    fn is_visible_to(&self, viewer: &TypeDescription) -> bool;

    fn declared_annotations(&self) -> Vec<AnnotationDescription>;
}

impl ByteCodeElement for TypeDescription {
    fn source_code_name(&self) -> &str {
        self.name()
    }

    fn descriptor(&self) -> String {
        TypeDescription::descriptor(self)
    }

    fn declaring_type(&self) -> Option<TypeDescription> {
        None
    }

    fn is_visible_to(&self, viewer: &TypeDescription) -> bool {
        TypeDescription::is_visible_to(self, viewer)
    }

    fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        TypeDescription::declared_annotations(self)
    }
}
