use std::sync::Arc;

use classforge_bytecode::ClassFileVersion;

use super::lookup::{MethodLookup, Provenance};
use crate::description::{MethodDescription, TypeDescription};
use crate::instrumentation::StackManipulation;

/// Which type an instrumentation sees as the origin of the instrumented
/// methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginTypeIdentifier {
    /// The direct superclass.
    #[default]
    SuperType,
    /// The instrumented type itself.
    Level,
}

/// Builds the [`InstrumentationTarget`] a method registry is compiled
/// against.
pub trait TargetFactory {
    fn make(
        &self,
        instrumented_type: &TypeDescription,
        lookup: MethodLookup,
    ) -> InstrumentationTarget;
}

/// Creates targets for subclasses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubclassTargetFactory {
    pub origin: OriginTypeIdentifier,
    pub class_file_version: ClassFileVersion,
}

impl TargetFactory for SubclassTargetFactory {
    fn make(
        &self,
        instrumented_type: &TypeDescription,
        lookup: MethodLookup,
    ) -> InstrumentationTarget {
        InstrumentationTarget {
            instrumented_type: instrumented_type.clone(),
            lookup: Arc::new(lookup),
            origin: self.origin,
            class_file_version: self.class_file_version,
        }
    }
}

/// What an instrumentation can ask about the type it implements methods
/// for. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct InstrumentationTarget {
    instrumented_type: TypeDescription,
    lookup: Arc<MethodLookup>,
    origin: OriginTypeIdentifier,
    class_file_version: ClassFileVersion,
}

impl InstrumentationTarget {
    pub fn instrumented_type(&self) -> &TypeDescription {
        &self.instrumented_type
    }

    pub fn origin_type(&self) -> TypeDescription {
        match self.origin {
            OriginTypeIdentifier::SuperType => self
                .instrumented_type
                .super_type()
                .unwrap_or_else(|| self.instrumented_type.clone()),
            OriginTypeIdentifier::Level => self.instrumented_type.clone(),
        }
    }

    pub fn class_file_version(&self) -> ClassFileVersion {
        self.class_file_version
    }

    pub fn lookup(&self) -> &MethodLookup {
        &self.lookup
    }

    /// A non-virtual call of `method`'s super implementation, or
    /// [`StackManipulation::Illegal`] when there is none.
    ///
    /// Constructors call the superclass constructor with the same
    /// descriptor. Methods call the implementation found on the superclass
    /// chain, or a default method of a direct interface.
    pub fn invoke_super(&self, method: &MethodDescription) -> StackManipulation {
        let Some(super_type) = self.instrumented_type.super_type() else {
            return StackManipulation::Illegal;
        };
        if method.is_constructor() {
            let descriptor = method.descriptor();
            return super_type
                .declared_methods()
                .into_iter()
                .find(|c| {
                    c.is_constructor()
                        && c.descriptor() == descriptor
                        && c.is_visible_to(&self.instrumented_type)
                })
                .map_or(StackManipulation::Illegal, |c| {
                    StackManipulation::invoke_special(&c, &super_type)
                });
        }
        if !method.is_method() {
            return StackManipulation::Illegal;
        }

        let Some(entry) = self.lookup.inherited(&method.signature()) else {
            return StackManipulation::Illegal;
        };
        match &entry.provenance {
            Provenance::Inherited(_) => {
                StackManipulation::invoke_special(&entry.method, &super_type)
            }
            Provenance::Default(interface)
                if self.class_file_version.supports_default_methods()
                    && self.instrumented_type.interfaces().contains(interface) =>
            {
                StackManipulation::invoke_special(&entry.method, interface)
            }
            _ => StackManipulation::Illegal,
        }
    }
}
