//! The user-facing builder API.
//!
//! ```ignore
//! let unloaded = ClassForge::new()
//!     .subclass(&pool.describe("java.lang.Object")?, ConstructorStrategy::DefaultConstructor)?
//!     .method(named("toString"))
//!     .intercept(FixedValue::value("hello"))
//!     .make()?;
//! ```

mod naming;
mod subclass;
mod unloaded;

#[cfg(test)]
mod naming_tests;
#[cfg(test)]
mod subclass_tests;

use std::sync::Arc;

use classforge_bytecode::ClassFileVersion;
use classforge_core::modifier::{ACC_PUBLIC, ModifierReviewable};

pub use naming::NamingStrategy;
pub(crate) use naming::random_suffix;
pub use subclass::{MethodDefinition, MethodInterception, SubclassBuilder};
pub use unloaded::{LoadedClass, Unloaded};

use crate::description::{TypeDescription, lang};
use crate::instrumentation::{
    FieldAttributeAppender, MethodAttributeAppender, TypeAttributeAppender,
};
use crate::matcher::{MethodMatcher, is_default_finalizer, is_synthetic};
use crate::scaffold::{ClassVisitorWrapper, ConstructorStrategy};
use crate::{Error, Result};

/// Build configuration shared by every builder it creates.
///
/// Each `with_*` method returns an updated copy.
#[derive(Debug, Clone)]
pub struct ClassForge {
    class_file_version: ClassFileVersion,
    naming_strategy: NamingStrategy,
    ignored_methods: MethodMatcher,
    type_attribute_appender: TypeAttributeAppender,
    field_attribute_appender: FieldAttributeAppender,
    method_attribute_appender: MethodAttributeAppender,
    class_visitor_wrappers: Vec<Arc<dyn ClassVisitorWrapper>>,
}

impl Default for ClassForge {
    fn default() -> Self {
        Self {
            class_file_version: ClassFileVersion::JAVA_V8,
            naming_strategy: NamingStrategy::default(),
            ignored_methods: is_synthetic().or(is_default_finalizer()),
            type_attribute_appender: TypeAttributeAppender::NoOp,
            field_attribute_appender: FieldAttributeAppender::NoOp,
            method_attribute_appender: MethodAttributeAppender::NoOp,
            class_visitor_wrappers: Vec::new(),
        }
    }
}

impl ClassForge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_file_version(&self) -> ClassFileVersion {
        self.class_file_version
    }

    pub fn with_class_file_version(&self, version: ClassFileVersion) -> Self {
        Self {
            class_file_version: version,
            ..self.clone()
        }
    }

    pub fn with_naming_strategy(&self, naming_strategy: NamingStrategy) -> Self {
        Self {
            naming_strategy,
            ..self.clone()
        }
    }

    /// Inherited methods `ignored` accepts are never overridden.
    pub fn with_ignored_methods(&self, ignored: MethodMatcher) -> Self {
        Self {
            ignored_methods: ignored,
            ..self.clone()
        }
    }

    pub fn with_type_attribute_appender(&self, appender: TypeAttributeAppender) -> Self {
        Self {
            type_attribute_appender: appender,
            ..self.clone()
        }
    }

    /// Appender for fields defined without one of their own.
    pub fn with_field_attribute_appender(&self, appender: FieldAttributeAppender) -> Self {
        Self {
            field_attribute_appender: appender,
            ..self.clone()
        }
    }

    /// Appender for methods intercepted without one of their own.
    pub fn with_method_attribute_appender(&self, appender: MethodAttributeAppender) -> Self {
        Self {
            method_attribute_appender: appender,
            ..self.clone()
        }
    }

    pub fn with_class_visitor(&self, wrapper: Arc<dyn ClassVisitorWrapper>) -> Self {
        let mut class_visitor_wrappers = self.class_visitor_wrappers.clone();
        class_visitor_wrappers.push(wrapper);
        Self {
            class_visitor_wrappers,
            ..self.clone()
        }
    }

    /// Start a subclass of `super_type`. An interface is implemented by a
    /// subclass of `Object`.
    pub fn subclass(
        &self,
        super_type: &TypeDescription,
        constructor_strategy: ConstructorStrategy,
    ) -> Result<SubclassBuilder> {
        if super_type.is_primitive() || super_type.is_array() || super_type.is_final() {
            return Err(Error::invalid(format!(
                "cannot subclass {}",
                super_type.name()
            )));
        }
        let (actual_super_type, interfaces) = if super_type.is_interface() {
            (super_type.resolve(lang::OBJECT), vec![super_type.clone()])
        } else {
            (super_type.clone(), Vec::new())
        };
        Ok(SubclassBuilder::new(
            self.clone(),
            actual_super_type,
            interfaces,
            ACC_PUBLIC,
            constructor_strategy,
        ))
    }
}
