#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Runtime subclass synthesis for the JVM class-file format.
//!
//! A [`ClassForge`] configuration hands out [`SubclassBuilder`]s. A builder
//! collects declarations and interception rules, then `make` runs the
//! pipeline:
//!
//! 1. the constructor strategy nominates constructors and prepends their entry
//! 2. the method registry lets each instrumentation prepare the instrumented type
//! 3. the lookup engine resolves every invokable method with its provenance
//! 4. the registry is compiled against the instrumentation target
//! 5. the type writer emits the class image
//!
//! Existing runtime types are described through a [`TypePool`].

pub mod builder;
pub mod description;
pub mod instrumentation;
pub mod matcher;
pub mod scaffold;

#[cfg(test)]
mod test_utils;

pub use builder::{
    ClassForge, LoadedClass, MethodDefinition, NamingStrategy, SubclassBuilder, Unloaded,
};
pub use description::{
    AnnotationDescription, FieldDescription, MethodDescription, TypeDefinition, TypeDescription,
    TypePool,
};
pub use scaffold::ConstructorStrategy;

pub use classforge_bytecode::ClassFileVersion;

/// Errors raised while describing, building or emitting a type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A builder-time contract was violated by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant does not hold.
    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    ClassFile(#[from] classforge_bytecode::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}

impl From<classforge_core::ModifierError> for Error {
    fn from(err: classforge_core::ModifierError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
