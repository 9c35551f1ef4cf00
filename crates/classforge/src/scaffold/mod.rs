//! The machinery between a builder and a class image.
//!
//! [`InstrumentedType`] is the type under construction. A
//! [`MethodRegistry`] maps methods to instrumentations, the
//! [`MethodLookupEngine`] finds every method the type can invoke, and the
//! [`TypeWriter`] turns the compiled registry into bytes.

mod constructor_strategy;
mod instrumented_type;
mod lookup;
mod registry;
mod target;
mod writer;

#[cfg(test)]
mod constructor_strategy_tests;
#[cfg(test)]
mod registry_tests;

pub use constructor_strategy::ConstructorStrategy;
pub use instrumented_type::InstrumentedType;
pub use lookup::{LookupEntry, MethodLookup, MethodLookupEngine, Provenance};
pub use registry::{
    Compiled, CompiledEntry, CompiledFieldRegistry, FieldRegistry, MethodRegistry, Prepared,
};
pub use target::{
    InstrumentationTarget, OriginTypeIdentifier, SubclassTargetFactory, TargetFactory,
};
pub use writer::{ClassVisitorWrapper, DynamicType, TypeWriter};
