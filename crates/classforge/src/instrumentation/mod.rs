//! Method implementations.
//!
//! An [`Instrumentation`] is asked twice during a build: first to
//! [`prepare`](Instrumentation::prepare) the instrumented type (adding
//! fields or initializers it relies on), then for a [`ByteCodeAppender`]
//! bound to the final [`InstrumentationTarget`]. The appender writes the
//! body of every method the instrumentation was registered for.

mod attribute;
mod fixed_value;
mod initializer;
pub mod stack;
mod stub;
mod super_call;


use std::fmt::Debug;
use std::sync::Arc;

use classforge_bytecode::MethodVisitor;

pub use attribute::{FieldAttributeAppender, MethodAttributeAppender, TypeAttributeAppender};
pub use fixed_value::{ConstantValue, FixedValue};
pub use initializer::{LoadedType, LoadedTypeInitializer, TypeInitializer};
pub use stack::StackManipulation;
pub use stub::StubMethod;
pub use super_call::SuperMethodCall;

use crate::Result;
use crate::description::MethodDescription;
use crate::scaffold::{InstrumentationTarget, InstrumentedType};

/// Implements the methods it is registered for.
pub trait Instrumentation: Debug + Send + Sync {
    /// Add whatever the implementation needs to the instrumented type.
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType> {
        Ok(instrumented_type)
    }

    fn appender(&self, target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>>;
}

/// Writes one method body.
pub trait ByteCodeAppender: Debug + Send + Sync {
    /// `false` when the method is emitted without code, as an abstract
    /// declaration.
    fn applies_code(&self) -> bool {
        true
    }

    fn apply(&self, visitor: &mut MethodVisitor, method: &MethodDescription) -> Result<CodeSize>;
}

/// Operand stack and local variable slots a method body needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeSize {
    pub operand_stack: u16,
    pub local_variables: u16,
}

impl CodeSize {
    pub fn new(operand_stack: u16, local_variables: u16) -> Self {
        Self {
            operand_stack,
            local_variables,
        }
    }

    /// Size of a body made of `stack` in `method`'s frame.
    pub fn of(stack: stack::Size, method: &MethodDescription) -> Self {
        Self::new(stack.maximal.max(0) as u16, method.stack_size())
    }

    pub fn merge(self, other: CodeSize) -> CodeSize {
        CodeSize {
            operand_stack: self.operand_stack.max(other.operand_stack),
            local_variables: self.local_variables.max(other.local_variables),
        }
    }
}
