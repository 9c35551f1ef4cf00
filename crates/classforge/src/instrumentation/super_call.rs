use std::sync::Arc;

use classforge_bytecode::MethodVisitor;

use super::stack::StackManipulation;
use super::{ByteCodeAppender, CodeSize, Instrumentation};
use crate::description::MethodDescription;
use crate::scaffold::InstrumentationTarget;
use crate::{Error, Result};

/// Calls the super implementation of the instrumented method with the
/// method's own arguments and returns its result.
///
/// For constructors this is the super constructor with the same descriptor.
/// Building fails when no such implementation is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuperMethodCall;

impl Instrumentation for SuperMethodCall {
    fn appender(&self, target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>> {
        Ok(Arc::new(SuperCallAppender {
            target: target.clone(),
        }))
    }
}

#[derive(Debug)]
struct SuperCallAppender {
    target: InstrumentationTarget,
}

impl ByteCodeAppender for SuperCallAppender {
    fn apply(&self, visitor: &mut MethodVisitor, method: &MethodDescription) -> Result<CodeSize> {
        let super_call = self.target.invoke_super(method);
        if !super_call.is_valid() {
            return Err(Error::illegal_state(format!(
                "no super implementation of {method} reachable from {}",
                self.target.instrumented_type().name()
            )));
        }
        let body = StackManipulation::compound([
            StackManipulation::load_this(),
            StackManipulation::load_arguments(method),
            super_call,
            StackManipulation::return_of(&method.return_type()),
        ]);
        let size = body.apply(visitor)?;
        Ok(CodeSize::of(size, method))
    }
}
