use std::sync::Arc;

use classforge_bytecode::MethodVisitor;

use super::stack::StackManipulation;
use super::{ByteCodeAppender, CodeSize, Instrumentation};
use crate::Result;
use crate::description::MethodDescription;
use crate::scaffold::InstrumentationTarget;

/// Returns the zero value of the method's return type and ignores its
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StubMethod;

impl Instrumentation for StubMethod {
    fn appender(&self, _target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>> {
        Ok(Arc::new(StubMethod))
    }
}

impl ByteCodeAppender for StubMethod {
    fn apply(&self, visitor: &mut MethodVisitor, method: &MethodDescription) -> Result<CodeSize> {
        let return_type = method.return_type();
        let body = StackManipulation::compound([
            StackManipulation::default_value(&return_type),
            StackManipulation::return_of(&return_type),
        ]);
        Ok(CodeSize::of(body.apply(visitor)?, method))
    }
}
