//! Emits the class image of a compiled instrumented type.

use std::fmt::Debug;
use std::sync::Arc;

use classforge_bytecode::{
    ClassFileVersion, ClassHeader, ClassVisitor, ClassWriter, FieldVisitor, MethodVisitor,
};
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_INTERFACE, ACC_NATIVE, ACC_STATIC, ACC_SUPER, ModifierReviewable,
    TYPE_MODIFIER_MASK,
};

use super::registry::{Compiled, CompiledEntry, CompiledFieldRegistry};
use crate::Result;
use crate::description::{MethodDescription, TYPE_INITIALIZER_NAME, TypeDescription};
use crate::instrumentation::{
    ByteCodeAppender, CodeSize, LoadedTypeInitializer, MethodAttributeAppender, StackManipulation,
    TypeAttributeAppender,
};
use crate::matcher::MethodMatcher;

/// Wraps the class visitor the writer emits through, for example to
/// rewrite or record the produced class.
pub trait ClassVisitorWrapper: Debug + Send + Sync {
    fn wrap<'a>(&self, visitor: Box<dyn ClassVisitor + 'a>) -> Box<dyn ClassVisitor + 'a>;
}

/// Output of a [`TypeWriter`].
#[derive(Debug, Clone)]
pub struct DynamicType {
    pub type_description: TypeDescription,
    pub bytes: Vec<u8>,
    pub loaded_type_initializer: LoadedTypeInitializer,
}

pub struct TypeWriter<'a> {
    pub compiled: &'a Compiled,
    pub fields: &'a CompiledFieldRegistry,
    pub type_attribute_appender: &'a TypeAttributeAppender,
    /// Inherited methods this matcher accepts are never overridden.
    pub ignored: &'a MethodMatcher,
    pub class_file_version: ClassFileVersion,
    pub class_visitor_wrappers: &'a [Arc<dyn ClassVisitorWrapper>],
}

impl TypeWriter<'_> {
    /// The methods written into the class, in lookup order.
    ///
    /// A method is written when it is declared by the instrumented type, or
    /// when it is overridable and not ignored, and its entry is not `Skip`.
    pub fn write_set(&self) -> Vec<(&MethodDescription, &CompiledEntry)> {
        let instrumented_type = self.compiled.instrumented_type();
        self.compiled
            .invokable_methods()
            .iter()
            .filter(|m| {
                m.declaring_type() == instrumented_type
                    || (m.is_overridable() && !self.ignored.matches(m))
            })
            .map(|m| (m, self.compiled.entry_for(m)))
            .filter(|(_, entry)| entry.is_defined())
            .collect()
    }

    pub fn make(&self) -> Result<DynamicType> {
        let instrumented_type = self.compiled.instrumented_type();
        let mut writer = ClassWriter::new();
        let methods = {
            let mut visitor: Box<dyn ClassVisitor + '_> = Box::new(&mut writer);
            for wrapper in self.class_visitor_wrappers {
                visitor = wrapper.wrap(visitor);
            }
            self.write(visitor.as_mut(), instrumented_type)?
        };
        let bytes = writer.to_bytes()?;
        tracing::debug!(
            ty = instrumented_type.name(),
            version = %self.class_file_version,
            bytes = bytes.len(),
            methods,
            "wrote class"
        );
        Ok(DynamicType {
            type_description: instrumented_type.clone(),
            bytes,
            loaded_type_initializer: self.compiled.loaded_type_initializer().clone(),
        })
    }

    /// Drive `visitor` through the whole class and return the number of
    /// methods written.
    fn write(&self, visitor: &mut dyn ClassVisitor, ty: &TypeDescription) -> Result<usize> {
        let mut access = ty.modifiers() & TYPE_MODIFIER_MASK & !ACC_STATIC;
        if access & ACC_INTERFACE == 0 {
            access |= ACC_SUPER;
        }
        visitor.visit(ClassHeader {
            version: self.class_file_version,
            access,
            name: ty.internal_name(),
            super_name: ty.super_type().map(|s| s.internal_name()),
            interfaces: ty.interfaces().iter().map(TypeDescription::internal_name).collect(),
        });
        self.type_attribute_appender.apply(visitor, ty);

        for field in ty.declared_fields() {
            let mut field_visitor =
                FieldVisitor::new(field.modifiers(), field.name(), field.descriptor());
            self.fields.target(&field).apply(&mut field_visitor, &field);
            visitor.visit_field(field_visitor.visit_end());
        }

        let mut methods = 0;
        for (method, entry) in self.write_set() {
            if let CompiledEntry::Define {
                appender,
                attribute_appender,
            } = entry
            {
                let method_visitor =
                    self.write_method(method, appender.as_ref(), attribute_appender)?;
                visitor.visit_method(method_visitor.visit_end());
                methods += 1;
            }
        }

        let type_initializer = self.compiled.type_initializer();
        if type_initializer.is_defined() {
            let mut method_visitor =
                MethodVisitor::new(ACC_STATIC, TYPE_INITIALIZER_NAME, "()V", Vec::new());
            let size = type_initializer.apply(&mut method_visitor)?;
            StackManipulation::Return(None).apply(&mut method_visitor)?;
            method_visitor.visit_maxs(size.maximal.max(0) as u16, 0);
            visitor.visit_method(method_visitor.visit_end());
            methods += 1;
        }

        visitor.visit_end();
        Ok(methods)
    }

    fn write_method(
        &self,
        method: &MethodDescription,
        appender: &dyn ByteCodeAppender,
        attribute_appender: &MethodAttributeAppender,
    ) -> Result<MethodVisitor> {
        let applies_code = appender.applies_code();
        let access = if applies_code {
            method.modifiers() & !(ACC_ABSTRACT | ACC_NATIVE)
        } else {
            (method.modifiers() & !ACC_NATIVE) | ACC_ABSTRACT
        };
        let exceptions = method
            .exception_types()
            .iter()
            .map(TypeDescription::internal_name)
            .collect();
        let mut visitor =
            MethodVisitor::new(access, method.internal_name(), method.descriptor(), exceptions);
        attribute_appender.apply(&mut visitor, method);
        if applies_code {
            let CodeSize {
                operand_stack,
                local_variables,
            } = appender.apply(&mut visitor, method)?;
            visitor.visit_maxs(operand_stack, local_variables);
        }
        tracing::trace!(method = %method, access, applies_code, "wrote method");
        Ok(visitor)
    }
}
