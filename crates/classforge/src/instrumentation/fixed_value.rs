use std::fmt;
use std::sync::Arc;

use classforge_bytecode::{ClassFileVersion, MethodVisitor};
use classforge_core::modifier::{ACC_PRIVATE, ACC_STATIC, ACC_SYNTHETIC};

use super::initializer::LoadedTypeInitializer;
use super::stack::{ConstantLoad, StackManipulation};
use super::{ByteCodeAppender, CodeSize, Instrumentation};
use crate::builder::random_suffix;
use crate::description::{FieldToken, MethodDescription, Primitive, TypeDescription, lang};
use crate::scaffold::{InstrumentationTarget, InstrumentedType};
use crate::{Error, Result};

/// A value a generated method can return without computing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    String(String),
    /// A class literal.
    Type(TypeDescription),
}

impl ConstantValue {
    /// Whether the value may be stored in a slot of type `target`.
    pub fn is_assignable_to(&self, target: &TypeDescription) -> bool {
        match self {
            Self::Null => !target.is_primitive(),
            Self::Boolean(_) => target.primitive() == Some(Primitive::Boolean),
            Self::Int(_) => target.primitive() == Some(Primitive::Int),
            Self::Long(_) => target.primitive() == Some(Primitive::Long),
            Self::String(_) => {
                !target.is_primitive() && target.resolve(lang::STRING).is_assignable_to(target)
            }
            Self::Type(_) => {
                !target.is_primitive() && target.resolve(lang::CLASS).is_assignable_to(target)
            }
        }
    }

    fn load(&self) -> StackManipulation {
        StackManipulation::Constant(match self {
            Self::Null => ConstantLoad::Null,
            Self::Boolean(value) => ConstantLoad::Int(i32::from(*value)),
            Self::Int(value) => ConstantLoad::Int(*value),
            Self::Long(value) => ConstantLoad::Long(*value),
            Self::String(value) => ConstantLoad::String(value.clone()),
            Self::Type(ty) => ConstantLoad::Class(ty.internal_name()),
        })
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}L"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Type(ty) => write!(f, "{}.class", ty.name()),
        }
    }
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for ConstantValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for ConstantValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<TypeDescription> for ConstantValue {
    fn from(value: TypeDescription) -> Self {
        Self::Type(value)
    }
}

/// Returns the same value from every method it implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedValue {
    /// Loaded from the constant pool.
    Constant(ConstantValue),
    /// Held by a synthetic static field that is populated once the type is
    /// loaded.
    Reference {
        value: ConstantValue,
        field_name: String,
        field_type: TypeDescription,
    },
}

impl FixedValue {
    pub fn value(value: impl Into<ConstantValue>) -> Self {
        Self::Constant(value.into())
    }

    /// Return `value` through a static field of type `field_type`.
    pub fn reference(
        value: impl Into<ConstantValue>,
        field_type: &TypeDescription,
    ) -> Result<Self> {
        let value = value.into();
        if field_type.is_primitive() || !value.is_assignable_to(field_type) {
            return Err(Error::invalid(format!(
                "{value} cannot be held by a field of type {}",
                field_type.name()
            )));
        }
        Ok(Self::Reference {
            value,
            field_name: format!("fixedValue${}", random_suffix()),
            field_type: field_type.clone(),
        })
    }
}

impl Instrumentation for FixedValue {
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType> {
        match self {
            Self::Constant(_) => Ok(instrumented_type),
            Self::Reference {
                value,
                field_name,
                field_type,
            } => {
                let field = FieldToken::new(field_name.as_str(), field_type.name())
                    .modifiers(ACC_PRIVATE | ACC_STATIC | ACC_SYNTHETIC);
                let initializer = LoadedTypeInitializer::ForStaticField {
                    field_name: field_name.clone(),
                    value: value.clone(),
                };
                Ok(instrumented_type
                    .with_field(field)?
                    .with_initializer(initializer))
            }
        }
    }

    fn appender(&self, target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>> {
        let (load, value_type) = match self {
            Self::Constant(value) => {
                if matches!(value, ConstantValue::Type(_))
                    && !target.class_file_version().supports_class_constants()
                {
                    return Err(Error::Unsupported(format!(
                        "class constants require class file version {}",
                        ClassFileVersion::JAVA_V5
                    )));
                }
                (value.load(), ValueType::Constant(value.clone()))
            }
            Self::Reference {
                field_name,
                field_type,
                ..
            } => {
                let instrumented_type = target.instrumented_type();
                let field = instrumented_type
                    .declared_fields()
                    .into_iter()
                    .find(|field| field.name() == field_name)
                    .ok_or_else(|| {
                        Error::illegal_state(format!(
                            "field {field_name} was not added to {}",
                            instrumented_type.name()
                        ))
                    })?;
                (
                    StackManipulation::get_static(&field),
                    ValueType::Field(field_type.clone()),
                )
            }
        };
        Ok(Arc::new(FixedValueAppender { load, value_type }))
    }
}

#[derive(Debug)]
enum ValueType {
    Constant(ConstantValue),
    Field(TypeDescription),
}

#[derive(Debug)]
struct FixedValueAppender {
    load: StackManipulation,
    value_type: ValueType,
}

impl ByteCodeAppender for FixedValueAppender {
    fn apply(&self, visitor: &mut MethodVisitor, method: &MethodDescription) -> Result<CodeSize> {
        let return_type = method.return_type();
        let assignable = !return_type.is_void()
            && match &self.value_type {
                ValueType::Constant(value) => value.is_assignable_to(&return_type),
                ValueType::Field(field_type) => field_type.is_assignable_to(&return_type),
            };
        if !assignable {
            return Err(Error::invalid(format!(
                "fixed value cannot be returned from {method}"
            )));
        }
        let body = StackManipulation::compound([
            self.load.clone(),
            StackManipulation::return_of(&return_type),
        ]);
        Ok(CodeSize::of(body.apply(visitor)?, method))
    }
}
