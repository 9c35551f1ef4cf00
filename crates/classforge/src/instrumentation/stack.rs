//! Composable stack manipulations.
//!
//! A [`StackManipulation`] is a pure value describing a short instruction
//! sequence together with its effect on the operand stack. Appenders build
//! method bodies by composing manipulations and applying them to a
//! [`MethodVisitor`], which yields the stack size the body needs.

use classforge_bytecode::opcodes::{
    ACONST_NULL, ALOAD, ARETURN, BIPUSH, DCONST_0, DCONST_1, DLOAD, DRETURN, DUP, DUP2, FCONST_0,
    FCONST_1, FCONST_2, FLOAD, FRETURN, GETFIELD, GETSTATIC, ICONST_0, ILOAD, INVOKEINTERFACE,
    INVOKESPECIAL, INVOKESTATIC, INVOKEVIRTUAL, IRETURN, LCONST_0, LCONST_1, LLOAD, LRETURN, POP,
    POP2, PUTFIELD, PUTSTATIC, RETURN, SIPUSH,
};
use classforge_bytecode::{LdcValue, MethodVisitor};
use classforge_core::modifier::ModifierReviewable;

use crate::description::{
    FieldDescription, MethodDescription, Primitive, StackSize, TypeDescription,
};
use crate::{Error, Result};

/// Effect of a manipulation on the operand stack.
///
/// `impact` is the net change in slots, `maximal` the highest growth above
/// the starting height reached at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub impact: i32,
    pub maximal: i32,
}

impl Size {
    pub fn new(impact: i32, maximal: i32) -> Self {
        Self { impact, maximal }
    }

    /// A manipulation that only grows or only shrinks the stack.
    fn of(impact: i32) -> Self {
        Self::new(impact, impact.max(0))
    }

    /// Size of running `self` and then `next`.
    pub fn aggregate(self, next: Size) -> Size {
        Size {
            impact: self.impact + next.impact,
            maximal: self.maximal.max(self.impact + next.maximal),
        }
    }
}

/// Category of a local variable slot, selecting the load and return opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableSort {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl VariableSort {
    /// Sort of a value of type `ty`, `None` for `void`.
    pub fn of(ty: &TypeDescription) -> Option<Self> {
        if ty.is_void() {
            return None;
        }
        Some(match ty.primitive() {
            Some(Primitive::Long) => Self::Long,
            Some(Primitive::Float) => Self::Float,
            Some(Primitive::Double) => Self::Double,
            Some(_) => Self::Int,
            None => Self::Reference,
        })
    }

    pub fn size(self) -> StackSize {
        match self {
            Self::Long | Self::Double => StackSize::Double,
            _ => StackSize::Single,
        }
    }

    fn load_opcode(self) -> u8 {
        match self {
            Self::Int => ILOAD,
            Self::Long => LLOAD,
            Self::Float => FLOAD,
            Self::Double => DLOAD,
            Self::Reference => ALOAD,
        }
    }

    fn return_opcode(self) -> u8 {
        match self {
            Self::Int => IRETURN,
            Self::Long => LRETURN,
            Self::Float => FRETURN,
            Self::Double => DRETURN,
            Self::Reference => ARETURN,
        }
    }
}

/// A constant pushed onto the operand stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantLoad {
    Null,
    Int(i32),
    Long(i64),
    /// `float` by bit pattern.
    Float(u32),
    /// `double` by bit pattern.
    Double(u64),
    String(String),
    /// Class literal, by internal name or array descriptor.
    Class(String),
}

impl ConstantLoad {
    fn size(&self) -> StackSize {
        match self {
            Self::Long(_) | Self::Double(_) => StackSize::Double,
            _ => StackSize::Single,
        }
    }

    fn apply(&self, visitor: &mut MethodVisitor) {
        match self {
            Self::Null => visitor.visit_insn(ACONST_NULL),
            Self::Int(value) => match *value {
                -1..=5 => visitor.visit_insn((ICONST_0 as i32 + value) as u8),
                v if i8::try_from(v).is_ok() => visitor.visit_int_insn(BIPUSH, v as i16),
                v if i16::try_from(v).is_ok() => visitor.visit_int_insn(SIPUSH, v as i16),
                v => visitor.visit_ldc_insn(LdcValue::Int(v)),
            },
            Self::Long(0) => visitor.visit_insn(LCONST_0),
            Self::Long(1) => visitor.visit_insn(LCONST_1),
            Self::Long(value) => visitor.visit_ldc_insn(LdcValue::Long(*value)),
            Self::Float(bits) => match f32::from_bits(*bits) {
                v if v == 0.0 && v.is_sign_positive() => visitor.visit_insn(FCONST_0),
                v if v == 1.0 => visitor.visit_insn(FCONST_1),
                v if v == 2.0 => visitor.visit_insn(FCONST_2),
                _ => visitor.visit_ldc_insn(LdcValue::Float(*bits)),
            },
            Self::Double(bits) => match f64::from_bits(*bits) {
                v if v == 0.0 && v.is_sign_positive() => visitor.visit_insn(DCONST_0),
                v if v == 1.0 => visitor.visit_insn(DCONST_1),
                _ => visitor.visit_ldc_insn(LdcValue::Double(*bits)),
            },
            Self::String(value) => visitor.visit_ldc_insn(LdcValue::String(value.clone())),
            Self::Class(name) => visitor.visit_ldc_insn(LdcValue::Class(name.clone())),
        }
    }
}

/// A method call instruction with its resolved stack effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub opcode: u8,
    /// Internal name of the owner the call is linked against.
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub interface: bool,
    /// Slots consumed, receiver included.
    pub arguments: u16,
    /// Slots produced.
    pub returns: u16,
}

/// A field read or write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldAccess {
    pub opcode: u8,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub size: StackSize,
}

impl FieldAccess {
    fn impact(&self) -> i32 {
        let size = self.size.size() as i32;
        match self.opcode {
            GETSTATIC => size,
            PUTSTATIC => -size,
            GETFIELD => size - 1,
            _ => -(size + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackManipulation {
    /// No instructions.
    Trivial,
    /// A manipulation that cannot be expressed. Applying it fails.
    Illegal,
    Compound(Vec<StackManipulation>),
    LoadVariable { sort: VariableSort, index: u16 },
    /// `None` returns `void`.
    Return(Option<VariableSort>),
    Invoke(Invocation),
    Field(FieldAccess),
    Constant(ConstantLoad),
    Duplicate(StackSize),
    Pop(StackSize),
}

impl StackManipulation {
    pub fn compound(parts: impl IntoIterator<Item = StackManipulation>) -> Self {
        Self::Compound(parts.into_iter().collect())
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Self::Illegal => false,
            Self::Compound(parts) => parts.iter().all(Self::is_valid),
            _ => true,
        }
    }

    /// Emit the instructions and return their stack effect.
    pub fn apply(&self, visitor: &mut MethodVisitor) -> Result<Size> {
        let size = match self {
            Self::Trivial => Size::default(),
            Self::Illegal => {
                return Err(Error::illegal_state("cannot apply an illegal stack manipulation"));
            }
            Self::Compound(parts) => {
                let mut size = Size::default();
                for part in parts {
                    size = size.aggregate(part.apply(visitor)?);
                }
                size
            }
            Self::LoadVariable { sort, index } => {
                visitor.visit_var_insn(sort.load_opcode(), *index);
                Size::of(sort.size().size() as i32)
            }
            Self::Return(sort) => match sort {
                Some(sort) => {
                    visitor.visit_insn(sort.return_opcode());
                    Size::of(-(sort.size().size() as i32))
                }
                None => {
                    visitor.visit_insn(RETURN);
                    Size::default()
                }
            },
            Self::Invoke(invocation) => {
                visitor.visit_method_insn(
                    invocation.opcode,
                    &invocation.owner,
                    &invocation.name,
                    &invocation.descriptor,
                    invocation.interface,
                );
                Size::of(invocation.returns as i32 - invocation.arguments as i32)
            }
            Self::Field(access) => {
                visitor.visit_field_insn(
                    access.opcode,
                    &access.owner,
                    &access.name,
                    &access.descriptor,
                );
                Size::of(access.impact())
            }
            Self::Constant(constant) => {
                constant.apply(visitor);
                Size::of(constant.size().size() as i32)
            }
            Self::Duplicate(size) => {
                match size {
                    StackSize::Zero => {}
                    StackSize::Single => visitor.visit_insn(DUP),
                    StackSize::Double => visitor.visit_insn(DUP2),
                }
                Size::of(size.size() as i32)
            }
            Self::Pop(size) => {
                match size {
                    StackSize::Zero => {}
                    StackSize::Single => visitor.visit_insn(POP),
                    StackSize::Double => visitor.visit_insn(POP2),
                }
                Size::of(-(size.size() as i32))
            }
        };
        Ok(size)
    }

    pub fn load_this() -> Self {
        Self::LoadVariable {
            sort: VariableSort::Reference,
            index: 0,
        }
    }

    /// Load a value of type `ty` from local variable `index`.
    pub fn load(ty: &TypeDescription, index: u16) -> Self {
        match VariableSort::of(ty) {
            Some(sort) => Self::LoadVariable { sort, index },
            None => Self::Illegal,
        }
    }

    /// Load every parameter of `method` in declaration order, skipping the
    /// receiver slot of instance methods.
    pub fn load_arguments(method: &MethodDescription) -> Self {
        let mut index: u16 = if method.is_static() { 0 } else { 1 };
        let mut loads = Vec::new();
        for parameter in method.parameter_types() {
            loads.push(Self::load(&parameter, index));
            index += parameter.stack_size().size();
        }
        Self::Compound(loads)
    }

    /// Return a value of type `ty` from the current method.
    pub fn return_of(ty: &TypeDescription) -> Self {
        Self::Return(VariableSort::of(ty))
    }

    /// Invoke `method` with the opcode its kind calls for.
    pub fn invoke(method: &MethodDescription) -> Self {
        let declaring_type = method.declaring_type();
        let opcode = if method.is_static() {
            INVOKESTATIC
        } else if method.is_private() || method.is_constructor() {
            INVOKESPECIAL
        } else if declaring_type.is_interface() {
            INVOKEINTERFACE
        } else {
            INVOKEVIRTUAL
        };
        Self::Invoke(Self::invocation(method, opcode, declaring_type))
    }

    /// Invoke `method` non-virtually, linked against `owner`.
    pub fn invoke_special(method: &MethodDescription, owner: &TypeDescription) -> Self {
        if method.is_static() || method.is_type_initializer() {
            return Self::Illegal;
        }
        Self::Invoke(Self::invocation(method, INVOKESPECIAL, owner))
    }

    fn invocation(method: &MethodDescription, opcode: u8, owner: &TypeDescription) -> Invocation {
        Invocation {
            opcode,
            owner: owner.internal_name(),
            name: method.internal_name().to_string(),
            descriptor: method.descriptor(),
            interface: owner.is_interface(),
            arguments: method.stack_size(),
            returns: method.return_type().stack_size().size(),
        }
    }

    pub fn get_static(field: &FieldDescription) -> Self {
        Self::field_access(field, GETSTATIC)
    }

    pub fn put_static(field: &FieldDescription) -> Self {
        Self::field_access(field, PUTSTATIC)
    }

    pub fn get_field(field: &FieldDescription) -> Self {
        Self::field_access(field, GETFIELD)
    }

    pub fn put_field(field: &FieldDescription) -> Self {
        Self::field_access(field, PUTFIELD)
    }

    fn field_access(field: &FieldDescription, opcode: u8) -> Self {
        if field.is_static() != matches!(opcode, GETSTATIC | PUTSTATIC) {
            return Self::Illegal;
        }
        Self::Field(FieldAccess {
            opcode,
            owner: field.declaring_type().internal_name(),
            name: field.name().to_string(),
            descriptor: field.descriptor(),
            size: field.field_type().stack_size(),
        })
    }

    pub fn duplicate(ty: &TypeDescription) -> Self {
        Self::Duplicate(ty.stack_size())
    }

    /// Discard a value of type `ty`.
    pub fn remove(ty: &TypeDescription) -> Self {
        Self::Pop(ty.stack_size())
    }

    /// The zero value of `ty`: `0`, `0L`, `0f`, `0d` or `null`. Trivial for
    /// `void`.
    pub fn default_value(ty: &TypeDescription) -> Self {
        match VariableSort::of(ty) {
            None => Self::Trivial,
            Some(VariableSort::Int) => Self::Constant(ConstantLoad::Int(0)),
            Some(VariableSort::Long) => Self::Constant(ConstantLoad::Long(0)),
            Some(VariableSort::Float) => Self::Constant(ConstantLoad::Float(0)),
            Some(VariableSort::Double) => Self::Constant(ConstantLoad::Double(0)),
            Some(VariableSort::Reference) => Self::Constant(ConstantLoad::Null),
        }
    }

    pub fn int(value: i32) -> Self {
        Self::Constant(ConstantLoad::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Self::Constant(ConstantLoad::Long(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Constant(ConstantLoad::String(value.into()))
    }

    pub fn class(ty: &TypeDescription) -> Self {
        Self::Constant(ConstantLoad::Class(ty.internal_name()))
    }

    pub fn null() -> Self {
        Self::Constant(ConstantLoad::Null)
    }
}

impl From<Vec<StackManipulation>> for StackManipulation {
    fn from(parts: Vec<StackManipulation>) -> Self {
        Self::Compound(parts)
    }
}
