use std::fmt;

use classforge_bytecode::MethodVisitor;

use super::stack::{Size, StackManipulation};
use super::ConstantValue;
use crate::Result;

/// A runtime type the load-time initializers act on.
pub trait LoadedType {
    fn name(&self) -> &str;

    fn set_static_field(&mut self, name: &str, value: ConstantValue) -> Result<()>;
}

/// Work done on a generated type right after it is loaded, such as
/// populating static fields with values that cannot be expressed as
/// class-file constants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadedTypeInitializer {
    #[default]
    NoOp,
    ForStaticField {
        field_name: String,
        value: ConstantValue,
    },
    Compound(Vec<LoadedTypeInitializer>),
}

impl LoadedTypeInitializer {
    pub fn on_load(&self, ty: &mut dyn LoadedType) -> Result<()> {
        match self {
            Self::NoOp => Ok(()),
            Self::ForStaticField { field_name, value } => {
                tracing::trace!(ty = ty.name(), field_name, "setting static field");
                ty.set_static_field(field_name, value.clone())
            }
            Self::Compound(all) => all.iter().try_for_each(|init| init.on_load(ty)),
        }
    }

    /// Whether `on_load` has any effect.
    pub fn is_alive(&self) -> bool {
        match self {
            Self::NoOp => false,
            Self::ForStaticField { .. } => true,
            Self::Compound(all) => all.iter().any(Self::is_alive),
        }
    }

    /// Run `self`, then `other`. Dead initializers are dropped.
    pub fn compound(self, other: LoadedTypeInitializer) -> Self {
        let mut all = Vec::new();
        for init in [self, other] {
            match init {
                Self::NoOp => {}
                Self::Compound(inner) => all.extend(inner),
                init => all.push(init),
            }
        }
        match all.len() {
            0 => Self::NoOp,
            1 => all.pop().unwrap_or_default(),
            _ => Self::Compound(all),
        }
    }
}

/// Code contributed to the generated type's `<clinit>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeInitializer {
    body: Vec<StackManipulation>,
}

impl TypeInitializer {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_defined(&self) -> bool {
        !self.body.is_empty()
    }

    pub fn append(mut self, manipulation: StackManipulation) -> Self {
        self.body.push(manipulation);
        self
    }

    pub fn expand(mut self, other: TypeInitializer) -> Self {
        self.body.extend(other.body);
        self
    }

    /// Emit the initializer body, without the trailing `return`.
    pub fn apply(&self, visitor: &mut MethodVisitor) -> Result<Size> {
        let mut size = Size::default();
        for manipulation in &self.body {
            size = size.aggregate(manipulation.apply(visitor)?);
        }
        Ok(size)
    }
}

impl fmt::Display for LoadedTypeInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("no-op"),
            Self::ForStaticField { field_name, value } => write!(f, "{field_name} = {value}"),
            Self::Compound(all) => {
                for (i, init) in all.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{init}")?;
                }
                Ok(())
            }
        }
    }
}
