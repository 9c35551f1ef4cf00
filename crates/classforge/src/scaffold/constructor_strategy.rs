use std::sync::Arc;

use classforge_core::ModifierReviewable;

use super::registry::MethodRegistry;
use crate::description::{MethodToken, TypeDescription};
use crate::instrumentation::{MethodAttributeAppender, SuperMethodCall};
use crate::matcher::is_constructor;
use crate::{Error, Result};

/// Decides which constructors a subclass declares. Every constructor it
/// creates calls the superclass constructor with the same arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructorStrategy {
    NoConstructors,
    /// The superclass's visible no-argument constructor, with its modifiers
    /// and exceptions.
    #[default]
    DefaultConstructor,
    /// Every superclass constructor visible to the subclass, with its
    /// modifiers and exceptions.
    ImitateSuperType,
    /// Every public superclass constructor.
    ImitateSuperTypePublic,
}

impl ConstructorStrategy {
    /// Constructors to declare on `instrumented_type`.
    pub fn extract_constructors(
        &self,
        instrumented_type: &TypeDescription,
    ) -> Result<Vec<MethodToken>> {
        if *self == Self::NoConstructors {
            return Ok(Vec::new());
        }
        let super_type = instrumented_type.super_type().ok_or_else(|| {
            Error::illegal_state(format!("{} has no super type", instrumented_type.name()))
        })?;
        let constructors = super_type
            .declared_methods()
            .into_iter()
            .filter(|m| m.is_constructor() && m.is_visible_to(instrumented_type));

        match self {
            Self::NoConstructors => Ok(Vec::new()),
            Self::DefaultConstructor => {
                let mut constructors = constructors;
                let default = constructors
                    .find(|c| c.parameter_types().is_empty())
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "visible no-argument constructor of {}",
                            super_type.name()
                        ))
                    })?;
                Ok(vec![imitate(default.token())])
            }
            Self::ImitateSuperType => Ok(constructors.map(|c| imitate(c.token())).collect()),
            Self::ImitateSuperTypePublic => Ok(constructors
                .filter(|c| c.is_public())
                .map(|c| imitate(c.token()))
                .collect()),
        }
    }

    /// Give the constructors a super call. The entry goes first, so no other
    /// entry can claim a constructor this strategy created.
    pub fn inject(
        &self,
        registry: MethodRegistry,
        attribute_appender: MethodAttributeAppender,
    ) -> MethodRegistry {
        match self {
            Self::NoConstructors => registry,
            _ => registry.prepend(
                is_constructor(),
                Arc::new(SuperMethodCall),
                attribute_appender,
            ),
        }
    }
}

fn imitate(token: &MethodToken) -> MethodToken {
    MethodToken::constructor()
        .parameters(token.parameter_type_names().iter().cloned())
        .throws(token.exception_type_names().iter().cloned())
        .modifiers(token.modifiers)
}
