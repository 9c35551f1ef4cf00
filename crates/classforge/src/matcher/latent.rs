use std::sync::Arc;

use super::{MethodMatcher, is};
use crate::description::{MethodDescription, MethodToken, TypeDescription};

/// A method matcher that may depend on the instrumented type, which is only
/// known once a build starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LatentMatcher {
    Resolved(MethodMatcher),
    /// Exactly the method with this shape declared by the instrumented type.
    Declared(MethodToken),
}

impl LatentMatcher {
    pub fn resolve(&self, instrumented_type: &TypeDescription) -> MethodMatcher {
        match self {
            Self::Resolved(matcher) => matcher.clone(),
            Self::Declared(token) => is(MethodDescription::new(
                instrumented_type.clone(),
                Arc::new(token.clone()),
            )),
        }
    }
}

impl From<MethodMatcher> for LatentMatcher {
    fn from(matcher: MethodMatcher) -> Self {
        Self::Resolved(matcher)
    }
}
