//! Element matchers.
//!
//! A closed algebra of predicates over types, methods, fields and
//! annotations. Leaves are tagged variants with structural equality, and
//! [`Junction`] combines them with `and`, `or` and `not`. Conjunctions and
//! disjunctions are flattened into ordered sets, so expressions that differ
//! only in grouping or operand order compare equal.
//!
//! Matchers are built with the free functions re-exported here:
//!
//! ```ignore
//! let matcher = named("toString").and(takes_arguments_count(0));
//! ```

mod factory;
mod latent;
mod leaf;
mod string;

#[cfg(test)]
mod factory_tests;

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Not;

pub use factory::*;
pub use latent::LatentMatcher;
pub use leaf::{
    AnnotationLeaf, ElementKind, ElementLeaf, FieldLeaf, MethodKind, MethodLeaf, ModifierMatch,
    TypeLeaf, TypeListLeaf,
};
pub use string::{Pattern, StringMatcher};

use crate::description::{
    AnnotationDescription, FieldDescription, MethodDescription, TypeDescription,
};

pub type TypeMatcher = Junction<TypeLeaf>;
pub type MethodMatcher = Junction<MethodLeaf>;
pub type FieldMatcher = Junction<FieldLeaf>;
pub type AnnotationMatcher = Junction<AnnotationLeaf>;
pub type TypeListMatcher = Junction<TypeListLeaf>;

/// A pure predicate over `T`.
pub trait ElementMatcher<T: ?Sized> {
    fn matches(&self, target: &T) -> bool;
}

/// A primitive predicate a [`Junction`] is built from.
pub trait Leaf: Clone + Debug + Ord + Hash {
    type Target: ?Sized;

    fn matches(&self, target: &Self::Target) -> bool;
}

/// A matcher expression over leaves of type `L`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Junction<L> {
    Bool(bool),
    Leaf(L),
    Not(Box<Junction<L>>),
    And(BTreeSet<Junction<L>>),
    Or(BTreeSet<Junction<L>>),
}

impl<L: Leaf> Junction<L> {
    pub fn matches(&self, target: &L::Target) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Leaf(leaf) => leaf.matches(target),
            Self::Not(inner) => !inner.matches(target),
            Self::And(all) => all.iter().all(|m| m.matches(target)),
            Self::Or(any) => any.iter().any(|m| m.matches(target)),
        }
    }

    pub fn and(self, other: Self) -> Self {
        let mut operands = BTreeSet::new();
        for matcher in [self, other] {
            match matcher {
                Self::Bool(true) => {}
                Self::Bool(false) => return Self::Bool(false),
                Self::And(inner) => operands.extend(inner),
                matcher => {
                    operands.insert(matcher);
                }
            }
        }
        Self::collapse(operands, true)
    }

    pub fn or(self, other: Self) -> Self {
        let mut operands = BTreeSet::new();
        for matcher in [self, other] {
            match matcher {
                Self::Bool(false) => {}
                Self::Bool(true) => return Self::Bool(true),
                Self::Or(inner) => operands.extend(inner),
                matcher => {
                    operands.insert(matcher);
                }
            }
        }
        Self::collapse(operands, false)
    }

    fn collapse(mut operands: BTreeSet<Self>, conjunction: bool) -> Self {
        if operands.len() > 1 {
            return if conjunction {
                Self::And(operands)
            } else {
                Self::Or(operands)
            };
        }
        operands.pop_first().unwrap_or(Self::Bool(conjunction))
    }
}

impl<L: Leaf> Not for Junction<L> {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Bool(value) => Self::Bool(!value),
            Self::Not(inner) => *inner,
            matcher => Self::Not(Box::new(matcher)),
        }
    }
}

impl<L: Leaf> From<L> for Junction<L> {
    fn from(leaf: L) -> Self {
        Self::Leaf(leaf)
    }
}

impl<L: Leaf> ElementMatcher<L::Target> for Junction<L> {
    fn matches(&self, target: &L::Target) -> bool {
        Junction::matches(self, target)
    }
}

/// Values that can be matched by identity with [`is`].
pub trait Identity: Sized {
    type Leaf: Leaf;

    fn identity(self) -> Self::Leaf;
}

impl Identity for TypeDescription {
    type Leaf = TypeLeaf;

    fn identity(self) -> TypeLeaf {
        TypeLeaf::Is(self)
    }
}

impl Identity for MethodDescription {
    type Leaf = MethodLeaf;

    fn identity(self) -> MethodLeaf {
        MethodLeaf::Is(self)
    }
}

impl Identity for FieldDescription {
    type Leaf = FieldLeaf;

    fn identity(self) -> FieldLeaf {
        FieldLeaf::Is(self)
    }
}

impl Identity for AnnotationDescription {
    type Leaf = AnnotationLeaf;

    fn identity(self) -> AnnotationLeaf {
        AnnotationLeaf::Is(self)
    }
}
