//! Method lookup.
//!
//! Collects the methods that can be invoked on an instance of a type and
//! records where each one comes from. The order is: methods declared by the
//! type, then methods of the superclass chain (nearest first), then methods
//! contributed by interfaces.

use std::collections::HashSet;

use classforge_core::ModifierReviewable;
use indexmap::IndexMap;

use crate::description::{MethodDescription, TypeDescription};

/// Where an invokable method is implemented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Declared by the looked-up type itself.
    Declared,
    /// Implemented by a class on the superclass chain.
    Inherited(TypeDescription),
    /// Abstract in the class on the superclass chain that declares it.
    Abstract(TypeDescription),
    /// The single most specific default implementation among the
    /// interfaces.
    Default(TypeDescription),
    /// Declared by interfaces without a usable default implementation.
    Interface,
}

impl Provenance {
    /// Whether a super call can reach an implementation.
    pub fn is_implemented(&self) -> bool {
        matches!(self, Self::Inherited(_) | Self::Default(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub method: MethodDescription,
    pub provenance: Provenance,
}

/// Result of a lookup, keyed by method signature.
#[derive(Debug, Clone, Default)]
pub struct MethodLookup {
    invokable: IndexMap<String, LookupEntry>,
    inherited: IndexMap<String, LookupEntry>,
}

impl MethodLookup {
    /// Every invokable method, declared ones first.
    pub fn invokable(&self) -> impl Iterator<Item = &LookupEntry> {
        self.invokable.values()
    }

    pub fn invokable_methods(&self) -> Vec<MethodDescription> {
        self.invokable.values().map(|e| e.method.clone()).collect()
    }

    /// The method a call with `signature` resolves to.
    pub fn get(&self, signature: &str) -> Option<&LookupEntry> {
        self.invokable.get(signature)
    }

    /// The method `signature` resolves to when the looked-up type's own
    /// declarations are ignored, i.e. the target of a super call.
    pub fn inherited(&self, signature: &str) -> Option<&LookupEntry> {
        self.inherited.get(signature)
    }
}

/// Resolves invokable methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodLookupEngine {
    supports_default_methods: bool,
}

impl MethodLookupEngine {
    pub fn new(supports_default_methods: bool) -> Self {
        Self {
            supports_default_methods,
        }
    }

    pub fn process(&self, ty: &TypeDescription) -> MethodLookup {
        let mut lookup = MethodLookup::default();
        for method in ty.declared_methods() {
            lookup.invokable.entry(method.signature()).or_insert(LookupEntry {
                method,
                provenance: Provenance::Declared,
            });
        }

        // A signature met on the class chain hides the same signature further
        // up and on every interface, even when the hiding method is not
        // visible or not overridable.
        let mut seen = HashSet::new();
        for class in ty.super_classes() {
            for method in class.declared_methods() {
                if !method.is_method() || !seen.insert(method.signature()) {
                    continue;
                }
                if !method.is_overridable() || !method.is_visible_to(ty) {
                    continue;
                }
                let provenance = if method.is_abstract() {
                    Provenance::Abstract(class.clone())
                } else {
                    Provenance::Inherited(class.clone())
                };
                lookup.inherited.insert(
                    method.signature(),
                    LookupEntry { method, provenance },
                );
            }
        }

        let mut candidates: IndexMap<String, Vec<MethodDescription>> = IndexMap::new();
        for interface in ty.all_interfaces() {
            for method in interface.declared_methods() {
                if !method.is_method() || method.is_static() || method.is_private() {
                    continue;
                }
                if seen.contains(&method.signature()) {
                    continue;
                }
                candidates.entry(method.signature()).or_default().push(method);
            }
        }
        for (signature, methods) in candidates {
            let entry = self.most_specific(methods);
            lookup.inherited.insert(signature, entry);
        }

        for (signature, entry) in &lookup.inherited {
            if !lookup.invokable.contains_key(signature) {
                lookup.invokable.insert(signature.clone(), entry.clone());
            }
        }
        tracing::trace!(
            ty = ty.name(),
            invokable = lookup.invokable.len(),
            "method lookup"
        );
        lookup
    }

    /// Drop every candidate whose interface is extended by another
    /// candidate's interface. A single remaining default method is the
    /// implementation; anything else leaves the method abstract.
    fn most_specific(&self, candidates: Vec<MethodDescription>) -> LookupEntry {
        let specific: Vec<&MethodDescription> = candidates
            .iter()
            .filter(|m| {
                !candidates.iter().any(|other| {
                    other.declaring_type() != m.declaring_type()
                        && other.declaring_type().is_assignable_to(m.declaring_type())
                })
            })
            .collect();
        let defaults: Vec<&&MethodDescription> = specific
            .iter()
            .filter(|m| self.supports_default_methods && !m.is_abstract())
            .collect();
        match (defaults.as_slice(), specific.len()) {
            ([method], 1) => LookupEntry {
                method: (**method).clone(),
                provenance: Provenance::Default(method.declaring_type().clone()),
            },
            _ => LookupEntry {
                method: specific
                    .first()
                    .map_or_else(|| candidates[0].clone(), |m| (*m).clone()),
                provenance: Provenance::Interface,
            },
        }
    }
}
