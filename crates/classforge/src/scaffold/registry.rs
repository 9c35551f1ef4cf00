//! Method and field registries.
//!
//! The method registry is an ordered list of (matcher, instrumentation,
//! attribute appender) entries. The first entry whose matcher accepts a
//! method decides how that method is implemented. Compilation happens in
//! two steps: [`MethodRegistry::prepare`] lets every instrumentation
//! extend the instrumented type, then [`Prepared::compile`] assigns an
//! appender to each invokable method.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::instrumented_type::InstrumentedType;
use super::lookup::{MethodLookup, MethodLookupEngine};
use super::target::{InstrumentationTarget, TargetFactory};
use crate::Result;
use crate::description::{FieldDescription, MethodDescription, TypeDescription};
use crate::instrumentation::{
    ByteCodeAppender, FieldAttributeAppender, Instrumentation, LoadedTypeInitializer,
    MethodAttributeAppender, TypeInitializer,
};
use crate::matcher::{LatentMatcher, MethodMatcher};

#[derive(Debug, Clone)]
struct Entry {
    matcher: LatentMatcher,
    instrumentation: Arc<dyn Instrumentation>,
    attribute_appender: MethodAttributeAppender,
}

#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    entries: Vec<Entry>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry with the lowest priority.
    pub fn append(
        mut self,
        matcher: impl Into<LatentMatcher>,
        instrumentation: Arc<dyn Instrumentation>,
        attribute_appender: MethodAttributeAppender,
    ) -> Self {
        self.entries.push(Entry {
            matcher: matcher.into(),
            instrumentation,
            attribute_appender,
        });
        self
    }

    /// Add an entry with the highest priority.
    pub fn prepend(
        mut self,
        matcher: impl Into<LatentMatcher>,
        instrumentation: Arc<dyn Instrumentation>,
        attribute_appender: MethodAttributeAppender,
    ) -> Self {
        self.entries.insert(
            0,
            Entry {
                matcher: matcher.into(),
                instrumentation,
                attribute_appender,
            },
        );
        self
    }

    /// Put every entry of `other` before the entries of `self`, keeping
    /// their order.
    pub fn prepend_all(mut self, other: MethodRegistry) -> Self {
        let mut entries = other.entries;
        entries.append(&mut self.entries);
        self.entries = entries;
        self
    }

    /// Let each distinct instrumentation prepare the instrumented type, in
    /// entry order, and resolve the latent matchers against the result.
    ///
    /// An instrumentation registered under several entries is prepared once.
    pub fn prepare(&self, instrumented_type: InstrumentedType) -> Result<Prepared> {
        let mut prepared: Vec<&Arc<dyn Instrumentation>> = Vec::new();
        let mut instrumented_type = instrumented_type;
        for entry in &self.entries {
            if prepared.iter().any(|p| Arc::ptr_eq(p, &entry.instrumentation)) {
                continue;
            }
            instrumented_type = entry.instrumentation.prepare(instrumented_type)?;
            prepared.push(&entry.instrumentation);
        }

        let description = instrumented_type.description().clone();
        let entries = self
            .entries
            .iter()
            .map(|entry| PreparedEntry {
                matcher: entry.matcher.resolve(&description),
                instrumentation: Arc::clone(&entry.instrumentation),
                attribute_appender: entry.attribute_appender.make(&description),
            })
            .collect();
        tracing::debug!(
            ty = instrumented_type.name(),
            entries = self.entries.len(),
            instrumentations = prepared.len(),
            "prepared method registry"
        );
        Ok(Prepared {
            instrumented_type,
            entries,
        })
    }
}

#[derive(Debug, Clone)]
struct PreparedEntry {
    matcher: MethodMatcher,
    instrumentation: Arc<dyn Instrumentation>,
    attribute_appender: MethodAttributeAppender,
}

/// A registry whose instrumentations have prepared the instrumented type.
#[derive(Debug, Clone)]
pub struct Prepared {
    instrumented_type: InstrumentedType,
    entries: Vec<PreparedEntry>,
}

impl Prepared {
    pub fn instrumented_type(&self) -> &InstrumentedType {
        &self.instrumented_type
    }

    /// Assign every invokable method its implementation. Methods no entry
    /// matches get `fallback`.
    ///
    /// Each instrumentation builds one appender, shared by all methods of
    /// its entry.
    pub fn compile(
        self,
        target_factory: &dyn TargetFactory,
        lookup_engine: &MethodLookupEngine,
        fallback: CompiledEntry,
    ) -> Result<Compiled> {
        let description = self.instrumented_type.description().clone();
        let lookup = lookup_engine.process(&description);
        let invokable = lookup.invokable_methods();
        let target = target_factory.make(&description, lookup);

        let mut appenders: HashMap<usize, Arc<dyn ByteCodeAppender>> = HashMap::new();
        let mut implementations = IndexMap::new();
        for method in &invokable {
            let Some((index, entry)) = self
                .entries
                .iter()
                .enumerate()
                .find(|(_, entry)| entry.matcher.matches(method))
            else {
                implementations.insert(method.clone(), fallback.clone());
                continue;
            };
            let appender = match appenders.get(&index) {
                Some(appender) => Arc::clone(appender),
                None => {
                    let appender = entry.instrumentation.appender(&target)?;
                    appenders.insert(index, Arc::clone(&appender));
                    appender
                }
            };
            tracing::trace!(method = %method, entry = index, "matched method");
            implementations.insert(
                method.clone(),
                CompiledEntry::Define {
                    appender,
                    attribute_appender: entry.attribute_appender.clone(),
                },
            );
        }
        tracing::debug!(
            ty = description.name(),
            invokable = invokable.len(),
            appenders = appenders.len(),
            "compiled method registry"
        );

        Ok(Compiled {
            loaded_type_initializer: self.instrumented_type.loaded_type_initializer().clone(),
            type_initializer: self.instrumented_type.type_initializer().clone(),
            instrumented_type: description,
            invokable,
            implementations,
            target,
        })
    }
}

/// How a single method is emitted.
#[derive(Debug, Clone, Default)]
pub enum CompiledEntry {
    /// The method is not written.
    #[default]
    Skip,
    Define {
        appender: Arc<dyn ByteCodeAppender>,
        attribute_appender: MethodAttributeAppender,
    },
}

impl CompiledEntry {
    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Define { .. })
    }
}

/// A registry compiled against a final instrumented type.
#[derive(Debug, Clone)]
pub struct Compiled {
    instrumented_type: TypeDescription,
    loaded_type_initializer: LoadedTypeInitializer,
    type_initializer: TypeInitializer,
    invokable: Vec<MethodDescription>,
    implementations: IndexMap<MethodDescription, CompiledEntry>,
    target: InstrumentationTarget,
}

impl Compiled {
    pub fn instrumented_type(&self) -> &TypeDescription {
        &self.instrumented_type
    }

    pub fn loaded_type_initializer(&self) -> &LoadedTypeInitializer {
        &self.loaded_type_initializer
    }

    pub fn type_initializer(&self) -> &TypeInitializer {
        &self.type_initializer
    }

    /// Every invokable method of the instrumented type, declared ones
    /// first.
    pub fn invokable_methods(&self) -> &[MethodDescription] {
        &self.invokable
    }

    pub fn lookup(&self) -> &MethodLookup {
        self.target.lookup()
    }

    pub fn target(&self) -> &InstrumentationTarget {
        &self.target
    }

    pub fn entry_for(&self, method: &MethodDescription) -> &CompiledEntry {
        static SKIP: CompiledEntry = CompiledEntry::Skip;
        self.implementations.get(method).unwrap_or(&SKIP)
    }
}

/// Attribute appenders for the fields of the instrumented type, by field
/// name.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    entries: IndexMap<String, FieldAttributeAppender>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        field_name: impl Into<String>,
        appender: FieldAttributeAppender,
    ) -> Self {
        self.entries.insert(field_name.into(), appender);
        self
    }

    /// Fields without a registered appender get `default`.
    pub fn compile(&self, default: FieldAttributeAppender) -> CompiledFieldRegistry {
        CompiledFieldRegistry {
            entries: self.entries.clone(),
            default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledFieldRegistry {
    entries: IndexMap<String, FieldAttributeAppender>,
    default: FieldAttributeAppender,
}

impl CompiledFieldRegistry {
    pub fn target(&self, field: &FieldDescription) -> &FieldAttributeAppender {
        self.entries.get(field.name()).unwrap_or(&self.default)
    }
}
