use classforge_core::modifier::ModifierReviewable;
use indexmap::IndexMap;

use crate::description::{FieldDescription, MethodDescription, TypeDescription, TypePool};
use crate::instrumentation::{ConstantValue, LoadedType, LoadedTypeInitializer};
use crate::scaffold::DynamicType;
use crate::{Error, Result};

/// A generated class image that has not been loaded yet.
#[derive(Debug, Clone)]
pub struct Unloaded {
    name: String,
    bytes: Vec<u8>,
    loaded_type_initializer: LoadedTypeInitializer,
    type_description: TypeDescription,
}

impl Unloaded {
    pub(crate) fn new(dynamic_type: DynamicType) -> Self {
        Self {
            name: dynamic_type.type_description.name().to_string(),
            bytes: dynamic_type.bytes,
            loaded_type_initializer: dynamic_type.loaded_type_initializer,
            type_description: dynamic_type.type_description,
        }
    }

    /// Binary name of the generated type.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn loaded_type_initializer(&self) -> &LoadedTypeInitializer {
        &self.loaded_type_initializer
    }

    /// The latent description the class was generated from.
    pub fn type_description(&self) -> &TypeDescription {
        &self.type_description
    }

    /// Define the class in `pool` and run the loaded-type initializer
    /// against it.
    pub fn load(&self, pool: &TypePool) -> Result<LoadedClass> {
        let description = pool.define_class_file(&self.bytes)?;
        let mut loaded = LoadedClass {
            description,
            static_fields: IndexMap::new(),
        };
        self.loaded_type_initializer.on_load(&mut loaded)?;
        tracing::debug!(ty = self.name.as_str(), "loaded class");
        Ok(loaded)
    }
}

/// A generated class defined in a type pool, with the static field values
/// set by its loaded-type initializer.
#[derive(Debug, Clone)]
pub struct LoadedClass {
    description: TypeDescription,
    static_fields: IndexMap<String, ConstantValue>,
}

impl LoadedClass {
    pub fn description(&self) -> &TypeDescription {
        &self.description
    }

    pub fn super_type(&self) -> Option<TypeDescription> {
        self.description.super_type()
    }

    pub fn declared_methods(&self) -> Vec<MethodDescription> {
        self.description
            .declared_methods()
            .into_iter()
            .filter(|m| m.is_method())
            .collect()
    }

    pub fn declared_constructors(&self) -> Vec<MethodDescription> {
        self.description
            .declared_methods()
            .into_iter()
            .filter(|m| m.is_constructor())
            .collect()
    }

    pub fn declared_fields(&self) -> Vec<FieldDescription> {
        self.description.declared_fields()
    }

    /// Whether an instance can be created through a constructor.
    pub fn is_instantiable(&self) -> bool {
        !self.description.is_abstract() && !self.declared_constructors().is_empty()
    }

    pub fn static_field(&self, name: &str) -> Option<&ConstantValue> {
        self.static_fields.get(name)
    }
}

impl LoadedType for LoadedClass {
    fn name(&self) -> &str {
        self.description.name()
    }

    fn set_static_field(&mut self, name: &str, value: ConstantValue) -> Result<()> {
        let field = self
            .description
            .declared_fields()
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| {
                Error::NotFound(format!("field {name} of {}", self.description.name()))
            })?;
        if !field.is_static() {
            return Err(Error::illegal_state(format!(
                "field {name} of {} is not static",
                self.description.name()
            )));
        }
        if !value.is_assignable_to(&field.field_type()) {
            return Err(Error::invalid(format!(
                "{value} cannot be stored in field {name} of type {}",
                field.field_type().name()
            )));
        }
        self.static_fields.insert(name.to_string(), value);
        Ok(())
    }
}
