use std::sync::Arc;

use crate::description::{
    AnnotationToken, FieldToken, MethodToken, TypeData, TypeDescription, TypeOrigin, TypePool,
};
use crate::instrumentation::{LoadedTypeInitializer, TypeInitializer};
use crate::{Error, Result};

/// The type under construction.
///
/// Each `with_*` call returns a new value; fields and methods already added
/// are shared with the previous one. The description is latent: it resolves
/// its own name to itself and everything else through the pool.
#[derive(Debug, Clone)]
pub struct InstrumentedType {
    description: TypeDescription,
    loaded_type_initializer: LoadedTypeInitializer,
    type_initializer: TypeInitializer,
}

impl InstrumentedType {
    pub fn new(
        pool: &TypePool,
        name: impl Into<String>,
        modifiers: u16,
        super_type: Option<&TypeDescription>,
        interfaces: &[TypeDescription],
        annotations: Vec<AnnotationToken>,
    ) -> Self {
        let mut data = TypeData::class(name, modifiers, TypeOrigin::Latent);
        data.super_type = super_type.map(|ty| ty.name().to_string());
        data.interfaces = interfaces.iter().map(|ty| ty.name().to_string()).collect();
        data.annotations = annotations;
        Self {
            description: TypeDescription::new(Arc::new(data), pool.clone()),
            loaded_type_initializer: LoadedTypeInitializer::NoOp,
            type_initializer: TypeInitializer::none(),
        }
    }

    pub fn description(&self) -> &TypeDescription {
        &self.description
    }

    pub fn name(&self) -> &str {
        self.description.name()
    }

    pub fn is_interface(&self) -> bool {
        self.description.is_interface()
    }

    pub fn loaded_type_initializer(&self) -> &LoadedTypeInitializer {
        &self.loaded_type_initializer
    }

    pub fn type_initializer(&self) -> &TypeInitializer {
        &self.type_initializer
    }

    pub fn with_field(&self, field: FieldToken) -> Result<Self> {
        let data = self.description.data();
        if data.fields.iter().any(|f| f.name() == field.name()) {
            return Err(Error::invalid(format!(
                "field {} is already declared by {}",
                field.name(),
                self.name()
            )));
        }
        Ok(self.with_data(|data| data.fields.push(Arc::new(field))))
    }

    pub fn with_method(&self, method: MethodToken) -> Result<Self> {
        let signature = method.signature();
        let data = self.description.data();
        if data.methods.iter().any(|m| m.signature() == signature) {
            return Err(Error::invalid(format!(
                "method {signature} is already declared by {}",
                self.name()
            )));
        }
        Ok(self.with_data(|data| data.methods.push(Arc::new(method))))
    }

    pub fn with_initializer(&self, initializer: LoadedTypeInitializer) -> Self {
        Self {
            loaded_type_initializer: self
                .loaded_type_initializer
                .clone()
                .compound(initializer),
            ..self.clone()
        }
    }

    pub fn with_type_initializer(&self, initializer: TypeInitializer) -> Self {
        Self {
            type_initializer: self.type_initializer.clone().expand(initializer),
            ..self.clone()
        }
    }

    fn with_data(&self, change: impl FnOnce(&mut TypeData)) -> Self {
        let mut data = self.description.data().clone();
        change(&mut data);
        Self {
            description: TypeDescription::new(Arc::new(data), self.description.pool().clone()),
            ..self.clone()
        }
    }
}
