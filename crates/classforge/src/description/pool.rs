//! Registry of described types.
//!
//! A pool is append-only: types are defined once and never replaced, so a
//! description handed out earlier stays valid. Every pool starts with the
//! language types from [`lang`](super::lang).

use std::sync::{Arc, LazyLock};

use classforge_bytecode::{AnnotationNode, AnnotationValue, ClassReader, FieldType};
use classforge_core::manifest::modifier_flags;
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_ANNOTATION, ACC_FINAL, ACC_INTERFACE, ACC_PUBLIC, ACC_SUPER,
};
use classforge_core::utils::{
    is_valid_identifier, is_valid_method_name, is_valid_type_name, to_binary_name,
};
use classforge_core::{RawAnnotation, RawType, parse_manifest};
use indexmap::IndexMap;
use parking_lot::RwLock;

use super::names::{self, VOID, component_name_of, normalize_name};
use super::type_description::{TypeData, TypeOrigin, TypeSort};
use super::{AnnotationToken, FieldToken, MethodToken, Primitive, TypeDescription, lang};
use crate::{Error, Result};

static SYSTEM: LazyLock<IndexMap<String, Arc<TypeData>>> = LazyLock::new(|| {
    lang::definitions()
        .into_iter()
        .map(|definition| {
            let data = definition.into_data(TypeOrigin::Loaded);
            (data.name.clone(), Arc::new(data))
        })
        .collect()
});

#[derive(Debug, Default)]
struct PoolState {
    types: IndexMap<String, Arc<TypeData>>,
}

/// Shared, append-only registry of type descriptions keyed by binary name.
///
/// Cloning a pool yields a handle to the same registry.
#[derive(Debug, Clone)]
pub struct TypePool {
    state: Arc<RwLock<PoolState>>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    pub fn new() -> Self {
        let state = PoolState {
            types: SYSTEM.clone(),
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Describe a type by binary name. Accepts `void`, primitives, arrays in
    /// both `[Ljava.lang.String;` and `java.lang.String[]` form, and defined
    /// classes.
    pub fn describe(&self, name: &str) -> Result<TypeDescription> {
        self.lookup(name)
            .ok_or_else(|| Error::NotFound(format!("type `{name}`")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Binary names of all defined classes, in definition order.
    pub fn type_names(&self) -> Vec<String> {
        self.state.read().types.keys().cloned().collect()
    }

    /// Describe a referenced type. A name the pool does not know yields a
    /// public placeholder class extending `Object`.
    pub(crate) fn resolve(&self, name: &str) -> TypeDescription {
        self.lookup(name).unwrap_or_else(|| {
            tracing::warn!(name, "unresolved type reference");
            let mut data = TypeData::class(normalize_name(name), ACC_PUBLIC, TypeOrigin::Loaded);
            data.super_type = Some(lang::OBJECT.to_string());
            TypeDescription::new(Arc::new(data), self.clone())
        })
    }

    fn lookup(&self, name: &str) -> Option<TypeDescription> {
        let name = normalize_name(name);
        if name == VOID {
            return Some(TypeDescription::void(self.clone()));
        }
        if let Some(primitive) = Primitive::from_name(&name) {
            let mut data = TypeData::class(
                primitive.name(),
                ACC_PUBLIC | ACC_FINAL | ACC_ABSTRACT,
                TypeOrigin::Loaded,
            );
            data.sort = TypeSort::Primitive(primitive);
            return Some(TypeDescription::new(Arc::new(data), self.clone()));
        }
        if let Some(component) = component_name_of(&name) {
            let component = self.lookup(&component)?;
            if component.is_void() {
                return None;
            }
            return Some(TypeDescription::new(
                Arc::new(array_data(&name, component.name())),
                self.clone(),
            ));
        }
        let data = self.state.read().types.get(&name).cloned()?;
        Some(TypeDescription::new(data, self.clone()))
    }

    pub fn define(&self, definition: TypeDefinition) -> Result<TypeDescription> {
        let mut defined = self.define_all([definition])?;
        defined
            .pop()
            .ok_or_else(|| Error::illegal_state("definition produced no type"))
    }

    /// Define a batch of types that may reference each other. Either every
    /// definition is accepted or none is.
    pub fn define_all(
        &self,
        definitions: impl IntoIterator<Item = TypeDefinition>,
    ) -> Result<Vec<TypeDescription>> {
        let mut batch: IndexMap<String, TypeData> = IndexMap::new();
        for definition in definitions {
            let data = definition.into_data(TypeOrigin::Loaded);
            if batch.contains_key(&data.name) {
                return Err(Error::invalid(format!("type `{}` is defined twice", data.name)));
            }
            batch.insert(data.name.clone(), data);
        }

        let names: Vec<String> = {
            let mut state = self.state.write();
            let check = BatchCheck {
                existing: &state.types,
                batch: &batch,
            };
            for data in batch.values() {
                check.validate(data)?;
            }

            let mut names = Vec::with_capacity(batch.len());
            for (name, data) in batch {
                tracing::debug!(
                    name = %name,
                    fields = data.fields.len(),
                    methods = data.methods.len(),
                    "defined type"
                );
                state.types.insert(name.clone(), Arc::new(data));
                names.push(name);
            }
            names
        };

        names.iter().map(|name| self.describe(name)).collect()
    }

    /// Define the types listed in a JSON type manifest.
    pub fn load_manifest(&self, json: &str) -> Result<Vec<TypeDescription>> {
        let raw = parse_manifest(json)
            .map_err(|e| Error::invalid(format!("malformed type manifest: {e}")))?;
        let definitions = raw
            .into_iter()
            .map(TypeDefinition::from_raw)
            .collect::<Result<Vec<_>>>()?;
        self.define_all(definitions)
    }

    /// Define a type from a class image. Method bodies are not inspected.
    pub fn define_class_file(&self, bytes: &[u8]) -> Result<TypeDescription> {
        let class = ClassReader::new(bytes).skip_code().read()?;
        let header = &class.header;

        let mut modifiers = header.access;
        if modifiers & ACC_INTERFACE == 0 {
            modifiers &= !ACC_SUPER;
        }
        let mut definition =
            TypeDefinition::class(to_binary_name(&header.name)).modifiers(modifiers);
        if let Some(super_name) = &header.super_name {
            definition = definition.extends(to_binary_name(super_name));
        }
        for interface in &header.interfaces {
            definition = definition.implements(to_binary_name(interface));
        }
        for annotation in &class.annotations {
            definition = definition.annotation(annotation_from_node(annotation)?);
        }
        for field in &class.fields {
            let field_type = names::binary_name_of(&FieldType::parse(&field.descriptor)?);
            let mut token = FieldToken::new(&field.name, field_type).modifiers(field.access);
            for annotation in &field.annotations {
                token = token.annotation(annotation_from_node(annotation)?);
            }
            definition = definition.field(token);
        }
        for method in &class.methods {
            let mut token = MethodToken::from_descriptor(&method.name, &method.descriptor)?
                .throws(method.exceptions.iter().map(|e| to_binary_name(e)))
                .modifiers(method.access);
            for annotation in &method.annotations {
                token = token.annotation(annotation_from_node(annotation)?);
            }
            definition = definition.method(token);
        }

        self.define(definition)
    }
}

fn array_data(name: &str, component: &str) -> TypeData {
    let mut data = TypeData::class(
        name,
        ACC_PUBLIC | ACC_FINAL | ACC_ABSTRACT,
        TypeOrigin::Loaded,
    );
    data.sort = TypeSort::Array {
        component: component.to_string(),
    };
    data.super_type = Some(lang::OBJECT.to_string());
    data.interfaces = vec![lang::CLONEABLE.to_string(), lang::SERIALIZABLE.to_string()];
    data
}

fn annotation_from_node(node: &AnnotationNode) -> Result<AnnotationToken> {
    let annotation_type = names::binary_name_of(&FieldType::parse(&node.descriptor)?);
    Ok(node
        .values
        .iter()
        .fold(AnnotationToken::new(annotation_type), |token, (name, value)| {
            token.value(name.clone(), value.clone())
        }))
}

/// Validation of a definition batch against the types already defined.
struct BatchCheck<'a> {
    existing: &'a IndexMap<String, Arc<TypeData>>,
    batch: &'a IndexMap<String, TypeData>,
}

impl BatchCheck<'_> {
    fn class(&self, name: &str) -> Option<&TypeData> {
        self.batch
            .get(name)
            .or_else(|| self.existing.get(name).map(Arc::as_ref))
    }

    fn is_resolvable(&self, name: &str) -> bool {
        let name = normalize_name(name);
        if Primitive::from_name(&name).is_some() {
            return true;
        }
        match component_name_of(&name) {
            Some(component) => component != VOID && self.is_resolvable(&component),
            None => self.class(&name).is_some(),
        }
    }

    fn validate(&self, data: &TypeData) -> Result<()> {
        let name = &data.name;
        if !is_valid_type_name(name) {
            return Err(Error::invalid(format!("`{name}` is not a valid type name")));
        }
        if self.existing.contains_key(name) {
            return Err(Error::invalid(format!("type `{name}` is already defined")));
        }

        if let Some(super_name) = &data.super_type {
            let Some(parent) = self.class(super_name) else {
                return Err(Error::invalid(format!(
                    "supertype `{super_name}` of `{name}` is not defined"
                )));
            };
            if parent.modifiers & ACC_INTERFACE != 0 {
                return Err(Error::invalid(format!(
                    "`{name}` cannot extend interface `{super_name}`"
                )));
            }
            if parent.modifiers & ACC_FINAL != 0 {
                return Err(Error::invalid(format!(
                    "`{name}` cannot extend final type `{super_name}`"
                )));
            }
        }

        for (i, interface) in data.interfaces.iter().enumerate() {
            if data.interfaces[..i].contains(interface) {
                return Err(Error::invalid(format!(
                    "`{name}` implements `{interface}` twice"
                )));
            }
            match self.class(interface) {
                Some(found) if found.modifiers & ACC_INTERFACE != 0 => {}
                Some(_) => {
                    return Err(Error::invalid(format!(
                        "`{interface}` implemented by `{name}` is not an interface"
                    )));
                }
                None => {
                    return Err(Error::invalid(format!(
                        "interface `{interface}` of `{name}` is not defined"
                    )));
                }
            }
        }

        self.validate_members(data)?;
        self.validate_acyclic(data)
    }

    fn validate_members(&self, data: &TypeData) -> Result<()> {
        let name = &data.name;
        let unresolvable = |member: &str, ty: &str| {
            Error::invalid(format!("type `{ty}` of `{name}.{member}` is not defined"))
        };

        for (i, field) in data.fields.iter().enumerate() {
            if !is_valid_identifier(&field.name) {
                return Err(Error::invalid(format!(
                    "`{}` is not a valid field name",
                    field.name
                )));
            }
            if data.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::invalid(format!(
                    "field `{name}.{}` is declared twice",
                    field.name
                )));
            }
            if !self.is_resolvable(&field.field_type) {
                return Err(unresolvable(&field.name, &field.field_type));
            }
        }

        for (i, method) in data.methods.iter().enumerate() {
            if !is_valid_method_name(&method.internal_name) {
                return Err(Error::invalid(format!(
                    "`{}` is not a valid method name",
                    method.internal_name
                )));
            }
            let signature = method.signature();
            if data.methods[..i].iter().any(|m| m.signature() == signature) {
                return Err(Error::invalid(format!(
                    "method `{name}.{signature}` is declared twice"
                )));
            }
            if method.return_type != VOID && !self.is_resolvable(&method.return_type) {
                return Err(unresolvable(&method.internal_name, &method.return_type));
            }
            for ty in method.parameter_types.iter().chain(&method.exception_types) {
                if !self.is_resolvable(ty) {
                    return Err(unresolvable(&method.internal_name, ty));
                }
            }
        }

        let annotations = data
            .annotations
            .iter()
            .chain(data.fields.iter().flat_map(|f| &f.annotations))
            .chain(data.methods.iter().flat_map(|m| &m.annotations));
        for annotation in annotations {
            if self.class(&annotation.annotation_type).is_none() {
                return Err(Error::invalid(format!(
                    "annotation type `{}` used by `{name}` is not defined",
                    annotation.annotation_type
                )));
            }
        }
        Ok(())
    }

    fn validate_acyclic(&self, data: &TypeData) -> Result<()> {
        let mut current = data.super_type.as_deref();
        let mut steps = 0;
        while let Some(super_name) = current {
            if super_name == data.name || steps > self.batch.len() + self.existing.len() {
                return Err(Error::invalid(format!(
                    "`{}` is its own supertype",
                    data.name
                )));
            }
            current = self.class(super_name).and_then(|d| d.super_type.as_deref());
            steps += 1;
        }
        Ok(())
    }
}

/// Programmatic definition of a type for [`TypePool::define`].
///
/// Classes default to `public` and extend `java.lang.Object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    name: String,
    modifiers: u16,
    super_type: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<FieldToken>,
    methods: Vec<MethodToken>,
    annotations: Vec<AnnotationToken>,
}

impl TypeDefinition {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: ACC_PUBLIC,
            super_type: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::class(name).modifiers(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
    }

    pub fn annotation_type(name: impl Into<String>) -> Self {
        Self::class(name)
            .modifiers(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION)
            .implements(lang::ANNOTATION)
    }

    pub fn modifiers(mut self, modifiers: u16) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn extends(mut self, super_type: impl Into<String>) -> Self {
        self.super_type = Some(super_type.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn field(mut self, field: FieldToken) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodToken) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationToken) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub(crate) fn into_data(self, origin: TypeOrigin) -> TypeData {
        let is_interface = self.modifiers & ACC_INTERFACE != 0;
        let super_type = if is_interface || self.name == lang::OBJECT {
            None
        } else {
            Some(self.super_type.unwrap_or_else(|| lang::OBJECT.to_string()))
        };
        let mut data = TypeData::class(self.name, self.modifiers, origin);
        data.super_type = super_type;
        data.interfaces = self.interfaces;
        data.fields = self.fields.into_iter().map(Arc::new).collect();
        data.methods = self.methods.into_iter().map(Arc::new).collect();
        data.annotations = self.annotations;
        data
    }

    fn from_raw(raw: RawType) -> Result<Self> {
        let mut definition = Self::class(&raw.name).modifiers(flags(&raw.modifiers)?);
        if let Some(super_type) = raw.super_type {
            definition = definition.extends(super_type);
        }
        definition.interfaces = raw.interfaces;
        for annotation in &raw.annotations {
            definition = definition.annotation(annotation_from_raw(annotation)?);
        }
        for field in raw.fields {
            let field_type = names::binary_name_of(&FieldType::parse(&field.descriptor)?);
            let mut token =
                FieldToken::new(field.name, field_type).modifiers(flags(&field.modifiers)?);
            for annotation in &field.annotations {
                token = token.annotation(annotation_from_raw(annotation)?);
            }
            definition = definition.field(token);
        }
        for method in raw.methods {
            let mut token = MethodToken::from_descriptor(method.name, &method.descriptor)?
                .throws(method.exceptions)
                .modifiers(flags(&method.modifiers)?);
            for annotation in &method.annotations {
                token = token.annotation(annotation_from_raw(annotation)?);
            }
            definition = definition.method(token);
        }
        Ok(definition)
    }
}

fn flags(keywords: &[String]) -> Result<u16> {
    modifier_flags(keywords)
        .map_err(|keyword| Error::invalid(format!("unknown modifier `{keyword}`")))
}

fn annotation_from_raw(raw: &RawAnnotation) -> Result<AnnotationToken> {
    raw.values
        .iter()
        .try_fold(AnnotationToken::new(&raw.type_name), |token, (name, value)| {
            Ok(token.value(name.clone(), annotation_value(value)?))
        })
}

/// Manifest annotation values: booleans, integers, strings, arrays, and the
/// objects `{"class": "T"}` and `{"enum": "T", "name": "C"}`.
fn annotation_value(value: &serde_json::Value) -> Result<AnnotationValue> {
    use serde_json::Value;

    let unsupported = || Error::invalid(format!("unsupported annotation value `{value}`"));
    match value {
        Value::Bool(b) => Ok(AnnotationValue::Boolean(*b)),
        Value::Number(n) => {
            let long = n.as_i64().ok_or_else(unsupported)?;
            Ok(i32::try_from(long).map_or(AnnotationValue::Long(long), AnnotationValue::Int))
        }
        Value::String(s) => Ok(AnnotationValue::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(annotation_value)
            .collect::<Result<_>>()
            .map(AnnotationValue::Array),
        Value::Object(map) => match (map.get("class"), map.get("enum"), map.get("name")) {
            (Some(Value::String(class)), None, None) => {
                Ok(AnnotationValue::Class(names::descriptor_of(&normalize_name(class))))
            }
            (None, Some(Value::String(ty)), Some(Value::String(name))) => Ok(AnnotationValue::Enum {
                descriptor: names::descriptor_of(ty),
                name: name.clone(),
            }),
            _ => Err(unsupported()),
        },
        Value::Null => Err(unsupported()),
    }
}
