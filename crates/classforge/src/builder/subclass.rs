use std::collections::HashSet;
use std::sync::Arc;

use classforge_bytecode::MethodVisitor;
use classforge_core::modifier::{
    ACC_ABSTRACT, FIELD_MODIFIER_MASK, METHOD_MODIFIER_MASK, Modifier, TYPE_MODIFIER_MASK,
    resolve_modifiers,
};
use classforge_core::utils::{is_valid_identifier, is_valid_type_name};

use super::{ClassForge, Unloaded};
use crate::description::{
    AnnotationDescription, FieldToken, MethodDescription, MethodSort, MethodToken, TypeDescription,
    lang,
};
use crate::instrumentation::{
    ByteCodeAppender, CodeSize, FieldAttributeAppender, Instrumentation, MethodAttributeAppender,
    TypeAttributeAppender, TypeInitializer,
};
use crate::matcher::{LatentMatcher, MethodMatcher, is_constructor};
use crate::scaffold::{
    ClassVisitorWrapper, CompiledEntry, ConstructorStrategy, FieldRegistry, InstrumentationTarget,
    InstrumentedType, MethodLookupEngine, MethodRegistry, OriginTypeIdentifier,
    SubclassTargetFactory, TypeWriter,
};
use crate::{Error, Result};

/// Collects the declarations and interception rules of one subclass.
///
/// Consuming methods return the updated builder; methods that validate
/// their input return `Result`.
#[derive(Debug, Clone)]
pub struct SubclassBuilder {
    config: ClassForge,
    super_type: TypeDescription,
    interfaces: Vec<TypeDescription>,
    name: Option<String>,
    modifiers: u16,
    annotations: Vec<AnnotationDescription>,
    type_attribute_appender: TypeAttributeAppender,
    fields: Vec<FieldToken>,
    field_registry: FieldRegistry,
    methods: Vec<MethodToken>,
    method_registry: MethodRegistry,
    /// Entries for explicitly defined constructors. They take precedence
    /// over the constructor strategy's entry.
    constructor_registry: MethodRegistry,
    ignored_methods: MethodMatcher,
    constructor_strategy: ConstructorStrategy,
    class_visitor_wrappers: Vec<Arc<dyn ClassVisitorWrapper>>,
    type_initializer: TypeInitializer,
}

impl SubclassBuilder {
    pub(super) fn new(
        config: ClassForge,
        super_type: TypeDescription,
        interfaces: Vec<TypeDescription>,
        modifiers: u16,
        constructor_strategy: ConstructorStrategy,
    ) -> Self {
        Self {
            ignored_methods: config.ignored_methods.clone(),
            config,
            super_type,
            interfaces,
            name: None,
            modifiers,
            annotations: Vec::new(),
            type_attribute_appender: TypeAttributeAppender::NoOp,
            fields: Vec::new(),
            field_registry: FieldRegistry::new(),
            methods: Vec::new(),
            method_registry: MethodRegistry::new(),
            constructor_registry: MethodRegistry::new(),
            constructor_strategy,
            class_visitor_wrappers: Vec::new(),
            type_initializer: TypeInitializer::none(),
        }
    }

    pub fn super_type(&self) -> &TypeDescription {
        &self.super_type
    }

    pub fn implement(
        mut self,
        interfaces: impl IntoIterator<Item = TypeDescription>,
    ) -> Result<Self> {
        let mut seen: HashSet<TypeDescription> = self.interfaces.iter().cloned().collect();
        for interface in interfaces {
            if !interface.is_interface() {
                return Err(Error::invalid(format!(
                    "{} is not an interface",
                    interface.name()
                )));
            }
            if !seen.insert(interface.clone()) {
                return Err(Error::invalid(format!(
                    "{} is implemented more than once",
                    interface.name()
                )));
            }
            self.interfaces.push(interface);
        }
        Ok(self)
    }

    pub fn modifiers(mut self, modifiers: u16) -> Result<Self> {
        self.modifiers = checked_modifiers(modifiers, TYPE_MODIFIER_MASK, "type")?;
        Ok(self)
    }

    pub fn modifier_contributors(mut self, contributors: &[Modifier]) -> Result<Self> {
        self.modifiers = resolve_modifiers(TYPE_MODIFIER_MASK, contributors)?;
        Ok(self)
    }

    /// Name the type instead of using the naming strategy.
    pub fn name(mut self, name: impl Into<String>) -> Result<Self> {
        self.name = Some(checked_type_name(name.into())?);
        Ok(self)
    }

    pub fn annotate_type(
        mut self,
        annotations: impl IntoIterator<Item = AnnotationDescription>,
    ) -> Self {
        self.annotations.extend(annotations);
        self
    }

    pub fn attribute(mut self, appender: TypeAttributeAppender) -> Self {
        self.type_attribute_appender = self.type_attribute_appender.compound(appender);
        self
    }

    pub fn define_field(
        self,
        name: impl Into<String>,
        field_type: &TypeDescription,
        modifiers: u16,
    ) -> Result<Self> {
        self.define_field_with(name, field_type, modifiers, None)
    }

    /// Define a field whose annotations are written by `appender` instead
    /// of the configured default.
    pub fn define_field_with(
        mut self,
        name: impl Into<String>,
        field_type: &TypeDescription,
        modifiers: u16,
        appender: impl Into<Option<FieldAttributeAppender>>,
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(Error::invalid(format!("`{name}` is not a valid field name")));
        }
        if field_type.is_void() {
            return Err(Error::invalid(format!("field {name} cannot be of type void")));
        }
        let modifiers = checked_modifiers(modifiers, FIELD_MODIFIER_MASK, "field")?;
        if self.fields.iter().any(|f| f.name() == name) {
            return Err(Error::invalid(format!("field {name} is already defined")));
        }
        if let Some(appender) = appender.into() {
            self.field_registry = self.field_registry.register(name.as_str(), appender);
        }
        self.fields
            .push(FieldToken::new(name, field_type.name()).modifiers(modifiers));
        Ok(self)
    }

    pub fn define_method(
        self,
        name: impl Into<String>,
        return_type: &TypeDescription,
        parameters: impl IntoIterator<Item = TypeDescription>,
        modifiers: u16,
    ) -> Result<MethodDefinition> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(Error::invalid(format!("`{name}` is not a valid method name")));
        }
        let modifiers = checked_modifiers(modifiers, METHOD_MODIFIER_MASK, "method")?;
        let token = MethodToken::new(name, return_type.name())
            .parameters(checked_parameters(parameters)?)
            .modifiers(modifiers);
        Ok(MethodDefinition::new(self, token))
    }

    pub fn define_constructor(
        self,
        parameters: impl IntoIterator<Item = TypeDescription>,
        modifiers: u16,
    ) -> Result<MethodDefinition> {
        let modifiers = checked_modifiers(modifiers, METHOD_MODIFIER_MASK, "constructor")?;
        let token = MethodToken::constructor()
            .parameters(checked_parameters(parameters)?)
            .modifiers(modifiers);
        Ok(MethodDefinition::new(self, token))
    }

    /// Intercept every invokable method `matcher` accepts.
    pub fn method(self, matcher: MethodMatcher) -> MethodInterception {
        MethodInterception {
            builder: self,
            matcher,
            attribute_appender: None,
        }
    }

    /// Intercept every constructor `matcher` accepts.
    pub fn constructor(self, matcher: MethodMatcher) -> MethodInterception {
        self.method(is_constructor().and(matcher))
    }

    /// Never override inherited methods `matcher` accepts. Replaces the
    /// configured matcher.
    pub fn ignore_methods(mut self, matcher: MethodMatcher) -> Self {
        self.ignored_methods = matcher;
        self
    }

    pub fn class_visitor(mut self, wrapper: Arc<dyn ClassVisitorWrapper>) -> Self {
        self.class_visitor_wrappers.push(wrapper);
        self
    }

    /// Add code to the type's `<clinit>`.
    pub fn initialize(mut self, initializer: TypeInitializer) -> Self {
        self.type_initializer = self.type_initializer.expand(initializer);
        self
    }

    #[tracing::instrument(skip_all, fields(super_type = self.super_type.name()))]
    pub fn make(self) -> Result<Unloaded> {
        let config = self.config;
        let name = match self.name {
            Some(name) => name,
            None => checked_type_name(config.naming_strategy.name(&self.super_type))?,
        };
        let annotations = self
            .annotations
            .iter()
            .map(AnnotationDescription::to_token)
            .collect();
        let mut instrumented_type = InstrumentedType::new(
            self.super_type.pool(),
            name,
            self.modifiers,
            Some(&self.super_type),
            &self.interfaces,
            annotations,
        );
        for constructor in self
            .constructor_strategy
            .extract_constructors(instrumented_type.description())?
        {
            instrumented_type = instrumented_type.with_method(constructor)?;
        }
        for field in self.fields {
            instrumented_type = instrumented_type.with_field(field)?;
        }
        for method in self.methods {
            instrumented_type = instrumented_type.with_method(method)?;
        }
        instrumented_type = instrumented_type.with_type_initializer(self.type_initializer);

        let registry = self
            .constructor_strategy
            .inject(self.method_registry, config.method_attribute_appender.clone())
            .prepend_all(self.constructor_registry);
        let compiled = registry.prepare(instrumented_type)?.compile(
            &SubclassTargetFactory {
                origin: OriginTypeIdentifier::SuperType,
                class_file_version: config.class_file_version,
            },
            &MethodLookupEngine::new(config.class_file_version.supports_default_methods()),
            CompiledEntry::Skip,
        )?;

        let fields = self
            .field_registry
            .compile(config.field_attribute_appender.clone());
        let type_attribute_appender = config
            .type_attribute_appender
            .clone()
            .compound(TypeAttributeAppender::ForAnnotations(self.annotations))
            .compound(self.type_attribute_appender);
        let mut class_visitor_wrappers = config.class_visitor_wrappers.clone();
        class_visitor_wrappers.extend(self.class_visitor_wrappers);

        let dynamic_type = TypeWriter {
            compiled: &compiled,
            fields: &fields,
            type_attribute_appender: &type_attribute_appender,
            ignored: &self.ignored_methods,
            class_file_version: config.class_file_version,
            class_visitor_wrappers: &class_visitor_wrappers,
        }
        .make()?;
        Ok(Unloaded::new(dynamic_type))
    }
}

fn checked_type_name(name: String) -> Result<String> {
    if !is_valid_type_name(&name) {
        return Err(Error::invalid(format!("`{name}` is not a valid type name")));
    }
    Ok(name)
}

fn checked_modifiers(modifiers: u16, mask: u16, what: &str) -> Result<u16> {
    if modifiers & !mask != 0 {
        return Err(Error::invalid(format!(
            "modifiers {modifiers:#06x} are not allowed on a {what} (mask {mask:#06x})"
        )));
    }
    Ok(modifiers)
}

fn checked_parameters(
    parameters: impl IntoIterator<Item = TypeDescription>,
) -> Result<Vec<String>> {
    parameters
        .into_iter()
        .map(|ty| {
            if ty.is_void() {
                Err(Error::invalid("parameters cannot be of type void"))
            } else {
                Ok(ty.name().to_string())
            }
        })
        .collect()
}

/// A `method(...)` or `constructor(...)` rule waiting for its
/// instrumentation.
#[derive(Debug)]
pub struct MethodInterception {
    builder: SubclassBuilder,
    matcher: MethodMatcher,
    attribute_appender: Option<MethodAttributeAppender>,
}

impl MethodInterception {
    /// Write the intercepted methods' annotations with `appender` instead
    /// of the configured default.
    pub fn attribute(mut self, appender: MethodAttributeAppender) -> Self {
        self.attribute_appender = Some(appender);
        self
    }

    pub fn intercept(self, instrumentation: impl Instrumentation + 'static) -> SubclassBuilder {
        self.intercept_shared(Arc::new(instrumentation))
    }

    /// Register an instrumentation that may be shared with other rules. A
    /// shared instrumentation prepares the type only once.
    pub fn intercept_shared(self, instrumentation: Arc<dyn Instrumentation>) -> SubclassBuilder {
        let mut builder = self.builder;
        let attribute_appender = self
            .attribute_appender
            .unwrap_or_else(|| builder.config.method_attribute_appender.clone());
        builder.method_registry = builder.method_registry.append(
            self.matcher,
            instrumentation,
            attribute_appender,
        );
        builder
    }
}

/// A method or constructor defined on the builder, waiting for its
/// implementation.
#[derive(Debug)]
pub struct MethodDefinition {
    builder: SubclassBuilder,
    token: MethodToken,
    attribute_appender: Option<MethodAttributeAppender>,
}

impl MethodDefinition {
    fn new(builder: SubclassBuilder, token: MethodToken) -> Self {
        Self {
            builder,
            token,
            attribute_appender: None,
        }
    }

    /// Declare the exceptions the method throws. Each must be a
    /// `Throwable`.
    pub fn throwing(
        mut self,
        exceptions: impl IntoIterator<Item = TypeDescription>,
    ) -> Result<Self> {
        let mut names = Vec::new();
        for exception in exceptions {
            let throwable = exception.resolve(lang::THROWABLE);
            if !exception.is_assignable_to(&throwable) {
                return Err(Error::invalid(format!(
                    "{} is not a Throwable",
                    exception.name()
                )));
            }
            names.push(exception.name().to_string());
        }
        self.token = self.token.throws(names);
        Ok(self)
    }

    pub fn attribute(mut self, appender: MethodAttributeAppender) -> Self {
        self.attribute_appender = Some(appender);
        self
    }

    pub fn intercept(
        self,
        instrumentation: impl Instrumentation + 'static,
    ) -> Result<SubclassBuilder> {
        self.define(Arc::new(instrumentation))
    }

    /// Declare the method abstract, without code.
    pub fn without_code(mut self) -> Result<SubclassBuilder> {
        if self.token.sort() != MethodSort::Method {
            return Err(Error::invalid("a constructor must have code"));
        }
        let modifiers = self.token.modifiers | ACC_ABSTRACT;
        self.token = self.token.modifiers(modifiers);
        self.define(Arc::new(WithoutCode))
    }

    fn define(self, instrumentation: Arc<dyn Instrumentation>) -> Result<SubclassBuilder> {
        let mut builder = self.builder;
        let signature = self.token.signature();
        if builder.methods.iter().any(|m| m.signature() == signature) {
            return Err(Error::invalid(format!("method {signature} is already defined")));
        }
        let attribute_appender = self
            .attribute_appender
            .unwrap_or_else(|| builder.config.method_attribute_appender.clone());
        let matcher = LatentMatcher::Declared(self.token.clone());
        if self.token.sort() == MethodSort::Constructor {
            builder.constructor_registry =
                builder
                    .constructor_registry
                    .append(matcher, instrumentation, attribute_appender);
        } else {
            builder.method_registry =
                builder
                    .method_registry
                    .prepend(matcher, instrumentation, attribute_appender);
        }
        builder.methods.push(self.token);
        Ok(builder)
    }
}

/// Emits the method as an abstract declaration.
#[derive(Debug, Clone, Copy)]
struct WithoutCode;

impl Instrumentation for WithoutCode {
    fn appender(&self, _target: &InstrumentationTarget) -> Result<Arc<dyn ByteCodeAppender>> {
        Ok(Arc::new(WithoutCode))
    }
}

impl ByteCodeAppender for WithoutCode {
    fn applies_code(&self) -> bool {
        false
    }

    fn apply(&self, _visitor: &mut MethodVisitor, method: &MethodDescription) -> Result<CodeSize> {
        Err(Error::illegal_state(format!("{method} has no code to write")))
    }
}
