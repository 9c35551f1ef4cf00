use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use classforge_bytecode::{
    AnnotationNode, ClassFileVersion, ClassHeader, ClassVisitor, FieldNode, MethodNode,
};
use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_VOLATILE,
    ModifierReviewable, TypeManifestation, Visibility,
};
use indoc::indoc;

use super::{ClassForge, NamingStrategy, SubclassBuilder};
use crate::Error;
use crate::description::{
    MethodToken, StackSize, TypeDefinition, TypeDescription, TypePool, lang,
};
use crate::instrumentation::{
    FixedValue, StackManipulation, StubMethod, SuperMethodCall, TypeAttributeAppender,
    TypeInitializer,
};
use crate::matcher::{MethodMatcher, any, is_declared_by_type, named};
use crate::scaffold::{ClassVisitorWrapper, ConstructorStrategy};
use crate::test_utils::{BASE, CHECKED, GREETER, SEALED, describe, dump_image, pool, read};

fn subclass(pool: &TypePool, super_type: &str, strategy: ConstructorStrategy) -> SubclassBuilder {
    ClassForge::new()
        .with_naming_strategy(NamingStrategy::Fixed("demo.Sub".into()))
        .subclass(&describe(pool, super_type), strategy)
        .unwrap()
}

fn provider(pool: &TypePool) -> TypeDescription {
    pool.define(
        TypeDefinition::interface("demo.Provider")
            .method(MethodToken::new("foo", lang::OBJECT).modifiers(ACC_PUBLIC)),
    )
    .unwrap()
}

#[test]
fn no_constructors_declares_nothing() {
    let pool = pool();

    let unloaded = subclass(&pool, lang::OBJECT, ConstructorStrategy::NoConstructors)
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = java/lang/Object
    ");
    let loaded = unloaded.load(&pool).unwrap();
    assert!(loaded.declared_methods().is_empty());
    assert!(loaded.declared_fields().is_empty());
    assert!(!loaded.is_instantiable());
}

#[test]
fn default_constructor_calls_object() {
    let pool = pool();

    let unloaded = subclass(&pool, lang::OBJECT, ConstructorStrategy::DefaultConstructor)
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = java/lang/Object

    [methods]
    public <init>()V
      stack = 1, locals = 1
      aload 0
      invokespecial java/lang/Object.<init>()V
      return
    ");
    let loaded = unloaded.load(&pool).unwrap();
    assert_eq!(loaded.super_type().unwrap().name(), lang::OBJECT);
    assert_eq!(loaded.declared_constructors().len(), 1);
    assert!(loaded.is_instantiable());
}

#[test]
fn default_constructor_keeps_super_visibility() {
    let pool = pool();
    pool.define(
        TypeDefinition::class("demo.Prot")
            .modifiers(ACC_PUBLIC | ACC_ABSTRACT)
            .method(MethodToken::constructor().modifiers(ACC_PROTECTED)),
    )
    .unwrap();

    let unloaded = subclass(&pool, "demo.Prot", ConstructorStrategy::DefaultConstructor)
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = demo/Prot

    [methods]
    protected <init>()V
      stack = 1, locals = 1
      aload 0
      invokespecial demo/Prot.<init>()V
      return
    ");
}

#[test]
fn imitated_constructors_forward_arguments() {
    let pool = pool();

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::ImitateSuperType)
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = demo/Base

    [methods]
    public <init>()V
      stack = 1, locals = 1
      aload 0
      invokespecial demo/Base.<init>()V
      return

    public <init>(I)V
      stack = 2, locals = 2
      aload 0
      iload 1
      invokespecial demo/Base.<init>(I)V
      return
    ");
}

#[test]
fn default_methods_are_inherited_untouched() {
    let pool = pool();
    let provider = provider(&pool);

    let unloaded = ClassForge::new()
        .subclass(&provider, ConstructorStrategy::DefaultConstructor)
        .unwrap()
        .name("demo.Provided")
        .unwrap()
        .make()
        .unwrap();

    let loaded = unloaded.load(&pool).unwrap();
    assert_eq!(loaded.super_type().unwrap().name(), lang::OBJECT);
    assert_eq!(loaded.description().interfaces(), vec![provider]);
    assert!(loaded.declared_methods().is_empty());
    assert!(loaded.declared_fields().is_empty());
}

#[test]
fn default_method_can_be_overridden() {
    let pool = pool();
    let provider = provider(&pool);

    let unloaded = ClassForge::new()
        .subclass(&provider, ConstructorStrategy::DefaultConstructor)
        .unwrap()
        .name("demo.Provided")
        .unwrap()
        .method(is_declared_by_type(provider))
        .intercept(FixedValue::value("bar"))
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r#"
    [class]
    version = 52.0
    access = public super
    name = demo/Provided
    super = java/lang/Object
    interfaces = demo/Provider

    [methods]
    public <init>()V
      stack = 1, locals = 1
      aload 0
      invokespecial java/lang/Object.<init>()V
      return

    public foo()Ljava/lang/Object;
      stack = 1, locals = 1
      ldc "bar"
      areturn
    "#);
    let loaded = unloaded.load(&pool).unwrap();
    let methods: Vec<_> = loaded
        .declared_methods()
        .iter()
        .map(|m| m.internal_name().to_string())
        .collect();
    assert_eq!(methods, ["foo"]);
    assert!(loaded.declared_fields().is_empty());
}

#[test]
fn default_method_override_needs_java_8() {
    let pool = pool();
    let provider = provider(&pool);

    let unloaded = ClassForge::new()
        .with_class_file_version(ClassFileVersion::JAVA_V7)
        .subclass(&provider, ConstructorStrategy::NoConstructors)
        .unwrap()
        .method(is_declared_by_type(provider))
        .intercept(SuperMethodCall)
        .make();

    assert!(matches!(unloaded, Err(Error::IllegalState(_))));
}

#[test]
fn naming_strategy_picks_the_name() {
    let pool = pool();

    let unloaded = ClassForge::new()
        .subclass(&describe(&pool, BASE), ConstructorStrategy::NoConstructors)
        .unwrap()
        .make()
        .unwrap();

    assert!(unloaded.name().starts_with("demo.Base$ClassForge$"));
    assert_eq!(unloaded.type_description().name(), unloaded.name());
}

#[test]
fn naming_strategy_names_are_validated() {
    let pool = pool();
    let object = describe(&pool, lang::OBJECT);
    let make = |strategy: NamingStrategy| {
        ClassForge::new()
            .with_naming_strategy(strategy)
            .subclass(&object, ConstructorStrategy::DefaultConstructor)
            .unwrap()
            .make()
    };

    for bad in ["public", ".Foo", "a..b", "<init>", ""] {
        assert!(
            matches!(make(NamingStrategy::Fixed(bad.into())), Err(Error::InvalidArgument(_))),
            "{bad:?} was accepted"
        );
    }
    let err = make(NamingStrategy::Fixed("demo.class".into())).unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: `demo.class` is not a valid type name");
    assert!(matches!(
        make(NamingStrategy::suffixing_random("not valid")),
        Err(Error::InvalidArgument(_))
    ));
    assert!(make(NamingStrategy::suffixing_random("Proxy")).is_ok());
}

#[test]
fn subclassing_interface_implements_it() {
    let pool = pool();

    let builder = subclass(&pool, GREETER, ConstructorStrategy::NoConstructors);

    assert_eq!(builder.super_type().name(), lang::OBJECT);
    let header = read(builder.make().unwrap().bytes()).header;
    assert_eq!(header.super_name.as_deref(), Some("java/lang/Object"));
    assert_eq!(header.interfaces, ["demo/Greeter"]);
}

#[test]
fn rejects_unsubclassable_types() {
    let pool = pool();
    let forge = ClassForge::new();

    for name in [SEALED, "int", "demo.Base[]"] {
        let result = forge.subclass(&describe(&pool, name), ConstructorStrategy::NoConstructors);
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "{name}");
    }
}

#[test]
fn type_level_validation() {
    let pool = pool();
    let builder = || subclass(&pool, BASE, ConstructorStrategy::NoConstructors);

    let err = builder().implement([describe(&pool, BASE)]).unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: demo.Base is not an interface");

    let greeter = describe(&pool, GREETER);
    let err = builder()
        .implement([greeter.clone(), greeter])
        .unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: demo.Greeter is implemented more than once");

    assert!(matches!(builder().name("demo.1Sub"), Err(Error::InvalidArgument(_))));
    assert!(matches!(builder().modifiers(ACC_VOLATILE), Err(Error::InvalidArgument(_))));
}

#[test]
fn modifier_contributors_set_type_modifiers() {
    let pool = pool();

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .modifier_contributors(&[Visibility::Public.into(), TypeManifestation::Final.into()])
        .unwrap()
        .make()
        .unwrap();

    assert_eq!(read(unloaded.bytes()).header.access & ACC_FINAL, ACC_FINAL);
    assert!(unloaded.type_description().is_final());
}

#[test]
fn field_validation() {
    let pool = pool();
    let int = describe(&pool, "int");
    let builder = || subclass(&pool, BASE, ConstructorStrategy::NoConstructors);

    assert!(matches!(
        builder().define_field("value", &describe(&pool, "void"), ACC_PUBLIC),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        builder().define_field("not a name", &int, ACC_PUBLIC),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        builder().define_field("value", &int, ACC_ABSTRACT),
        Err(Error::InvalidArgument(_))
    ));
    let err = builder()
        .define_field("value", &int, ACC_PUBLIC)
        .unwrap()
        .define_field("value", &int, ACC_PRIVATE)
        .unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: field value is already defined");
}

#[test]
fn defined_members_are_written() {
    let pool = pool();
    let string = describe(&pool, lang::STRING);
    let int = describe(&pool, "int");

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .define_field("label", &string, ACC_PRIVATE | ACC_FINAL)
        .unwrap()
        .define_constructor([int.clone()], ACC_PUBLIC)
        .unwrap()
        .intercept(SuperMethodCall)
        .unwrap()
        .define_method("describe", &string, [int], ACC_PUBLIC)
        .unwrap()
        .intercept(FixedValue::value("x"))
        .unwrap()
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r#"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = demo/Base

    [fields]
    private final label Ljava/lang/String;

    [methods]
    public <init>(I)V
      stack = 2, locals = 2
      aload 0
      iload 1
      invokespecial demo/Base.<init>(I)V
      return

    public describe(I)Ljava/lang/String;
      stack = 1, locals = 2
      ldc "x"
      areturn
    "#);
}

#[test]
fn defined_method_beats_interception() {
    let pool = pool();
    let string = describe(&pool, lang::STRING);
    let matcher: MethodMatcher = named("toString");

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .method(matcher)
        .intercept(FixedValue::value("intercepted"))
        .define_method("toString", &string, [], ACC_PUBLIC)
        .unwrap()
        .intercept(FixedValue::value("defined"))
        .unwrap()
        .make()
        .unwrap();

    let class = read(unloaded.bytes());
    let to_string = class.method("toString", "()Ljava/lang/String;").unwrap();
    let code = to_string.code.as_ref().unwrap();
    assert_eq!(code.instructions[0].to_string(), "ldc \"defined\"");
    assert_eq!(class.methods.len(), 1);
}

#[test]
fn method_validation() {
    let pool = pool();
    let void = describe(&pool, "void");
    let builder = || subclass(&pool, BASE, ConstructorStrategy::NoConstructors);

    let err = builder()
        .define_method("run", &void, [], ACC_PUBLIC)
        .unwrap()
        .intercept(StubMethod)
        .unwrap()
        .define_method("run", &void, [], ACC_PRIVATE)
        .unwrap()
        .intercept(StubMethod)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = builder()
        .define_method("run", &void, [], ACC_PUBLIC)
        .unwrap()
        .throwing([describe(&pool, lang::STRING)])
        .unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: java.lang.String is not a Throwable");

    assert!(matches!(
        builder().define_method("run", &void, [void.clone()], ACC_PUBLIC),
        Err(Error::InvalidArgument(_))
    ));

    let err = builder()
        .define_constructor([], ACC_PUBLIC)
        .unwrap()
        .without_code()
        .unwrap_err();
    insta::assert_snapshot!(err, @"invalid argument: a constructor must have code");
}

#[test]
fn abstract_method_and_exceptions() {
    let pool = pool();
    let void = describe(&pool, "void");

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .modifiers(ACC_PUBLIC | ACC_ABSTRACT)
        .unwrap()
        .define_method("run", &void, [], ACC_PUBLIC)
        .unwrap()
        .throwing([describe(&pool, CHECKED)])
        .unwrap()
        .without_code()
        .unwrap()
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super abstract
    name = demo/Sub
    super = demo/Base

    [methods]
    public abstract run()V throws demo/CheckedException
    ");
    assert!(!unloaded.load(&pool).unwrap().is_instantiable());
}

#[test]
fn strategy_constructors_keep_super_call() {
    let pool = pool();
    let matcher: MethodMatcher = any();

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::DefaultConstructor)
        .constructor(matcher)
        .intercept(StubMethod)
        .make()
        .unwrap();

    let class = read(unloaded.bytes());
    let init = class.method("<init>", "()V").unwrap();
    assert_eq!(init.code.as_ref().unwrap().instructions.len(), 3);
}

#[test]
fn ignored_methods_are_not_overridden() {
    let pool = pool();
    let everything: MethodMatcher = any();
    let finalize: MethodMatcher = named("finalize");

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .ignore_methods(named("toString").or(named("hashCode")))
        .method(everything.and(!finalize))
        .intercept(StubMethod)
        .make()
        .unwrap();

    let names: Vec<_> = read(unloaded.bytes())
        .methods
        .iter()
        .map(|m| m.name.clone())
        .collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    greet
    count
    internal
    address
    isReady
    setCount
    equals
    clone
    ");
}

#[test]
fn type_annotations() {
    let pool = pool();
    let base = describe(&pool, BASE);

    let unloaded = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .annotate_type(base.declared_annotations())
        .make()
        .unwrap();
    let copied = subclass(&pool, BASE, ConstructorStrategy::NoConstructors)
        .attribute(TypeAttributeAppender::ForType(base))
        .make()
        .unwrap();

    let dump = dump_image(unloaded.bytes());
    assert!(dump.ends_with(indoc! {r#"
        [annotations]
        @Ldemo/Marker; visible (value = "base")
        @Ldemo/Tag; invisible
    "#}));
    assert_eq!(unloaded.type_description().declared_annotations().len(), 2);
    let dump = dump_image(copied.bytes());
    assert!(dump.ends_with(indoc! {r#"
        [annotations]
        @Ldemo/Marker; visible (value = "base")
    "#}));
}

#[derive(Debug)]
struct CountMethods(Arc<AtomicUsize>);

struct Counter<'a> {
    inner: Box<dyn ClassVisitor + 'a>,
    count: Arc<AtomicUsize>,
}

impl ClassVisitor for Counter<'_> {
    fn visit(&mut self, header: ClassHeader) {
        self.inner.visit(header);
    }

    fn visit_annotation(&mut self, annotation: AnnotationNode) {
        self.inner.visit_annotation(annotation);
    }

    fn visit_field(&mut self, field: FieldNode) {
        self.inner.visit_field(field);
    }

    fn visit_method(&mut self, method: MethodNode) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.visit_method(method);
    }

    fn visit_end(&mut self) {
        self.inner.visit_end();
    }
}

impl ClassVisitorWrapper for CountMethods {
    fn wrap<'a>(&self, visitor: Box<dyn ClassVisitor + 'a>) -> Box<dyn ClassVisitor + 'a> {
        Box::new(Counter {
            inner: visitor,
            count: Arc::clone(&self.0),
        })
    }
}

#[test]
fn class_visitors_from_config_and_builder() {
    let pool = pool();
    let configured = Arc::new(AtomicUsize::new(0));
    let local = Arc::new(AtomicUsize::new(0));

    ClassForge::new()
        .with_class_visitor(Arc::new(CountMethods(Arc::clone(&configured))))
        .subclass(&describe(&pool, BASE), ConstructorStrategy::ImitateSuperType)
        .unwrap()
        .class_visitor(Arc::new(CountMethods(Arc::clone(&local))))
        .make()
        .unwrap();

    assert_eq!(configured.load(Ordering::SeqCst), 2);
    assert_eq!(local.load(Ordering::SeqCst), 2);
}

#[test]
fn type_initializer_is_written() {
    let pool = pool();

    let unloaded = subclass(&pool, lang::OBJECT, ConstructorStrategy::NoConstructors)
        .initialize(
            TypeInitializer::none()
                .append(StackManipulation::long(7))
                .append(StackManipulation::Pop(StackSize::Double)),
        )
        .make()
        .unwrap();

    insta::assert_snapshot!(dump_image(unloaded.bytes()), @r"
    [class]
    version = 52.0
    access = public super
    name = demo/Sub
    super = java/lang/Object

    [methods]
    static <clinit>()V
      stack = 2, locals = 0
      ldc2_w 7L
      pop2
      return
    ");
}
