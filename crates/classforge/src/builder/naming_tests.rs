use super::{NamingStrategy, random_suffix};
use crate::description::lang;
use crate::test_utils::{BASE, describe, pool};

#[test]
fn fixed_name() {
    let pool = pool();
    let strategy = NamingStrategy::Fixed("demo.Generated".into());

    assert_eq!(strategy.name(&describe(&pool, BASE)), "demo.Generated");
}

#[test]
fn suffixing_random_keeps_package() {
    let pool = pool();

    let name = NamingStrategy::default().name(&describe(&pool, BASE));

    let random = name.strip_prefix("demo.Base$ClassForge$").unwrap();
    assert_eq!(random.len(), 8);
}

#[test]
fn java_types_are_renamed() {
    let pool = pool();
    let strategy = NamingStrategy::suffixing_random("Proxy");

    let name = strategy.name(&describe(&pool, lang::OBJECT));

    assert!(name.starts_with("classforge.renamed.java.lang.Object$Proxy$"));
}

#[test]
fn random_names_differ() {
    let first = random_suffix();
    let second = random_suffix();

    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(first.len(), 8);
    assert_ne!(first, second);
}
