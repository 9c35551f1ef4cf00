//! Conversions between binary names and descriptors.
//!
//! Binary names follow `Class.getName()`: `int`, `java.lang.String`,
//! `[Ljava.lang.String;`, `[[I`. `void` is accepted as a return type.

use classforge_bytecode::FieldType;

use super::Primitive;

pub(crate) const VOID: &str = "void";

/// Descriptor of a type given by binary name.
pub(crate) fn descriptor_of(name: &str) -> String {
    if name == VOID {
        return "V".to_string();
    }
    if let Some(primitive) = Primitive::from_name(name) {
        return primitive.descriptor().to_string();
    }
    if name.starts_with('[') {
        return name.replace('.', "/");
    }
    format!("L{};", name.replace('.', "/"))
}

/// Binary name of a parsed field type.
pub(crate) fn binary_name_of(ty: &FieldType) -> String {
    match ty {
        FieldType::Object(internal) => internal.replace('/', "."),
        FieldType::Array(_) => ty.descriptor().replace('/', "."),
        primitive => Primitive::from_field_type(primitive)
            .map(|p| p.name().to_string())
            .unwrap_or_default(),
    }
}

/// Binary name of the array type with the given component.
pub(crate) fn array_name_of(component: &str) -> String {
    if component.starts_with('[') {
        format!("[{component}")
    } else if let Some(primitive) = Primitive::from_name(component) {
        format!("[{}", primitive.descriptor())
    } else {
        format!("[L{component};")
    }
}

/// Binary name of an array type's component, or `None` if `name` is not an
/// array name.
pub(crate) fn component_name_of(name: &str) -> Option<String> {
    let rest = name.strip_prefix('[')?;
    if rest.starts_with('[') {
        return Some(rest.to_string());
    }
    if let Some(class) = rest.strip_prefix('L').and_then(|r| r.strip_suffix(';')) {
        return (!class.is_empty()).then(|| class.to_string());
    }
    let mut chars = rest.chars();
    let primitive = Primitive::from_descriptor(chars.next()?)?;
    chars
        .next()
        .is_none()
        .then(|| primitive.name().to_string())
}

/// Normalize source-style array names (`java.lang.String[]`) to binary form.
pub(crate) fn normalize_name(name: &str) -> String {
    match name.strip_suffix("[]") {
        Some(component) => array_name_of(&normalize_name(component)),
        None => name.to_string(),
    }
}
