use std::collections::BTreeMap;
use std::fmt;

use classforge_bytecode::{AnnotationNode, AnnotationValue};

use super::{TypeDescription, lang, names};

/// An annotation as declared on an element: type name plus element values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationToken {
    pub(crate) annotation_type: String,
    pub(crate) values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationToken {
    pub fn new(annotation_type: impl Into<String>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn annotation_type_name(&self) -> &str {
        &self.annotation_type
    }

    pub(crate) fn describe(&self, owner: &TypeDescription) -> AnnotationDescription {
        AnnotationDescription {
            annotation_type: owner.resolve(&self.annotation_type),
            values: self.values.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

impl RetentionPolicy {
    fn from_constant(name: &str) -> Option<Self> {
        match name {
            "SOURCE" => Some(Self::Source),
            "CLASS" => Some(Self::Class),
            "RUNTIME" => Some(Self::Runtime),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationDescription {
    annotation_type: TypeDescription,
    values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationDescription {
    pub fn annotation_type(&self) -> &TypeDescription {
        &self.annotation_type
    }

    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.values
    }

    /// Read from the annotation type's `@Retention`; class retention when
    /// absent.
    pub fn retention(&self) -> RetentionPolicy {
        self.annotation_type
            .data()
            .annotations
            .iter()
            .filter(|token| token.annotation_type == lang::RETENTION)
            .find_map(|token| match token.values.get("value") {
                Some(AnnotationValue::Enum { name, .. }) => RetentionPolicy::from_constant(name),
                _ => None,
            })
            .unwrap_or(RetentionPolicy::Class)
    }

    /// Whether the annotation type is meta-annotated with `@Inherited`.
    pub fn is_inherited(&self) -> bool {
        self.annotation_type
            .data()
            .annotations
            .iter()
            .any(|token| token.annotation_type == lang::INHERITED)
    }

    /// The class-file form, or `None` for source-retained annotations.
    pub fn to_node(&self) -> Option<AnnotationNode> {
        let visible = match self.retention() {
            RetentionPolicy::Source => return None,
            RetentionPolicy::Class => false,
            RetentionPolicy::Runtime => true,
        };
        let mut node =
            AnnotationNode::new(names::descriptor_of(self.annotation_type.name()), visible);
        for (name, value) in &self.values {
            node = node.with_value(name.clone(), value.clone());
        }
        Some(node)
    }

    pub fn to_token(&self) -> AnnotationToken {
        AnnotationToken {
            annotation_type: self.annotation_type.name().to_string(),
            values: self.values.clone(),
        }
    }
}

impl fmt::Display for AnnotationDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.annotation_type.name())?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}
