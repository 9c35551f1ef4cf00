use std::fmt;

/// An annotation element value. Floating-point and `byte`/`char`/`short`
/// elements are outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationValue {
    Boolean(bool),
    Int(i32),
    Long(i64),
    String(String),
    /// Class literal, by field descriptor.
    Class(String),
    Enum { descriptor: String, name: String },
    Array(Vec<AnnotationValue>),
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Class(descriptor) => write!(f, "{descriptor}.class"),
            Self::Enum { descriptor, name } => write!(f, "{descriptor}.{name}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// An annotation as written to a `Runtime(In)VisibleAnnotations` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationNode {
    /// Field descriptor of the annotation type.
    pub descriptor: String,
    /// Runtime-visible rather than class-retained.
    pub visible: bool,
    pub values: Vec<(String, AnnotationValue)>,
}

impl AnnotationNode {
    pub fn new(descriptor: impl Into<String>, visible: bool) -> Self {
        Self {
            descriptor: descriptor.into(),
            visible,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.push((name.into(), value));
        self
    }
}

impl fmt::Display for AnnotationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let retention = if self.visible { "visible" } else { "invisible" };
        write!(f, "@{} {retention}", self.descriptor)?;
        if self.values.is_empty() {
            return Ok(());
        }
        f.write_str(" (")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}
