//! JVM field and method descriptors (JVMS §4.3).

use std::fmt;

use crate::{Error, Result};

/// The type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// Class or interface, by internal name (`java/lang/Object`).
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut pos = 0;
        let ty = parse_field_type(descriptor, &mut pos)?;
        if pos != descriptor.len() {
            return Err(Error::InvalidDescriptor(descriptor.to_string()));
        }
        Ok(ty)
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    /// Number of local-variable or operand-stack slots a value occupies.
    pub fn size(&self) -> u16 {
        match self {
            Self::Long | Self::Double => 2,
            _ => 1,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("B"),
            Self::Char => f.write_str("C"),
            Self::Double => f.write_str("D"),
            Self::Float => f.write_str("F"),
            Self::Int => f.write_str("I"),
            Self::Long => f.write_str("J"),
            Self::Short => f.write_str("S"),
            Self::Boolean => f.write_str("Z"),
            Self::Object(name) => write!(f, "L{name};"),
            Self::Array(component) => write!(f, "[{component}"),
        }
    }
}

/// Parameter types and return type of a method. `None` is `void`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn new(parameters: Vec<FieldType>, return_type: Option<FieldType>) -> Self {
        Self {
            parameters,
            return_type,
        }
    }

    pub fn parse(descriptor: &str) -> Result<Self> {
        let invalid = || Error::InvalidDescriptor(descriptor.to_string());
        let rest = descriptor.strip_prefix('(').ok_or_else(invalid)?;
        let close = rest.find(')').ok_or_else(invalid)?;

        let params = &rest[..close];
        let mut parameters = Vec::new();
        let mut pos = 0;
        while pos < params.len() {
            parameters.push(parse_field_type(params, &mut pos).map_err(|_| invalid())?);
        }

        let ret = &rest[close + 1..];
        let return_type = if ret == "V" {
            None
        } else {
            Some(FieldType::parse(ret).map_err(|_| invalid())?)
        };

        Ok(Self {
            parameters,
            return_type,
        })
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    /// Slots taken by the arguments, excluding any receiver.
    pub fn parameter_size(&self) -> u16 {
        self.parameters.iter().map(FieldType::size).sum()
    }

    pub fn return_size(&self) -> u16 {
        self.return_type.as_ref().map_or(0, FieldType::size)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.parameters {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(ty) => write!(f, "{ty}"),
            None => f.write_str("V"),
        }
    }
}

fn parse_field_type(s: &str, pos: &mut usize) -> Result<FieldType> {
    let invalid = || Error::InvalidDescriptor(s.to_string());
    let tag = *s.as_bytes().get(*pos).ok_or_else(invalid)?;
    *pos += 1;
    let ty = match tag {
        b'B' => FieldType::Byte,
        b'C' => FieldType::Char,
        b'D' => FieldType::Double,
        b'F' => FieldType::Float,
        b'I' => FieldType::Int,
        b'J' => FieldType::Long,
        b'S' => FieldType::Short,
        b'Z' => FieldType::Boolean,
        b'L' => {
            let end = s[*pos..].find(';').ok_or_else(invalid)? + *pos;
            let name = &s[*pos..end];
            if name.is_empty() {
                return Err(invalid());
            }
            *pos = end + 1;
            FieldType::Object(name.to_string())
        }
        b'[' => FieldType::Array(Box::new(parse_field_type(s, pos)?)),
        _ => return Err(invalid()),
    };
    Ok(ty)
}
