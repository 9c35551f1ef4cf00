//! Constant pool construction with deduplication.
//!
//! Entries are interned: asking twice for the same class, string or member
//! reference returns the same index. `long` and `double` entries occupy two
//! slots, as required by the format.

use std::collections::HashMap;

use crate::{Error, Result};

pub const TAG_UTF8: u8 = 1;
pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 4;
pub const TAG_LONG: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_CLASS: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_FIELDREF: u8 = 9;
pub const TAG_METHODREF: u8 = 10;
pub const TAG_INTERFACE_METHODREF: u8 = 11;
pub const TAG_NAME_AND_TYPE: u8 = 12;
pub const TAG_METHOD_HANDLE: u8 = 15;
pub const TAG_METHOD_TYPE: u8 = 16;
pub const TAG_DYNAMIC: u8 = 17;
pub const TAG_INVOKE_DYNAMIC: u8 = 18;
pub const TAG_MODULE: u8 = 19;
pub const TAG_PACKAGE: u8 = 20;

/// A constant pool entry. References to other entries are slot indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType(u16),
    Dynamic { bootstrap: u16, name_and_type: u16 },
    InvokeDynamic { bootstrap: u16, name_and_type: u16 },
    Module(u16),
    Package(u16),
}

impl Constant {
    pub fn slots(&self) -> u16 {
        match self {
            Self::Long(_) | Self::Double(_) => 2,
            _ => 1,
        }
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let pair = |out: &mut Vec<u8>, tag: u8, a: u16, b: u16| {
            out.push(tag);
            out.extend_from_slice(&a.to_be_bytes());
            out.extend_from_slice(&b.to_be_bytes());
        };
        let single = |out: &mut Vec<u8>, tag: u8, a: u16| {
            out.push(tag);
            out.extend_from_slice(&a.to_be_bytes());
        };

        match self {
            Self::Utf8(s) => {
                let bytes = encode_modified_utf8(s);
                let len =
                    u16::try_from(bytes.len()).map_err(|_| Error::StringTooLong(bytes.len()))?;
                out.push(TAG_UTF8);
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(&bytes);
            }
            Self::Integer(v) => {
                out.push(TAG_INTEGER);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Float(bits) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&bits.to_be_bytes());
            }
            Self::Long(v) => {
                out.push(TAG_LONG);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Double(bits) => {
                out.push(TAG_DOUBLE);
                out.extend_from_slice(&bits.to_be_bytes());
            }
            Self::Class(name) => single(out, TAG_CLASS, *name),
            Self::String(value) => single(out, TAG_STRING, *value),
            Self::FieldRef {
                class,
                name_and_type,
            } => pair(out, TAG_FIELDREF, *class, *name_and_type),
            Self::MethodRef {
                class,
                name_and_type,
            } => pair(out, TAG_METHODREF, *class, *name_and_type),
            Self::InterfaceMethodRef {
                class,
                name_and_type,
            } => pair(out, TAG_INTERFACE_METHODREF, *class, *name_and_type),
            Self::NameAndType { name, descriptor } => {
                pair(out, TAG_NAME_AND_TYPE, *name, *descriptor)
            }
            Self::MethodHandle { kind, reference } => {
                out.push(TAG_METHOD_HANDLE);
                out.push(*kind);
                out.extend_from_slice(&reference.to_be_bytes());
            }
            Self::MethodType(descriptor) => single(out, TAG_METHOD_TYPE, *descriptor),
            Self::Dynamic {
                bootstrap,
                name_and_type,
            } => pair(out, TAG_DYNAMIC, *bootstrap, *name_and_type),
            Self::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => pair(out, TAG_INVOKE_DYNAMIC, *bootstrap, *name_and_type),
            Self::Module(name) => single(out, TAG_MODULE, *name),
            Self::Package(name) => single(out, TAG_PACKAGE, *name),
        }
        Ok(())
    }
}

/// Builds a constant pool, interning every entry.
#[derive(Debug, Clone)]
pub struct ConstantPoolBuilder {
    entries: Vec<Constant>,
    indices: HashMap<Constant, u16>,
    /// Next free slot. Slot 0 is reserved by the format.
    next: u32,
}

impl Default for ConstantPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPoolBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            indices: HashMap::new(),
            next: 1,
        }
    }

    /// Intern an entry, returning its slot.
    pub fn put(&mut self, constant: Constant) -> Result<u16> {
        if let Some(&index) = self.indices.get(&constant) {
            return Ok(index);
        }
        let index = u16::try_from(self.next).map_err(|_| Error::ConstantPoolOverflow)?;
        let next = self.next + u32::from(constant.slots());
        if next > u32::from(u16::MAX) {
            return Err(Error::ConstantPoolOverflow);
        }
        self.next = next;
        self.indices.insert(constant.clone(), index);
        self.entries.push(constant);
        Ok(index)
    }

    pub fn utf8(&mut self, value: &str) -> Result<u16> {
        self.put(Constant::Utf8(value.to_string()))
    }

    pub fn class(&mut self, internal_name: &str) -> Result<u16> {
        let name = self.utf8(internal_name)?;
        self.put(Constant::Class(name))
    }

    pub fn string(&mut self, value: &str) -> Result<u16> {
        let value = self.utf8(value)?;
        self.put(Constant::String(value))
    }

    pub fn integer(&mut self, value: i32) -> Result<u16> {
        self.put(Constant::Integer(value))
    }

    pub fn float(&mut self, bits: u32) -> Result<u16> {
        self.put(Constant::Float(bits))
    }

    pub fn long(&mut self, value: i64) -> Result<u16> {
        self.put(Constant::Long(value))
    }

    pub fn double(&mut self, bits: u64) -> Result<u16> {
        self.put(Constant::Double(bits))
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.put(Constant::NameAndType { name, descriptor })
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.put(Constant::FieldRef {
            class,
            name_and_type,
        })
    }

    pub fn method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
        interface: bool,
    ) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        if interface {
            self.put(Constant::InterfaceMethodRef {
                class,
                name_and_type,
            })
        } else {
            self.put(Constant::MethodRef {
                class,
                name_and_type,
            })
        }
    }

    /// Number of slots in use, excluding the reserved slot 0.
    pub fn len(&self) -> usize {
        (self.next - 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as `constant_pool_count` followed by the entries.
    pub fn emit(&self, out: &mut Vec<u8>) -> Result<()> {
        let count = u16::try_from(self.next).map_err(|_| Error::ConstantPoolOverflow)?;
        out.extend_from_slice(&count.to_be_bytes());
        for entry in &self.entries {
            entry.write(out)?;
        }
        Ok(())
    }
}

/// Encode a string in the modified UTF-8 of the class-file format: NUL is
/// two bytes and supplementary characters are surrogate pairs.
pub fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

/// Decode modified UTF-8. `base` is the offset reported on error.
pub fn decode_modified_utf8(bytes: &[u8], base: usize) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let cont = |k: usize| -> Result<u16> {
            match bytes.get(i + k) {
                Some(&c) if c & 0xc0 == 0x80 => Ok(u16::from(c & 0x3f)),
                _ => Err(Error::MalformedUtf8(base + i)),
            }
        };
        if b & 0x80 == 0 && b != 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xe0 == 0xc0 {
            units.push((u16::from(b & 0x1f) << 6) | cont(1)?);
            i += 2;
        } else if b & 0xf0 == 0xe0 {
            units.push((u16::from(b & 0x0f) << 12) | (cont(1)? << 6) | cont(2)?);
            i += 3;
        } else {
            return Err(Error::MalformedUtf8(base + i));
        }
    }
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::MalformedUtf8(base))
}
