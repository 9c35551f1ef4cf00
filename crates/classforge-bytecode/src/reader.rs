//! Parses a class image back into nodes.

use crate::constant_pool::{
    TAG_CLASS, TAG_DOUBLE, TAG_DYNAMIC, TAG_FIELDREF, TAG_FLOAT, TAG_INTEGER,
    TAG_INTERFACE_METHODREF, TAG_INVOKE_DYNAMIC, TAG_LONG, TAG_METHOD_HANDLE, TAG_METHOD_TYPE,
    TAG_METHODREF, TAG_MODULE, TAG_NAME_AND_TYPE, TAG_PACKAGE, TAG_STRING, TAG_UTF8,
};
use crate::opcodes::{
    ALOAD, ANEWARRAY, ASTORE, BIPUSH, CHECKCAST, GETSTATIC, ILOAD, INSTANCEOF, INVOKEINTERFACE,
    INVOKEVIRTUAL, ISTORE, LDC, LDC_W, LDC2_W, NEW, NEWARRAY, PUTFIELD, SIPUSH, WIDE,
    expand_short_var, is_operandless, is_var_insn,
};
use crate::{
    AnnotationNode, AnnotationValue, ClassFileVersion, ClassHeader, ClassVisitor, Code, Constant,
    Error, FieldNode, Insn, LdcValue, MAGIC, MethodNode, Result, decode_modified_utf8,
};

/// A parsed class image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub header: ClassHeader,
    pub annotations: Vec<AnnotationNode>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
}

impl ClassFile {
    /// Replay the class through a visitor.
    pub fn accept(&self, visitor: &mut dyn ClassVisitor) {
        visitor.visit(self.header.clone());
        for annotation in &self.annotations {
            visitor.visit_annotation(annotation.clone());
        }
        for field in &self.fields {
            visitor.visit_field(field.clone());
        }
        for method in &self.methods {
            visitor.visit_method(method.clone());
        }
        visitor.visit_end();
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodNode> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Reads class images. With [`skip_code`](Self::skip_code) method bodies
/// are not decoded, which allows reading classes that use instructions
/// outside the supported set.
#[derive(Debug, Clone, Copy)]
pub struct ClassReader<'a> {
    bytes: &'a [u8],
    skip_code: bool,
}

impl<'a> ClassReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            skip_code: false,
        }
    }

    pub fn skip_code(mut self) -> Self {
        self.skip_code = true;
        self
    }

    pub fn read(&self) -> Result<ClassFile> {
        let mut c = Cursor::new(self.bytes);

        let magic = c.u32()?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        let minor = c.u16()?;
        let major = c.u16()?;
        let version = ClassFileVersion::new(major, minor);
        if version > ClassFileVersion::LATEST {
            return Err(Error::UnsupportedVersion(version));
        }

        let pool = Pool::read(&mut c)?;

        let access = c.u16()?;
        let name = pool.class_name(c.u16()?)?.to_string();
        let super_index = c.u16()?;
        let super_name = match super_index {
            0 => None,
            index => Some(pool.class_name(index)?.to_string()),
        };
        let interface_count = c.u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(c.u16()?)?.to_string());
        }

        let field_count = c.u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(self.read_field(&mut c, &pool)?);
        }

        let method_count = c.u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(self.read_method(&mut c, &pool)?);
        }

        let mut annotations = Vec::new();
        let attribute_count = c.u16()?;
        for _ in 0..attribute_count {
            let (name, content, offset) = read_attribute(&mut c, &pool)?;
            read_annotations_attribute(name, content, offset, &pool, &mut annotations)?;
        }

        Ok(ClassFile {
            header: ClassHeader {
                version,
                access,
                name,
                super_name,
                interfaces,
            },
            annotations,
            fields,
            methods,
        })
    }

    fn read_field(&self, c: &mut Cursor<'_>, pool: &Pool) -> Result<FieldNode> {
        let access = c.u16()?;
        let name = pool.utf8(c.u16()?)?.to_string();
        let descriptor = pool.utf8(c.u16()?)?.to_string();
        let mut annotations = Vec::new();
        let attribute_count = c.u16()?;
        for _ in 0..attribute_count {
            let (attr, content, offset) = read_attribute(c, pool)?;
            read_annotations_attribute(attr, content, offset, pool, &mut annotations)?;
        }
        Ok(FieldNode {
            access,
            name,
            descriptor,
            annotations,
        })
    }

    fn read_method(&self, c: &mut Cursor<'_>, pool: &Pool) -> Result<MethodNode> {
        let access = c.u16()?;
        let name = pool.utf8(c.u16()?)?.to_string();
        let descriptor = pool.utf8(c.u16()?)?.to_string();
        let mut exceptions = Vec::new();
        let mut annotations = Vec::new();
        let mut code = None;

        let attribute_count = c.u16()?;
        for _ in 0..attribute_count {
            let (attr, content, offset) = read_attribute(c, pool)?;
            match attr {
                "Code" if !self.skip_code => code = Some(read_code(content, offset, pool)?),
                "Exceptions" => {
                    let mut e = Cursor::at(content, offset);
                    let count = e.u16()?;
                    for _ in 0..count {
                        exceptions.push(pool.class_name(e.u16()?)?.to_string());
                    }
                }
                _ => read_annotations_attribute(attr, content, offset, pool, &mut annotations)?,
            }
        }

        Ok(MethodNode {
            access,
            name,
            descriptor,
            exceptions,
            annotations,
            code,
        })
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Offset of `bytes` within the whole image, for error reporting.
    base: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self::at(bytes, 0)
    }

    fn at(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
        }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(Error::UnexpectedEof(self.offset()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let hi = u64::from(self.u32()?);
        let lo = u64::from(self.u32()?);
        Ok((hi << 32) | lo)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

struct Pool {
    entries: Vec<Option<Constant>>,
}

impl Pool {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let count = c.u16()?;
        let mut entries = vec![None; count as usize];
        let mut index = 1usize;
        while index < count as usize {
            let tag = c.u8()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = c.u16()? as usize;
                    let start = c.offset();
                    Constant::Utf8(decode_modified_utf8(c.take(len)?, start)?)
                }
                TAG_INTEGER => Constant::Integer(c.u32()? as i32),
                TAG_FLOAT => Constant::Float(c.u32()?),
                TAG_LONG => Constant::Long(c.u64()? as i64),
                TAG_DOUBLE => Constant::Double(c.u64()?),
                TAG_CLASS => Constant::Class(c.u16()?),
                TAG_STRING => Constant::String(c.u16()?),
                TAG_FIELDREF => Constant::FieldRef {
                    class: c.u16()?,
                    name_and_type: c.u16()?,
                },
                TAG_METHODREF => Constant::MethodRef {
                    class: c.u16()?,
                    name_and_type: c.u16()?,
                },
                TAG_INTERFACE_METHODREF => Constant::InterfaceMethodRef {
                    class: c.u16()?,
                    name_and_type: c.u16()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name: c.u16()?,
                    descriptor: c.u16()?,
                },
                TAG_METHOD_HANDLE => Constant::MethodHandle {
                    kind: c.u8()?,
                    reference: c.u16()?,
                },
                TAG_METHOD_TYPE => Constant::MethodType(c.u16()?),
                TAG_DYNAMIC => Constant::Dynamic {
                    bootstrap: c.u16()?,
                    name_and_type: c.u16()?,
                },
                TAG_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                    bootstrap: c.u16()?,
                    name_and_type: c.u16()?,
                },
                TAG_MODULE => Constant::Module(c.u16()?),
                TAG_PACKAGE => Constant::Package(c.u16()?),
                _ => return Err(Error::InvalidConstant(index as u16)),
            };
            let slots = constant.slots() as usize;
            entries[index] = Some(constant);
            index += slots;
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidConstant(index))
    }

    fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(Error::InvalidConstant(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(Error::InvalidConstant(index)),
        }
    }

    fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(Error::InvalidConstant(index)),
        }
    }

    fn integer(&self, index: u16) -> Result<i32> {
        match self.get(index)? {
            Constant::Integer(v) => Ok(*v),
            _ => Err(Error::InvalidConstant(index)),
        }
    }

    fn long(&self, index: u16) -> Result<i64> {
        match self.get(index)? {
            Constant::Long(v) => Ok(*v),
            _ => Err(Error::InvalidConstant(index)),
        }
    }

    fn ldc_value(&self, index: u16) -> Result<LdcValue> {
        let value = match self.get(index)? {
            Constant::Integer(v) => LdcValue::Int(*v),
            Constant::Float(bits) => LdcValue::Float(*bits),
            Constant::Long(v) => LdcValue::Long(*v),
            Constant::Double(bits) => LdcValue::Double(*bits),
            Constant::String(s) => LdcValue::String(self.utf8(*s)?.to_string()),
            Constant::Class(name) => LdcValue::Class(self.utf8(*name)?.to_string()),
            _ => return Err(Error::InvalidConstant(index)),
        };
        Ok(value)
    }

    /// Owner, name, descriptor and interface flag of a field or method reference.
    fn member_ref(&self, index: u16) -> Result<(String, String, String, bool)> {
        let (class, name_and_type, interface) = match self.get(index)? {
            Constant::FieldRef {
                class,
                name_and_type,
            }
            | Constant::MethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type, false),
            Constant::InterfaceMethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type, true),
            _ => return Err(Error::InvalidConstant(index)),
        };
        let owner = self.class_name(class)?.to_string();
        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok((owner, name.to_string(), descriptor.to_string(), interface))
    }
}

/// Read one attribute, returning its name, content and content offset.
fn read_attribute<'a, 'p>(
    c: &mut Cursor<'a>,
    pool: &'p Pool,
) -> Result<(&'p str, &'a [u8], usize)> {
    let name = pool.utf8(c.u16()?)?;
    let len = c.u32()? as usize;
    let offset = c.offset();
    Ok((name, c.take(len)?, offset))
}

fn read_annotations_attribute(
    name: &str,
    content: &[u8],
    offset: usize,
    pool: &Pool,
    out: &mut Vec<AnnotationNode>,
) -> Result<()> {
    let visible = match name {
        "RuntimeVisibleAnnotations" => true,
        "RuntimeInvisibleAnnotations" => false,
        _ => return Ok(()),
    };
    let mut c = Cursor::at(content, offset);
    let count = c.u16()?;
    for _ in 0..count {
        let descriptor = pool.utf8(c.u16()?)?.to_string();
        let pairs = c.u16()?;
        let mut annotation = AnnotationNode::new(descriptor, visible);
        for _ in 0..pairs {
            let name = pool.utf8(c.u16()?)?.to_string();
            let value = read_element_value(&mut c, pool)?;
            annotation.values.push((name, value));
        }
        out.push(annotation);
    }
    Ok(())
}

fn read_element_value(c: &mut Cursor<'_>, pool: &Pool) -> Result<AnnotationValue> {
    let tag = c.u8()?;
    let value = match tag {
        b'Z' => AnnotationValue::Boolean(pool.integer(c.u16()?)? != 0),
        b'B' | b'C' | b'I' | b'S' => AnnotationValue::Int(pool.integer(c.u16()?)?),
        b'J' => AnnotationValue::Long(pool.long(c.u16()?)?),
        b's' => AnnotationValue::String(pool.utf8(c.u16()?)?.to_string()),
        b'c' => AnnotationValue::Class(pool.utf8(c.u16()?)?.to_string()),
        b'e' => AnnotationValue::Enum {
            descriptor: pool.utf8(c.u16()?)?.to_string(),
            name: pool.utf8(c.u16()?)?.to_string(),
        },
        b'[' => {
            let count = c.u16()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(c, pool)?);
            }
            AnnotationValue::Array(values)
        }
        other => return Err(Error::UnsupportedElementValue(other as char)),
    };
    Ok(value)
}

fn read_code(content: &[u8], offset: usize, pool: &Pool) -> Result<Code> {
    let mut c = Cursor::at(content, offset);
    let max_stack = c.u16()?;
    let max_locals = c.u16()?;
    let code_length = c.u32()? as usize;
    let code_offset = c.offset();
    let bytes = c.take(code_length)?;

    let mut code = Cursor::at(bytes, code_offset);
    let mut instructions = Vec::new();
    while !code.is_empty() {
        instructions.push(decode_insn(&mut code, pool)?);
    }

    Ok(Code {
        max_stack,
        max_locals,
        instructions,
    })
}

fn decode_insn(c: &mut Cursor<'_>, pool: &Pool) -> Result<Insn> {
    let offset = c.offset();
    let opcode = c.u8()?;
    if is_operandless(opcode) {
        return Ok(Insn::Op(opcode));
    }
    if let Some((opcode, index)) = expand_short_var(opcode) {
        return Ok(Insn::Var { opcode, index });
    }

    let insn = match opcode {
        BIPUSH => Insn::Push {
            opcode,
            value: i16::from(c.u8()? as i8),
        },
        SIPUSH => Insn::Push {
            opcode,
            value: c.u16()? as i16,
        },
        NEWARRAY => Insn::Push {
            opcode,
            value: i16::from(c.u8()?),
        },
        LDC => Insn::Ldc(pool.ldc_value(u16::from(c.u8()?))?),
        LDC_W | LDC2_W => Insn::Ldc(pool.ldc_value(c.u16()?)?),
        ILOAD..=ALOAD | ISTORE..=ASTORE => Insn::Var {
            opcode,
            index: u16::from(c.u8()?),
        },
        GETSTATIC..=PUTFIELD => {
            let (owner, name, descriptor, _) = pool.member_ref(c.u16()?)?;
            Insn::Field {
                opcode,
                owner,
                name,
                descriptor,
            }
        }
        INVOKEVIRTUAL..=INVOKEINTERFACE => {
            let (owner, name, descriptor, interface) = pool.member_ref(c.u16()?)?;
            if opcode == INVOKEINTERFACE {
                c.take(2)?;
            }
            Insn::Method {
                opcode,
                owner,
                name,
                descriptor,
                interface,
            }
        }
        NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => Insn::Type {
            opcode,
            type_name: pool.class_name(c.u16()?)?.to_string(),
        },
        WIDE => {
            let inner = c.u8()?;
            if !is_var_insn(inner) {
                return Err(Error::UnsupportedOpcode {
                    opcode: inner,
                    offset,
                });
            }
            Insn::Var {
                opcode: inner,
                index: c.u16()?,
            }
        }
        _ => return Err(Error::UnsupportedOpcode { opcode, offset }),
    };
    Ok(insn)
}
