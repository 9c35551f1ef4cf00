//! Serializes visited class structure into a class image.

use crate::opcodes::{BIPUSH, INVOKEINTERFACE, LDC, LDC_W, LDC2_W, NEWARRAY, WIDE, short_var};
use crate::{
    AnnotationNode, AnnotationValue, ClassHeader, ClassVisitor, Code, ConstantPoolBuilder, Error,
    FieldNode, Insn, LdcValue, MAGIC, MethodDescriptor, MethodNode, Result,
};

const CODE: &str = "Code";
const EXCEPTIONS: &str = "Exceptions";
const VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";

/// Collects a visitor sequence and emits the class image on demand.
///
/// Only straight-line code is produced, so no `StackMapTable` is needed.
#[derive(Debug, Default)]
pub struct ClassWriter {
    header: Option<ClassHeader>,
    annotations: Vec<AnnotationNode>,
    fields: Vec<FieldNode>,
    methods: Vec<MethodNode>,
}

impl ClassVisitor for ClassWriter {
    fn visit(&mut self, header: ClassHeader) {
        self.header = Some(header);
    }

    fn visit_annotation(&mut self, annotation: AnnotationNode) {
        self.annotations.push(annotation);
    }

    fn visit_field(&mut self, field: FieldNode) {
        self.fields.push(field);
    }

    fn visit_method(&mut self, method: MethodNode) {
        self.methods.push(method);
    }

    fn visit_end(&mut self) {}
}

impl ClassWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let header = self.header.as_ref().ok_or(Error::MissingHeader)?;
        let mut pool = ConstantPoolBuilder::new();
        let mut body = Vec::new();

        put_u16(&mut body, header.access);
        put_u16(&mut body, pool.class(&header.name)?);
        let super_index = match &header.super_name {
            Some(name) => pool.class(name)?,
            None => 0,
        };
        put_u16(&mut body, super_index);
        put_len(&mut body, header.interfaces.len())?;
        for interface in &header.interfaces {
            put_u16(&mut body, pool.class(interface)?);
        }

        put_len(&mut body, self.fields.len())?;
        for field in &self.fields {
            write_field(&mut body, &mut pool, field)?;
        }

        put_len(&mut body, self.methods.len())?;
        for method in &self.methods {
            write_method(&mut body, &mut pool, method)?;
        }

        let mut attributes = Vec::new();
        let count = write_annotation_attributes(&mut attributes, &mut pool, &self.annotations)?;
        put_u16(&mut body, count);
        body.extend_from_slice(&attributes);

        let mut out = Vec::with_capacity(body.len() + 64);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        put_u16(&mut out, header.version.minor());
        put_u16(&mut out, header.version.major());
        pool.emit(&mut out)?;
        out.extend_from_slice(&body);
        Ok(out)
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u16::try_from(len).map_err(|_| Error::ConstantPoolOverflow)?;
    put_u16(out, len);
    Ok(())
}

/// Write `name_index`, `attribute_length` and `content`.
fn put_attribute(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolBuilder,
    name: &str,
    content: &[u8],
) -> Result<()> {
    put_u16(out, pool.utf8(name)?);
    put_u32(out, content.len() as u32);
    out.extend_from_slice(content);
    Ok(())
}

fn write_field(out: &mut Vec<u8>, pool: &mut ConstantPoolBuilder, field: &FieldNode) -> Result<()> {
    put_u16(out, field.access);
    put_u16(out, pool.utf8(&field.name)?);
    put_u16(out, pool.utf8(&field.descriptor)?);

    let mut attributes = Vec::new();
    let count = write_annotation_attributes(&mut attributes, pool, &field.annotations)?;
    put_u16(out, count);
    out.extend_from_slice(&attributes);
    Ok(())
}

fn write_method(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolBuilder,
    method: &MethodNode,
) -> Result<()> {
    put_u16(out, method.access);
    put_u16(out, pool.utf8(&method.name)?);
    put_u16(out, pool.utf8(&method.descriptor)?);

    let mut attributes = Vec::new();
    let mut count = 0u16;

    if let Some(code) = &method.code {
        let content = write_code(pool, method, code)?;
        put_attribute(&mut attributes, pool, CODE, &content)?;
        count += 1;
    }

    if !method.exceptions.is_empty() {
        let mut content = Vec::new();
        put_len(&mut content, method.exceptions.len())?;
        for exception in &method.exceptions {
            put_u16(&mut content, pool.class(exception)?);
        }
        put_attribute(&mut attributes, pool, EXCEPTIONS, &content)?;
        count += 1;
    }

    count += write_annotation_attributes(&mut attributes, pool, &method.annotations)?;

    put_u16(out, count);
    out.extend_from_slice(&attributes);
    Ok(())
}

fn write_code(pool: &mut ConstantPoolBuilder, method: &MethodNode, code: &Code) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for insn in &code.instructions {
        encode_insn(&mut bytes, pool, insn)?;
    }
    let code_length =
        u16::try_from(bytes.len()).map_err(|_| Error::CodeTooLarge(method.name.clone()))?;

    let mut content = Vec::with_capacity(bytes.len() + 12);
    put_u16(&mut content, code.max_stack);
    put_u16(&mut content, code.max_locals);
    put_u32(&mut content, u32::from(code_length));
    content.extend_from_slice(&bytes);
    // exception_table_length, attributes_count
    put_u16(&mut content, 0);
    put_u16(&mut content, 0);
    Ok(content)
}

fn encode_insn(out: &mut Vec<u8>, pool: &mut ConstantPoolBuilder, insn: &Insn) -> Result<()> {
    match insn {
        Insn::Op(opcode) => out.push(*opcode),
        Insn::Var { opcode, index } => {
            if let Some(short) = short_var(*opcode, *index) {
                out.push(short);
            } else if let Ok(index) = u8::try_from(*index) {
                out.push(*opcode);
                out.push(index);
            } else {
                out.push(WIDE);
                out.push(*opcode);
                put_u16(out, *index);
            }
        }
        Insn::Push { opcode, value } => {
            out.push(*opcode);
            match *opcode {
                BIPUSH => out.push(*value as i8 as u8),
                NEWARRAY => out.push(*value as u8),
                _ => out.extend_from_slice(&value.to_be_bytes()),
            }
        }
        Insn::Ldc(value) => {
            let index = match value {
                LdcValue::Int(v) => pool.integer(*v)?,
                LdcValue::Float(bits) => pool.float(*bits)?,
                LdcValue::Long(v) => pool.long(*v)?,
                LdcValue::Double(bits) => pool.double(*bits)?,
                LdcValue::String(s) => pool.string(s)?,
                LdcValue::Class(name) => pool.class(name)?,
            };
            if value.is_wide() {
                out.push(LDC2_W);
                put_u16(out, index);
            } else if let Ok(index) = u8::try_from(index) {
                out.push(LDC);
                out.push(index);
            } else {
                out.push(LDC_W);
                put_u16(out, index);
            }
        }
        Insn::Type { opcode, type_name } => {
            out.push(*opcode);
            put_u16(out, pool.class(type_name)?);
        }
        Insn::Field {
            opcode,
            owner,
            name,
            descriptor,
        } => {
            out.push(*opcode);
            put_u16(out, pool.field_ref(owner, name, descriptor)?);
        }
        Insn::Method {
            opcode,
            owner,
            name,
            descriptor,
            interface,
        } => {
            out.push(*opcode);
            put_u16(out, pool.method_ref(owner, name, descriptor, *interface)?);
            if *opcode == INVOKEINTERFACE {
                let count = MethodDescriptor::parse(descriptor)?.parameter_size() + 1;
                out.push(count as u8);
                out.push(0);
            }
        }
    }
    Ok(())
}

/// Write up to two annotation attributes, returning how many were written.
fn write_annotation_attributes(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolBuilder,
    annotations: &[AnnotationNode],
) -> Result<u16> {
    let mut count = 0;
    for (visible, name) in [(true, VISIBLE_ANNOTATIONS), (false, INVISIBLE_ANNOTATIONS)] {
        let selected: Vec<_> = annotations.iter().filter(|a| a.visible == visible).collect();
        if selected.is_empty() {
            continue;
        }
        let mut content = Vec::new();
        put_len(&mut content, selected.len())?;
        for annotation in selected {
            write_annotation(&mut content, pool, annotation)?;
        }
        put_attribute(out, pool, name, &content)?;
        count += 1;
    }
    Ok(count)
}

fn write_annotation(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolBuilder,
    annotation: &AnnotationNode,
) -> Result<()> {
    put_u16(out, pool.utf8(&annotation.descriptor)?);
    put_len(out, annotation.values.len())?;
    for (name, value) in &annotation.values {
        put_u16(out, pool.utf8(name)?);
        write_element_value(out, pool, value)?;
    }
    Ok(())
}

fn write_element_value(
    out: &mut Vec<u8>,
    pool: &mut ConstantPoolBuilder,
    value: &AnnotationValue,
) -> Result<()> {
    match value {
        AnnotationValue::Boolean(v) => {
            out.push(b'Z');
            put_u16(out, pool.integer(i32::from(*v))?);
        }
        AnnotationValue::Int(v) => {
            out.push(b'I');
            put_u16(out, pool.integer(*v)?);
        }
        AnnotationValue::Long(v) => {
            out.push(b'J');
            put_u16(out, pool.long(*v)?);
        }
        AnnotationValue::String(s) => {
            out.push(b's');
            put_u16(out, pool.utf8(s)?);
        }
        AnnotationValue::Class(descriptor) => {
            out.push(b'c');
            put_u16(out, pool.utf8(descriptor)?);
        }
        AnnotationValue::Enum { descriptor, name } => {
            out.push(b'e');
            put_u16(out, pool.utf8(descriptor)?);
            put_u16(out, pool.utf8(name)?);
        }
        AnnotationValue::Array(values) => {
            out.push(b'[');
            put_len(out, values.len())?;
            for value in values {
                write_element_value(out, pool, value)?;
            }
        }
    }
    Ok(())
}
