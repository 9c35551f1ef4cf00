//! The visitor contract a class image is produced through.
//!
//! A producer calls `visit` once, then any number of `visit_annotation`,
//! `visit_field` and `visit_method`, then `visit_end`. Fields and methods are
//! assembled with [`FieldVisitor`] and [`MethodVisitor`] and handed over as
//! finished nodes.

use crate::{AnnotationNode, ClassFileVersion, Insn, LdcValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub version: ClassFileVersion,
    pub access: u16,
    /// Internal name (`demo/Foo`).
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
}

pub trait ClassVisitor {
    fn visit(&mut self, header: ClassHeader);
    fn visit_annotation(&mut self, annotation: AnnotationNode);
    fn visit_field(&mut self, field: FieldNode);
    fn visit_method(&mut self, method: MethodNode);
    fn visit_end(&mut self);
}

impl<V: ClassVisitor + ?Sized> ClassVisitor for &mut V {
    fn visit(&mut self, header: ClassHeader) {
        (**self).visit(header)
    }

    fn visit_annotation(&mut self, annotation: AnnotationNode) {
        (**self).visit_annotation(annotation)
    }

    fn visit_field(&mut self, field: FieldNode) {
        (**self).visit_field(field)
    }

    fn visit_method(&mut self, method: MethodNode) {
        (**self).visit_method(method)
    }

    fn visit_end(&mut self) {
        (**self).visit_end()
    }
}

impl<V: ClassVisitor + ?Sized> ClassVisitor for Box<V> {
    fn visit(&mut self, header: ClassHeader) {
        (**self).visit(header)
    }

    fn visit_annotation(&mut self, annotation: AnnotationNode) {
        (**self).visit_annotation(annotation)
    }

    fn visit_field(&mut self, field: FieldNode) {
        (**self).visit_field(field)
    }

    fn visit_method(&mut self, method: MethodNode) {
        (**self).visit_method(method)
    }

    fn visit_end(&mut self) {
        (**self).visit_end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<AnnotationNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<Insn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNode {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    /// Internal names of the declared exceptions.
    pub exceptions: Vec<String>,
    pub annotations: Vec<AnnotationNode>,
    /// `None` for abstract and native methods.
    pub code: Option<Code>,
}

#[derive(Debug)]
pub struct FieldVisitor {
    node: FieldNode,
}

impl FieldVisitor {
    pub fn new(access: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            node: FieldNode {
                access,
                name: name.into(),
                descriptor: descriptor.into(),
                annotations: Vec::new(),
            },
        }
    }

    pub fn visit_annotation(&mut self, annotation: AnnotationNode) {
        self.node.annotations.push(annotation);
    }

    pub fn visit_end(self) -> FieldNode {
        self.node
    }
}

/// Records a method's instructions and attributes.
#[derive(Debug)]
pub struct MethodVisitor {
    node: MethodNode,
    code: Option<Code>,
}

impl MethodVisitor {
    pub fn new(
        access: u16,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        exceptions: Vec<String>,
    ) -> Self {
        Self {
            node: MethodNode {
                access,
                name: name.into(),
                descriptor: descriptor.into(),
                exceptions,
                annotations: Vec::new(),
                code: None,
            },
            code: None,
        }
    }

    pub fn access(&self) -> u16 {
        self.node.access
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn visit_annotation(&mut self, annotation: AnnotationNode) {
        self.node.annotations.push(annotation);
    }

    fn push(&mut self, insn: Insn) {
        self.code.get_or_insert_with(Code::default).instructions.push(insn);
    }

    pub fn visit_insn(&mut self, opcode: u8) {
        self.push(Insn::Op(opcode));
    }

    pub fn visit_var_insn(&mut self, opcode: u8, index: u16) {
        self.push(Insn::Var { opcode, index });
    }

    pub fn visit_int_insn(&mut self, opcode: u8, value: i16) {
        self.push(Insn::Push { opcode, value });
    }

    pub fn visit_ldc_insn(&mut self, value: LdcValue) {
        self.push(Insn::Ldc(value));
    }

    pub fn visit_type_insn(&mut self, opcode: u8, type_name: &str) {
        self.push(Insn::Type {
            opcode,
            type_name: type_name.to_string(),
        });
    }

    pub fn visit_field_insn(&mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) {
        self.push(Insn::Field {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
    }

    pub fn visit_method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
        interface: bool,
    ) {
        self.push(Insn::Method {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            interface,
        });
    }

    pub fn visit_maxs(&mut self, max_stack: u16, max_locals: u16) {
        let code = self.code.get_or_insert_with(Code::default);
        code.max_stack = max_stack;
        code.max_locals = max_locals;
    }

    pub fn instructions(&self) -> &[Insn] {
        self.code
            .as_ref()
            .map_or(&[][..], |code| code.instructions.as_slice())
    }

    pub fn visit_end(mut self) -> MethodNode {
        self.node.code = self.code;
        self.node
    }
}
