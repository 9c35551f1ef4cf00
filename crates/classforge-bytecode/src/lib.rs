#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Class-file backend for classforge.
//!
//! This crate contains:
//! - Format definitions (versions, opcodes, descriptors, constant pool)
//! - The visitor contract a class image is produced through
//! - `ClassWriter` (visitor → bytes) and `ClassReader` (bytes → nodes)
//! - A textual dump of parsed classes for tests and debugging

mod annotation;
mod constant_pool;
mod descriptor;
mod dump;
mod error;
mod insn;
pub mod opcodes;
mod reader;
mod version;
mod visitor;
mod writer;

#[cfg(test)]
mod reader_tests;

pub use annotation::{AnnotationNode, AnnotationValue};
pub use constant_pool::{Constant, ConstantPoolBuilder, decode_modified_utf8, encode_modified_utf8};
pub use descriptor::{FieldType, MethodDescriptor};
pub use dump::dump;
pub use error::{Error, Result};
pub use insn::{Insn, LdcValue};
pub use reader::{ClassFile, ClassReader};
pub use version::ClassFileVersion;
pub use visitor::{
    ClassHeader, ClassVisitor, Code, FieldNode, FieldVisitor, MethodNode, MethodVisitor,
};
pub use writer::ClassWriter;

/// Magic number opening every class file.
pub const MAGIC: u32 = 0xCAFE_BABE;
