//! Human-readable class dump for tests and debugging.
//!
//! Layout: a `[class]` section with the header, then `[annotations]`,
//! `[fields]` and `[methods]` sections, each omitted when empty. Methods list
//! their annotations, `stack`/`locals` and one instruction per line.

use std::fmt::Write as _;

use classforge_core::modifier::{
    ACC_ABSTRACT, ACC_ANNOTATION, ACC_BRIDGE, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_NATIVE,
    ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_STRICT, ACC_SUPER, ACC_SYNCHRONIZED,
    ACC_SYNTHETIC, ACC_TRANSIENT, ACC_VARARGS, ACC_VOLATILE,
};

use crate::ClassFile;

const CLASS_FLAGS: &[(u16, &str)] = &[
    (ACC_PUBLIC, "public"),
    (ACC_PRIVATE, "private"),
    (ACC_PROTECTED, "protected"),
    (ACC_STATIC, "static"),
    (ACC_FINAL, "final"),
    (ACC_SUPER, "super"),
    (ACC_INTERFACE, "interface"),
    (ACC_ABSTRACT, "abstract"),
    (ACC_SYNTHETIC, "synthetic"),
    (ACC_ANNOTATION, "annotation"),
    (ACC_ENUM, "enum"),
];

const FIELD_FLAGS: &[(u16, &str)] = &[
    (ACC_PUBLIC, "public"),
    (ACC_PRIVATE, "private"),
    (ACC_PROTECTED, "protected"),
    (ACC_STATIC, "static"),
    (ACC_FINAL, "final"),
    (ACC_VOLATILE, "volatile"),
    (ACC_TRANSIENT, "transient"),
    (ACC_SYNTHETIC, "synthetic"),
    (ACC_ENUM, "enum"),
];

const METHOD_FLAGS: &[(u16, &str)] = &[
    (ACC_PUBLIC, "public"),
    (ACC_PRIVATE, "private"),
    (ACC_PROTECTED, "protected"),
    (ACC_STATIC, "static"),
    (ACC_FINAL, "final"),
    (ACC_SYNCHRONIZED, "synchronized"),
    (ACC_BRIDGE, "bridge"),
    (ACC_VARARGS, "varargs"),
    (ACC_NATIVE, "native"),
    (ACC_ABSTRACT, "abstract"),
    (ACC_STRICT, "strict"),
    (ACC_SYNTHETIC, "synthetic"),
];

fn flags(access: u16, table: &[(u16, &str)]) -> String {
    table
        .iter()
        .filter(|(bit, _)| access & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

fn with_flags(access: u16, table: &[(u16, &str)], rest: &str) -> String {
    let flags = flags(access, table);
    if flags.is_empty() {
        rest.to_string()
    } else {
        format!("{flags} {rest}")
    }
}

/// Generate a human-readable dump of a parsed class.
pub fn dump(class: &ClassFile) -> String {
    let mut out = String::new();
    let header = &class.header;

    out.push_str("[class]\n");
    writeln!(out, "version = {}", header.version).unwrap();
    writeln!(out, "access = {}", flags(header.access, CLASS_FLAGS)).unwrap();
    writeln!(out, "name = {}", header.name).unwrap();
    if let Some(super_name) = &header.super_name {
        writeln!(out, "super = {super_name}").unwrap();
    }
    if !header.interfaces.is_empty() {
        writeln!(out, "interfaces = {}", header.interfaces.join(", ")).unwrap();
    }

    if !class.annotations.is_empty() {
        out.push_str("\n[annotations]\n");
        for annotation in &class.annotations {
            writeln!(out, "{annotation}").unwrap();
        }
    }

    if !class.fields.is_empty() {
        out.push_str("\n[fields]\n");
        for field in &class.fields {
            let rest = format!("{} {}", field.name, field.descriptor);
            writeln!(out, "{}", with_flags(field.access, FIELD_FLAGS, &rest)).unwrap();
            for annotation in &field.annotations {
                writeln!(out, "  {annotation}").unwrap();
            }
        }
    }

    if !class.methods.is_empty() {
        out.push_str("\n[methods]");
        for method in &class.methods {
            out.push('\n');
            let mut rest = format!("{}{}", method.name, method.descriptor);
            if !method.exceptions.is_empty() {
                write!(rest, " throws {}", method.exceptions.join(", ")).unwrap();
            }
            writeln!(out, "{}", with_flags(method.access, METHOD_FLAGS, &rest)).unwrap();
            for annotation in &method.annotations {
                writeln!(out, "  {annotation}").unwrap();
            }
            if let Some(code) = &method.code {
                writeln!(out, "  stack = {}, locals = {}", code.max_stack, code.max_locals)
                    .unwrap();
                for insn in &code.instructions {
                    writeln!(out, "  {insn}").unwrap();
                }
            }
        }
    }

    out
}
