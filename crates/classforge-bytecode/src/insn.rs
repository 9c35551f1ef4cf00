use std::fmt;

use crate::opcodes::{self, INVOKEINTERFACE, LDC, LDC2_W};

/// Value loaded by the `ldc` family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LdcValue {
    Int(i32),
    /// Raw IEEE-754 bits.
    Float(u32),
    Long(i64),
    /// Raw IEEE-754 bits.
    Double(u64),
    String(String),
    /// Class literal, by internal name or array descriptor.
    Class(String),
}

impl LdcValue {
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }
}

impl fmt::Display for LdcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(bits) => write!(f, "{}f", f32::from_bits(*bits)),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Double(bits) => write!(f, "{}d", f64::from_bits(*bits)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Class(name) => write!(f, "{name}.class"),
        }
    }
}

/// A symbolic instruction. Constant pool references are kept as names and
/// resolved when the method is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Insn {
    /// Instruction without operands.
    Op(u8),
    /// Local-variable load or store, by base opcode (`ILOAD`..`ASTORE`).
    Var { opcode: u8, index: u16 },
    /// `bipush`, `sipush` or `newarray`.
    Push { opcode: u8, value: i16 },
    Ldc(LdcValue),
    /// `new`, `anewarray`, `checkcast` or `instanceof`.
    Type { opcode: u8, type_name: String },
    Field {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    Method {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
        interface: bool,
    },
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |op: u8| opcodes::mnemonic(op).unwrap_or("???");
        match self {
            Self::Op(op) => f.write_str(name(*op)),
            Self::Var { opcode, index } => write!(f, "{} {index}", name(*opcode)),
            Self::Push { opcode, value } => write!(f, "{} {value}", name(*opcode)),
            Self::Ldc(value) => {
                let op = if value.is_wide() { LDC2_W } else { LDC };
                write!(f, "{} {value}", name(op))
            }
            Self::Type { opcode, type_name } => write!(f, "{} {type_name}", name(*opcode)),
            Self::Field {
                opcode,
                owner,
                name: field,
                descriptor,
            } => write!(f, "{} {owner}.{field}:{descriptor}", name(*opcode)),
            Self::Method {
                opcode,
                owner,
                name: method,
                descriptor,
                interface,
            } => {
                write!(f, "{} {owner}.{method}{descriptor}", name(*opcode))?;
                if *interface && *opcode != INVOKEINTERFACE {
                    f.write_str(" (interface)")?;
                }
                Ok(())
            }
        }
    }
}
