use crate::ClassFileVersion;

/// Errors raised while writing or reading a class image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("constant pool overflow: more than 65535 slots")]
    ConstantPoolOverflow,

    #[error("string constant too long: {0} bytes (maximum 65535)")]
    StringTooLong(usize),

    #[error("method {0} has more than 65535 bytes of code")]
    CodeTooLarge(String),

    #[error("class header was never visited")]
    MissingHeader,

    #[error("invalid magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("unsupported class-file version {0}")]
    UnsupportedVersion(ClassFileVersion),

    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("invalid constant pool reference #{0}")]
    InvalidConstant(u16),

    #[error("malformed modified UTF-8 at offset {0}")]
    MalformedUtf8(usize),

    #[error("unsupported opcode {opcode:#04x} at offset {offset}")]
    UnsupportedOpcode { opcode: u8, offset: usize },

    #[error("unsupported annotation element tag '{0}'")]
    UnsupportedElementValue(char),
}

pub type Result<T> = std::result::Result<T, Error>;
