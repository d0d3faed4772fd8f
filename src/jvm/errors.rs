use std::fmt;

/// Reasons decoding a class file (or part of one) can fail
///
/// Every variant is terminal: a failed decode never hands back a partially populated structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// First four bytes are not `0xCAFEBABE`
    NotRecognizedFormat,

    /// A fixed-size read needed more bytes than were left
    UnexpectedEndOfInput { needed: usize, remaining: usize },

    /// Constant pool entry tag that isn't part of the format
    UndefinedConstantTag(u8),

    /// Bytes were left over after the last attribute of the class
    TrailingBytes(usize),

    /// Constant pool count is zero, or an 8-byte constant overruns the declared count
    InvalidConstantPoolCount(u16),

    /// Index is zero, out of range, or points at the unusable half of a `Long`/`Double`
    InvalidConstantIndex(u16),

    /// Index points at a valid constant, but not of the kind required
    UnexpectedConstant { index: u16, expected: &'static str },

    /// `CONSTANT_MethodHandle` with a reference kind outside `1..=9`
    InvalidHandleKind(u8),

    /// Utf8 constant at this index is not valid modified UTF-8
    MalformedUtf8(u16),

    /// Field or method descriptor that doesn't parse
    BadDescriptor(String),

    /// A typed attribute did not consume exactly its declared length
    AttributeLengthMismatch { name: &'static str, declared: usize, used: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NotRecognizedFormat => write!(f, "not a recognized class format"),
            DecodeError::UnexpectedEndOfInput { needed, remaining } => write!(
                f,
                "unexpected end of input (needed {} bytes, {} remaining)",
                needed, remaining
            ),
            DecodeError::UndefinedConstantTag(tag) => write!(f, "undefined constant tag {}", tag),
            DecodeError::TrailingBytes(count) => {
                write!(f, "{} trailing bytes after class file", count)
            }
            DecodeError::InvalidConstantPoolCount(count) => {
                write!(f, "invalid constant pool count {}", count)
            }
            DecodeError::InvalidConstantIndex(index) => {
                write!(f, "invalid constant pool index #{}", index)
            }
            DecodeError::UnexpectedConstant { index, expected } => {
                write!(f, "constant #{} is not a {}", index, expected)
            }
            DecodeError::InvalidHandleKind(kind) => {
                write!(f, "invalid method handle reference kind {}", kind)
            }
            DecodeError::MalformedUtf8(index) => {
                write!(f, "constant #{} is not valid modified UTF-8", index)
            }
            DecodeError::BadDescriptor(msg) => write!(f, "bad descriptor: {}", msg),
            DecodeError::AttributeLengthMismatch {
                name,
                declared,
                used,
            } => write!(
                f,
                "{} attribute declares {} bytes but its contents use {}",
                name, declared, used
            ),
        }
    }
}

impl std::error::Error for DecodeError {}
