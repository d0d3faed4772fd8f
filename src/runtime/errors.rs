use crate::jvm::DecodeError;
use std::fmt;

/// Fault raised while running bytecode, along with where it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    /// Method being executed, as `name:descriptor`
    pub method: String,

    /// Offset of the faulting instruction in the code array
    pub pc: usize,

    /// Opcode at `pc` (`None` if the fault happened outside of any instruction)
    pub opcode: Option<u8>,

    pub kind: ExecutionErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    /// Popped or peeked at an empty operand stack
    OperandStackUnderflow,

    /// Pushed past the `max_stack` of the method
    OperandStackOverflow,

    /// Local variable index is outside of `max_locals`
    InvalidLocalIndex(u16),

    /// Eg. integer division by zero
    ArithmeticFault(&'static str),

    /// Opcode is reserved, undefined, or needs a heap or linker
    UnsupportedOpcode(u8),

    /// A stack cell or local was read as a `long`/`double` when it holds a narrow value (or the
    /// other way around)
    MismatchedWidth,

    /// Code array ends in the middle of an instruction
    TruncatedInstruction,

    /// `wide` followed by an opcode it cannot modify
    InvalidWide(u8),

    /// `tableswitch` with `high < low - 1`, or `lookupswitch` with a negative pair count (the
    /// number of targets that implies)
    InvalidSwitch(i64),

    /// Jump outside of the code array
    InvalidBranchTarget(i64),

    /// `ldc` of a constant that has no meaning without a heap (eg. a `String`)
    UnloadableConstant(u16),

    /// Method reference that isn't a method of the executing class
    UnresolvedMethod(u16),

    /// No method with this `name:descriptor` in the class
    MethodNotFound(String),

    /// Number of arguments passed doesn't match the method descriptor
    WrongArgumentCount { expected: usize, found: usize },

    /// Call stack grew past the configured limit
    CallDepthExceeded(usize),

    /// Method has no `Code` attribute (eg. `abstract` or `native`)
    MissingCode,

    /// Class file data needed during execution is malformed
    Decode(DecodeError),
}

impl From<DecodeError> for ExecutionErrorKind {
    fn from(err: DecodeError) -> ExecutionErrorKind {
        ExecutionErrorKind::Decode(err)
    }
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionErrorKind::OperandStackUnderflow => write!(f, "operand stack underflow"),
            ExecutionErrorKind::OperandStackOverflow => write!(f, "operand stack overflow"),
            ExecutionErrorKind::InvalidLocalIndex(index) => {
                write!(f, "invalid local variable index {}", index)
            }
            ExecutionErrorKind::ArithmeticFault(msg) => write!(f, "arithmetic fault: {}", msg),
            ExecutionErrorKind::UnsupportedOpcode(opcode) => {
                write!(f, "unsupported opcode 0x{:02x}", opcode)
            }
            ExecutionErrorKind::MismatchedWidth => {
                write!(f, "value read with the wrong width")
            }
            ExecutionErrorKind::TruncatedInstruction => write!(f, "truncated instruction"),
            ExecutionErrorKind::InvalidWide(opcode) => {
                write!(f, "`wide` cannot modify opcode 0x{:02x}", opcode)
            }
            ExecutionErrorKind::InvalidSwitch(count) => {
                write!(f, "switch with {} targets", count)
            }
            ExecutionErrorKind::InvalidBranchTarget(target) => {
                write!(f, "branch target {} is outside the code", target)
            }
            ExecutionErrorKind::UnloadableConstant(index) => {
                write!(f, "constant #{} cannot be loaded", index)
            }
            ExecutionErrorKind::UnresolvedMethod(index) => {
                write!(f, "method reference #{} does not resolve", index)
            }
            ExecutionErrorKind::MethodNotFound(method) => write!(f, "no method {}", method),
            ExecutionErrorKind::WrongArgumentCount { expected, found } => {
                write!(f, "expected {} arguments but got {}", expected, found)
            }
            ExecutionErrorKind::CallDepthExceeded(depth) => {
                write!(f, "call depth exceeded {}", depth)
            }
            ExecutionErrorKind::MissingCode => write!(f, "method has no code"),
            ExecutionErrorKind::Decode(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at pc {}", self.method, self.pc)?;
        if let Some(opcode) = self.opcode {
            write!(f, " (opcode 0x{:02x})", opcode)?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for ExecutionError {}
