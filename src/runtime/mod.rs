//! Interpreter for the bytecode of a single class
//!
//! Only the parts of the instruction set that make sense without a heap or a class loader are
//! executed: arithmetic, conversions, comparisons, control flow, local variables, constants, and
//! `invokestatic` between methods of the same class. Everything else is decoded but then rejected
//! with `UnsupportedOpcode`.

mod bytecode;
mod errors;
mod frame;
mod settings;
mod thread;
mod value;

pub use bytecode::*;
pub use errors::*;
pub use frame::*;
pub use settings::*;
pub use thread::*;
pub use value::*;
