//! Decode JVM class files and run the bytecode of their static methods
//!
//!   - [`jvm`] turns the bytes of a class file into a [`jvm::ClassFile`]
//!   - [`runtime`] interprets the `Code` of methods in that class on a [`runtime::Thread`]

mod errors;
pub mod jvm;
pub mod runtime;
mod util;

pub use errors::*;
