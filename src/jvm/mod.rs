//! Decoding of JVM class files
//!
//! [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html

mod access_flags;
mod binary_format;
pub mod class_file;
mod descriptors;
mod errors;

pub use access_flags::*;
pub use binary_format::*;
pub use class_file::*;
pub use descriptors::*;
pub use errors::*;
