use crate::jvm::class_file::{ConstantPool, ConstantValue, Member};
use crate::jvm::{DecodeError, FieldAccessFlags};

/// Field declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5
pub type Field = Member<FieldAccessFlags>;

impl Field {
    /// Initial value of a `static final` field, if the compiler recorded one
    pub fn constant_value(
        &self,
        constants: &ConstantPool,
    ) -> Result<Option<ConstantValue>, DecodeError> {
        self.attribute(constants)
    }
}
