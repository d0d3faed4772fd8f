use crate::jvm::class_file::{Code, ConstantPool, Member};
use crate::jvm::{DecodeError, MethodAccessFlags, MethodDescriptor, ParseDescriptor};

/// Method declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6
pub type Method = Member<MethodAccessFlags>;

impl Method {
    /// Bytecode of the method (`None` for `abstract` and `native` methods)
    pub fn code(&self, constants: &ConstantPool) -> Result<Option<Code>, DecodeError> {
        self.attribute(constants)
    }

    /// Parsed method descriptor
    pub fn method_descriptor(
        &self,
        constants: &ConstantPool,
    ) -> Result<MethodDescriptor, DecodeError> {
        MethodDescriptor::parse(&self.descriptor(constants)?)
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }
}
