use crate::jvm::class_file::{
    find_attribute, Attribute, AttributeLike, ConstantPool, Utf8ConstantIndex,
};
use crate::jvm::{AccessFlags, ByteCursor, DecodeError, Deserialize};

/// Field or method declared by a class or interface
///
/// Both are laid out identically in the class file and only differ in which table their access
/// flags are read with, so they share this one definition (see [`Field`](super::Field) and
/// [`Method`](super::Method)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<Flags> {
    pub access_flags: Flags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl<Flags: AccessFlags> Deserialize for Member<Flags> {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let access_flags = Flags::from_mask(cursor.read_u16()?);
        let name_index = cursor.read()?;
        let descriptor_index = cursor.read()?;
        let attributes = cursor.read()?;
        Ok(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }
}

impl<Flags> Member<Flags> {
    pub fn name(&self, constants: &ConstantPool) -> Result<String, DecodeError> {
        constants.utf8(self.name_index)
    }

    pub fn descriptor(&self, constants: &ConstantPool) -> Result<String, DecodeError> {
        constants.utf8(self.descriptor_index)
    }

    /// Find and decode an attribute attached to this member
    pub fn attribute<A: AttributeLike>(
        &self,
        constants: &ConstantPool,
    ) -> Result<Option<A>, DecodeError> {
        find_attribute(&self.attributes, constants)
    }
}
