use crate::jvm::class_file::{
    find_attribute, Attribute, AttributeLike, ClassConstantIndex, ConstantPool, Field, Method,
    SourceFile, Version,
};
use crate::jvm::{ByteCursor, ClassAccessFlags, DecodeError, Deserialize};
use crate::Error;
use log::debug;
use std::fs;
use std::path::Path;

/// Class file magic marker
pub const MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Decoded representation of a class file
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,

    /// Index `0` means there is no superclass (only for `java/lang/Object` and modules)
    pub super_class: ClassConstantIndex,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Decode a full class file
    ///
    /// The input must be used up exactly: leftover bytes are an error.
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, DecodeError> {
        let mut cursor = ByteCursor::new(bytes);
        let class = cursor.read()?;
        cursor.finish()?;
        Ok(class)
    }

    /// Read and decode a class file from disk
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<ClassFile, Error> {
        let bytes = fs::read(path.as_ref())?;
        debug!("Read {} bytes from {}", bytes.len(), path.as_ref().display());
        Ok(ClassFile::parse(&bytes)?)
    }

    pub fn this_class_name(&self) -> Result<String, DecodeError> {
        self.constants.class_name(self.this_class)
    }

    pub fn super_class_name(&self) -> Result<Option<String>, DecodeError> {
        if self.super_class.0 .0 == 0 {
            Ok(None)
        } else {
            self.constants.class_name(self.super_class).map(Some)
        }
    }

    pub fn interface_names(&self) -> Result<Vec<String>, DecodeError> {
        self.interfaces
            .iter()
            .map(|interface| self.constants.class_name(*interface))
            .collect()
    }

    /// Find and decode an attribute attached to the class
    pub fn attribute<A: AttributeLike>(&self) -> Result<Option<A>, DecodeError> {
        find_attribute(&self.attributes, &self.constants)
    }

    /// Name of the source file this class was compiled from, if recorded
    pub fn source_file(&self) -> Result<Option<String>, DecodeError> {
        match self.attribute::<SourceFile>()? {
            Some(SourceFile(name)) => self.constants.utf8(name).map(Some),
            None => Ok(None),
        }
    }

    /// Find a method declared in this class by name and descriptor
    pub fn find_method(&self, name: &str, descriptor: &str) -> Result<Option<&Method>, DecodeError> {
        Ok(self
            .find_method_index(name, descriptor)?
            .map(|index| &self.methods[index]))
    }

    /// Position in `methods` of the method with this name and descriptor
    pub fn find_method_index(
        &self,
        name: &str,
        descriptor: &str,
    ) -> Result<Option<usize>, DecodeError> {
        for (index, method) in self.methods.iter().enumerate() {
            if method.name(&self.constants)? == name
                && method.descriptor(&self.constants)? == descriptor
            {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

impl Deserialize for ClassFile {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        if cursor.read_bytes(4)? != MAGIC {
            return Err(DecodeError::NotRecognizedFormat);
        }

        let version: Version = cursor.read()?;
        let constants: ConstantPool = cursor.read()?;
        debug!(
            "Class file version {} with {} constants",
            version,
            constants.len()
        );

        let access_flags = cursor.read()?;
        let this_class = cursor.read()?;
        let super_class = cursor.read()?;
        let interfaces = cursor.read()?;
        let fields: Vec<Field> = cursor.read()?;
        let methods: Vec<Method> = cursor.read()?;
        let attributes = cursor.read()?;
        debug!(
            "Decoded {} fields, {} methods",
            fields.len(),
            methods.len()
        );

        Ok(ClassFile {
            version,
            constants,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}
