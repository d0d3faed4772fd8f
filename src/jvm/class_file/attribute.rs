use crate::jvm::class_file::{ConstantIndex, ConstantPool, Utf8ConstantIndex};
use crate::jvm::{ByteCursor, DecodeError, Deserialize};

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// Every attribute is stored the same way: a name, then a 4-byte length, then exactly that many
/// bytes of payload. Decoding keeps the payload raw so that unknown attributes are skipped
/// correctly; the handful we care about are decoded on demand through [`AttributeLike`].
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name_index: Utf8ConstantIndex,
    pub info: Vec<u8>,
}

impl Deserialize for Attribute {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let name_index = cursor.read()?;

        // Attribute info length is 4 bytes
        let length = cursor.read_u32()? as usize;
        let info = cursor.read_bytes(length)?.to_vec();

        Ok(Attribute { name_index, info })
    }
}

impl Attribute {
    /// Decode the payload as a particular kind of attribute
    ///
    /// The payload must be used up exactly.
    pub fn decode<A: AttributeLike>(&self) -> Result<A, DecodeError> {
        let mut cursor = ByteCursor::new(&self.info);
        let attribute = A::decode(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(DecodeError::AttributeLengthMismatch {
                name: A::NAME,
                declared: self.info.len(),
                used: cursor.position(),
            });
        }
        Ok(attribute)
    }
}

/// Attributes are all stored in the same way (see `Attribute`), but internally
/// they represent very different things. This trait is implemented by things
/// which can be decoded out of an attribute payload.
pub trait AttributeLike: Sized {
    /// Name of the attribute
    const NAME: &'static str;

    /// Decode the attribute payload (not including the name and length)
    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError>;
}

/// Find the first attribute named `A::NAME` and decode it
pub fn find_attribute<A: AttributeLike>(
    attributes: &[Attribute],
    constants: &ConstantPool,
) -> Result<Option<A>, DecodeError> {
    for attribute in attributes {
        if constants.utf8(attribute.name_index)? == A::NAME {
            return attribute.decode().map(Some);
        }
    }
    Ok(None)
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValue(pub ConstantIndex);

impl AttributeLike for ConstantValue {
    const NAME: &'static str = "ConstantValue";

    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read().map(ConstantValue)
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.10
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile(pub Utf8ConstantIndex);

impl AttributeLike for SourceFile {
    const NAME: &'static str = "SourceFile";

    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read().map(SourceFile)
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code_array: Vec<u8>,
    pub exception_table: Vec<ExceptionHandler>,
    pub attributes: Vec<Attribute>,
}

impl AttributeLike for Code {
    const NAME: &'static str = "Code";

    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let max_stack = cursor.read_u16()?;
        let max_locals = cursor.read_u16()?;
        let code_length = cursor.read_u32()? as usize;
        let code_array = cursor.read_bytes(code_length)?.to_vec();
        let exception_table = cursor.read()?;
        let attributes = cursor.read()?;
        Ok(Code {
            max_stack,
            max_locals,
            code_array,
            exception_table,
            attributes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of exception handler range (inclusive)
    pub start_pc: u16,

    /// End of exception handler range (exclusive)
    pub end_pc: u16,

    /// Start of the exception handler
    pub handler_pc: u16,

    /// Class of exceptions caught (`0` catches everything)
    pub catch_type: ConstantIndex,
}

impl Deserialize for ExceptionHandler {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        Ok(ExceptionHandler {
            start_pc: cursor.read_u16()?,
            end_pc: cursor.read_u16()?,
            handler_pc: cursor.read_u16()?,
            catch_type: cursor.read()?,
        })
    }
}
