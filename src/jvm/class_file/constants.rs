use crate::jvm::{ByteCursor, DecodeError, Deserialize};
use crate::util::{Offset, OffsetResult, OffsetVec, Width};

/// Constants as in the constant pool
///
/// Numeric constants keep the exact bits from the class file: a `Float` or `Double` is never
/// round-tripped through a native float while decoding.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different). See [`decode_modified_utf8`].
    Utf8(Vec<u8>),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`, as its IEEE 754 bit pattern
    Float(u32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`, as its IEEE 754 bit pattern
    Double(u64),

    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Field
    FieldRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Method (this combines `Methodref` and `InterfaceMethodref`)
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the method kind, this points to different things:
        ///
        ///   - `FieldRef` for `GetField`, `GetStatic`, `PutField`, `PutStatic`
        ///   - `MethodRef` for the rest
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Module (only in `module-info` classes)
    Module(Utf8ConstantIndex),

    /// Package exported or opened by a module
    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Name of the kind of constant, as used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class(_) => "Class",
            Constant::String(_) => "String",
            Constant::FieldRef { .. } => "Fieldref",
            Constant::MethodRef {
                is_interface: false,
                ..
            } => "Methodref",
            Constant::MethodRef {
                is_interface: true, ..
            } => "InterfaceMethodref",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::MethodHandle { .. } => "MethodHandle",
            Constant::MethodType { .. } => "MethodType",
            Constant::Dynamic { .. } => "Dynamic",
            Constant::InvokeDynamic { .. } => "InvokeDynamic",
            Constant::Module(_) => "Module",
            Constant::Package(_) => "Package",
        }
    }
}

impl Deserialize for Constant {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let constant = match cursor.read_u8()? {
            1 => {
                let length = cursor.read_u16()? as usize;
                Constant::Utf8(cursor.read_bytes(length)?.to_vec())
            }
            3 => Constant::Integer(cursor.read_i32()?),
            4 => Constant::Float(cursor.read_u32()?),
            5 => {
                let high = cursor.read_u32()? as u64;
                let low = cursor.read_u32()? as u64;
                Constant::Long((high << 32 | low) as i64)
            }
            6 => {
                let high = cursor.read_u32()? as u64;
                let low = cursor.read_u32()? as u64;
                Constant::Double(high << 32 | low)
            }
            7 => Constant::Class(cursor.read()?),
            8 => Constant::String(cursor.read()?),
            9 => Constant::FieldRef {
                class: cursor.read()?,
                name_and_type: cursor.read()?,
            },
            tag @ (10 | 11) => Constant::MethodRef {
                class: cursor.read()?,
                name_and_type: cursor.read()?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: cursor.read()?,
                descriptor: cursor.read()?,
            },
            15 => Constant::MethodHandle {
                handle_kind: cursor.read()?,
                member: cursor.read()?,
            },
            16 => Constant::MethodType {
                descriptor: cursor.read()?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: cursor.read_u16()?,
                name_and_type: cursor.read()?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: cursor.read_u16()?,
                name_and_type: cursor.read()?,
            },
            19 => Constant::Module(cursor.read()?),
            20 => Constant::Package(cursor.read()?),
            tag => return Err(DecodeError::UndefinedConstantTag(tag)),
        };
        Ok(constant)
    }
}

/// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`. Quoting
/// the JVM specification:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
impl Width for Constant {
    fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct NameAndTypeConstantIndex(pub ConstantIndex);

impl From<Utf8ConstantIndex> for ConstantIndex {
    fn from(index: Utf8ConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl From<ClassConstantIndex> for ConstantIndex {
    fn from(index: ClassConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl From<NameAndTypeConstantIndex> for ConstantIndex {
    fn from(index: NameAndTypeConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u16().map(ConstantIndex)
    }
}

impl Deserialize for Utf8ConstantIndex {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read().map(Utf8ConstantIndex)
    }
}

impl Deserialize for ClassConstantIndex {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read().map(ClassConstantIndex)
    }
}

impl Deserialize for NameAndTypeConstantIndex {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read().map(NameAndTypeConstantIndex)
    }
}

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5-220
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl Deserialize for HandleKind {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let kind = match cursor.read_u8()? {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            other => return Err(DecodeError::InvalidHandleKind(other)),
        };
        Ok(kind)
    }
}

/// Resolved symbolic reference to a field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

/// Decoded constant pool
///
/// Indexing starts at 1, and `Long`/`Double` entries use up two indices (the second of which is
/// never a valid index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool(OffsetVec<Constant>);

impl ConstantPool {
    pub fn new() -> ConstantPool {
        ConstantPool(OffsetVec::new_starting_at(Offset(1)))
    }

    /// Number of entries (8-byte constants count once)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `constant_pool_count` this pool would be written with
    pub fn count(&self) -> u16 {
        self.0.offset_len().0 as u16
    }

    /// Append a constant, returning its index
    pub fn push(&mut self, constant: Constant) -> ConstantIndex {
        ConstantIndex(self.0.push(constant).0 as u16)
    }

    /// Iterate over all constants along with their indices
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> + '_ {
        self.0
            .iter()
            .map(|(offset, _, constant)| (ConstantIndex(offset.0 as u16), constant))
    }

    /// Look up a constant by index
    pub fn get(&self, index: impl Into<ConstantIndex>) -> Result<&Constant, DecodeError> {
        let ConstantIndex(index) = index.into();
        match self.0.get_offset(Offset(index as usize)) {
            OffsetResult::Ok(constant) => Ok(constant),
            OffsetResult::InvalidOffset(_) | OffsetResult::TooSmall | OffsetResult::TooLarge => {
                Err(DecodeError::InvalidConstantIndex(index))
            }
        }
    }

    /// Look up and decode a `Utf8` constant
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<String, DecodeError> {
        match self.get(index)? {
            Constant::Utf8(bytes) => {
                decode_modified_utf8(bytes).ok_or(DecodeError::MalformedUtf8(index.0 .0))
            }
            _ => Err(self.unexpected(index, "Utf8")),
        }
    }

    /// Look up the name of a `Class` constant (eg. `java/lang/Object`)
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<String, DecodeError> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(self.unexpected(index, "Class")),
        }
    }

    /// Look up the name and descriptor of a `NameAndType` constant
    pub fn name_and_type(
        &self,
        index: NameAndTypeConstantIndex,
    ) -> Result<(String, String), DecodeError> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(self.unexpected(index, "NameAndType")),
        }
    }

    /// Resolve a `Methodref` or `InterfaceMethodref` into names
    pub fn method_ref(&self, index: ConstantIndex) -> Result<MemberRef, DecodeError> {
        match self.get(index)? {
            Constant::MethodRef {
                class,
                name_and_type,
                ..
            } => {
                let (name, descriptor) = self.name_and_type(*name_and_type)?;
                Ok(MemberRef {
                    class: self.class_name(*class)?,
                    name,
                    descriptor,
                })
            }
            _ => Err(self.unexpected(index, "Methodref")),
        }
    }

    fn unexpected(&self, index: impl Into<ConstantIndex>, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedConstant {
            index: index.into().0,
            expected,
        }
    }
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

/// The pool is prefixed by `constant_pool_count`, which is one more than the highest index. Since
/// 8-byte constants use two indices, entries are read until the next free index reaches the count
/// rather than a fixed number of times.
impl Deserialize for ConstantPool {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let count = cursor.read_u16()?;
        if count == 0 {
            return Err(DecodeError::InvalidConstantPoolCount(count));
        }

        let mut pool = ConstantPool::new();
        while pool.0.offset_len().0 < count as usize {
            pool.push(cursor.read()?);
        }
        if pool.0.offset_len().0 != count as usize {
            return Err(DecodeError::InvalidConstantPoolCount(count));
        }
        Ok(pool)
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// Returns `None` on anything that isn't well-formed, including unpaired surrogates.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();

    fn continuation(byte: Option<u8>) -> Option<u16> {
        match byte {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Some((b & 0x3F) as u16),
            _ => None,
        }
    }

    while let Some(first) = iter.next() {
        let unit = match first {
            0 => return None,
            0x01..=0x7F => first as u16,
            0xC0..=0xDF => {
                let second = continuation(iter.next())?;
                ((first & 0x1F) as u16) << 6 | second
            }
            0xE0..=0xEF => {
                let second = continuation(iter.next())?;
                let third = continuation(iter.next())?;
                ((first & 0x0F) as u16) << 12 | second << 6 | third
            }
            _ => return None,
        };
        units.push(unit);
    }

    String::from_utf16(&units).ok()
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(bytes: &[u8]) -> Result<Constant, DecodeError> {
        let mut cursor = ByteCursor::new(bytes);
        let constant = cursor.read()?;
        cursor.finish()?;
        Ok(constant)
    }

    #[test]
    fn class_ref_keeps_index_exactly() {
        for index in [0u16, 1, 0x00FF, 0x0100, 0x7FFF, 0x8000, 0xFFFF] {
            let [hi, lo] = index.to_be_bytes();
            assert_eq!(
                decode(&[7, hi, lo]),
                Ok(Constant::Class(Utf8ConstantIndex(ConstantIndex(index))))
            );
        }
    }

    #[test]
    fn numeric_constants_keep_bits() {
        assert_eq!(decode(&[3, 0xFF, 0xFF, 0xFF, 0xFE]), Ok(Constant::Integer(-2)));
        assert_eq!(
            decode(&[4, 0x7F, 0xC0, 0x00, 0x01]),
            Ok(Constant::Float(0x7FC0_0001))
        );
        assert_eq!(
            decode(&[5, 0x80, 0, 0, 0, 0, 0, 0, 0]),
            Ok(Constant::Long(i64::MIN))
        );
        assert_eq!(
            decode(&[6, 0x40, 0x09, 0x21, 0xFB, 0x54, 0x44, 0x2D, 0x18]),
            Ok(Constant::Double(std::f64::consts::PI.to_bits()))
        );
    }

    #[test]
    fn member_refs() {
        assert_eq!(
            decode(&[11, 0, 3, 0, 4]),
            Ok(Constant::MethodRef {
                class: ClassConstantIndex(ConstantIndex(3)),
                name_and_type: NameAndTypeConstantIndex(ConstantIndex(4)),
                is_interface: true,
            })
        );
        assert_eq!(
            decode(&[9, 0, 1, 0, 2]),
            Ok(Constant::FieldRef {
                class: ClassConstantIndex(ConstantIndex(1)),
                name_and_type: NameAndTypeConstantIndex(ConstantIndex(2)),
            })
        );
    }

    #[test]
    fn handle_type_and_indy_have_payloads() {
        assert_eq!(
            decode(&[15, 6, 0, 9]),
            Ok(Constant::MethodHandle {
                handle_kind: HandleKind::InvokeStatic,
                member: ConstantIndex(9),
            })
        );
        assert_eq!(
            decode(&[16, 0, 12]),
            Ok(Constant::MethodType {
                descriptor: Utf8ConstantIndex(ConstantIndex(12)),
            })
        );
        assert_eq!(
            decode(&[18, 0, 0, 0, 5]),
            Ok(Constant::InvokeDynamic {
                bootstrap_method: 0,
                name_and_type: NameAndTypeConstantIndex(ConstantIndex(5)),
            })
        );
        assert_eq!(decode(&[15, 10, 0, 9]), Err(DecodeError::InvalidHandleKind(10)));
    }

    #[test]
    fn undefined_tags() {
        for tag in [0u8, 2, 13, 14, 21, 255] {
            assert_eq!(decode(&[tag, 0, 0]), Err(DecodeError::UndefinedConstantTag(tag)));
        }
    }

    #[test]
    fn pool_with_wide_entries() {
        // count = 5: #1 Long (uses #1 and #2), #3 Utf8 "x", #4 Class #3
        let bytes = [
            0, 5, //
            5, 0, 0, 0, 0, 0, 0, 0, 42, //
            1, 0, 1, b'x', //
            7, 0, 3,
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let pool: ConstantPool = cursor.read().unwrap();
        assert!(cursor.is_empty());

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.count(), 5);
        assert_eq!(pool.get(ConstantIndex(1)), Ok(&Constant::Long(42)));
        assert_eq!(
            pool.get(ConstantIndex(0)),
            Err(DecodeError::InvalidConstantIndex(0))
        );
        assert_eq!(
            pool.get(ConstantIndex(2)),
            Err(DecodeError::InvalidConstantIndex(2))
        );
        assert_eq!(
            pool.get(ConstantIndex(5)),
            Err(DecodeError::InvalidConstantIndex(5))
        );
        assert_eq!(
            pool.class_name(ClassConstantIndex(ConstantIndex(4))),
            Ok(String::from("x"))
        );
        assert_eq!(
            pool.class_name(ClassConstantIndex(ConstantIndex(3))),
            Err(DecodeError::UnexpectedConstant {
                index: 3,
                expected: "Class"
            })
        );
    }

    #[test]
    fn wide_entry_overrunning_count() {
        // count = 2 only leaves room for one slot, but a Double needs two
        let bytes = [0, 2, 6, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(
            cursor.read::<ConstantPool>(),
            Err(DecodeError::InvalidConstantPoolCount(2))
        );
    }

    #[test]
    fn empty_pool() {
        let mut cursor = ByteCursor::new(&[0, 1]);
        let pool: ConstantPool = cursor.read().unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.count(), 1);
    }
}
