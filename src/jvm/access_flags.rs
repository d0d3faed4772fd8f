use super::{ByteCursor, DecodeError, Deserialize};
use bitflags::bitflags;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

/// Flag sets decoded from a single `u16` mask
///
/// Bits missing from the table are dropped rather than rejected, so class files from newer
/// versions of the format still decode.
pub trait AccessFlags: Sized {
    fn from_mask(mask: u16) -> Self;
}

macro_rules! access_flags {
    ($($flags:ty),*) => {
        $(
            impl AccessFlags for $flags {
                fn from_mask(mask: u16) -> Self {
                    <$flags>::from_bits_truncate(mask)
                }
            }

            impl Deserialize for $flags {
                fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
                    cursor.read_u16().map(<$flags as AccessFlags>::from_mask)
                }
            }
        )*
    };
}

access_flags!(ClassAccessFlags, MethodAccessFlags, FieldAccessFlags);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_flags_from_mask() {
        let flags = ClassAccessFlags::from_mask(0x0021);
        assert_eq!(flags, ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER);
        assert_eq!(flags.bits(), 0x0021);
    }

    #[test]
    fn unmapped_bits_are_ignored() {
        // 0x0002 and 0x0100 mean nothing on a class
        let flags = ClassAccessFlags::from_mask(0x0001 | 0x0002 | 0x0100);
        assert_eq!(flags, ClassAccessFlags::PUBLIC);

        // 0x8000 (`module`) is not in the class table
        let flags = ClassAccessFlags::from_mask(0x8000 | 0x4000);
        assert_eq!(flags, ClassAccessFlags::ENUM);
        assert_eq!(flags.bits(), 0x4000);

        // 0x0020 is `synchronized` on methods but unused on fields
        let flags = FieldAccessFlags::from_mask(0x0028);
        assert_eq!(flags, FieldAccessFlags::STATIC);
    }

    #[test]
    fn same_bit_different_tables() {
        assert_eq!(
            MethodAccessFlags::from_mask(0x0040),
            MethodAccessFlags::BRIDGE
        );
        assert_eq!(
            FieldAccessFlags::from_mask(0x0040),
            FieldAccessFlags::VOLATILE
        );
        assert_eq!(
            MethodAccessFlags::from_mask(0x0080),
            MethodAccessFlags::VARARGS
        );
        assert_eq!(
            FieldAccessFlags::from_mask(0x0080),
            FieldAccessFlags::TRANSIENT
        );
    }

    #[test]
    fn deserialize_reads_two_bytes() {
        let mut cursor = ByteCursor::new(&[0x00, 0x09, 0xFF]);
        let flags: MethodAccessFlags = cursor.read().unwrap();
        assert_eq!(flags, MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC);
        assert_eq!(cursor.remaining(), 1);
    }
}
