use crate::jvm::{ByteCursor, DecodeError, Deserialize};
use std::fmt;

/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version {
        major_version: 52,
        minor_version: 0,
    };

    /// JVM class file version corresponding to Java SE 11 (released September 2018)
    pub const JAVA11: Version = Version {
        major_version: 55,
        minor_version: 0,
    };
}

/// Minor version comes first in the file, even though it is the less significant half
impl Deserialize for Version {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let minor_version = cursor.read_u16()?;
        let major_version = cursor.read_u16()?;
        Ok(Version {
            major_version,
            minor_version,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major_version, self.minor_version)
    }
}
