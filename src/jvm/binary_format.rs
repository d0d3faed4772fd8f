use super::DecodeError;
use byteorder::{BigEndian, ByteOrder};

/// Bounds-checked, big-endian reader over an immutable byte slice
///
/// Every read either advances the cursor past the bytes it consumed or fails without moving it.
/// Class files are consumed front-to-back in a single pass, so this is all the structure the
/// decoder needs.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { bytes, position: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a raw slice of exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::UnexpectedEndOfInput {
                needed: n,
                remaining,
            });
        }
        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    /// Read `n` bytes as a big-endian unsigned integer
    ///
    /// Only the low 64 bits survive if `n` is more than 8.
    pub fn read_uint(&mut self, n: usize) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(n)?;
        Ok(match n {
            0 => 0,
            1..=8 => BigEndian::read_uint(bytes, n),
            _ => BigEndian::read_u64(&bytes[n - 8..]),
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_bytes(8).map(BigEndian::read_u64)
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        self.read_u8().map(|b| b as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        self.read_bytes(2).map(BigEndian::read_i16)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_bytes(4).map(BigEndian::read_i32)
    }

    /// Skip forward `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Read anything that knows how to read itself
    pub fn read<T: Deserialize>(&mut self) -> Result<T, DecodeError> {
        T::deserialize(self)
    }

    /// Apply `parser` exactly `count` times, collecting every result
    pub fn repeat<T>(
        &mut self,
        count: usize,
        mut parser: impl FnMut(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let mut results = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            results.push(parser(self)?);
        }
        Ok(results)
    }

    /// Check that all of the input has been consumed
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Utility trait for deserializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - everything is big-endian
///   - tags are always `u8`
///   - when deserializing a sequence, the length of the sequence is usually a `u16` prefix
///
pub trait Deserialize: Sized {
    /// Deserialize construct from the front of the cursor
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError>;
}

impl Deserialize for u8 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u8()
    }
}

impl Deserialize for u16 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u16()
    }
}

impl Deserialize for u32 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_u32()
    }
}

impl Deserialize for i32 {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        cursor.read_i32()
    }
}

/// Size in `u16` is the first thing deserialized
impl<A: Deserialize> Deserialize for Vec<A> {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let count = cursor.read_u16()? as usize;
        cursor.repeat(count, A::deserialize)
    }
}
