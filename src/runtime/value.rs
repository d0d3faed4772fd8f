use super::ExecutionErrorKind;
use crate::util::Width;
use std::fmt;

/// One cell of the operand stack
///
/// Cells don't know what type they hold, only how big they are: `byte`, `short`, `char`,
/// `boolean`, `int`, `float`, and references are all `Narrow`, while `long` and `double` are
/// `Wide`. Floating point values are stored as their IEEE 754 bits, so nothing is ever rounded or
/// canonicalized (NaN payloads included) by storing it.
///
/// The size is what the stack manipulation instructions (`pop2`, `dup2`, ...) need to pick the
/// right form, and it is what counts against `max_stack`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum StackElement {
    Narrow(u32),
    Wide(u64),
}

impl Width for StackElement {
    fn width(&self) -> usize {
        match self {
            StackElement::Narrow(_) => 1,
            StackElement::Wide(_) => 2,
        }
    }
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackElement::Narrow(bits) => write!(f, "0x{:08x}", bits),
            StackElement::Wide(bits) => write!(f, "0x{:016x}", bits),
        }
    }
}

/// Handle to an object in some heap that lives outside of this crate
///
/// `0` is `null`. Nothing here ever dereferences a handle: references are only moved around,
/// compared, and checked for `null`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Reference(pub u32);

impl Reference {
    pub const NULL: Reference = Reference(0);

    pub fn is_null(self) -> bool {
        self == Reference::NULL
    }
}

/// Address pushed by `jsr` and consumed by `ret`
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReturnAddress(pub u32);

/// Types that can be stored in stack cells and local variables
///
/// Converting to a `StackElement` and back is exact for every value of the type. Reading a cell
/// of the wrong size fails with `MismatchedWidth`. Reading a cell of the right size as a
/// different type is allowed and just reinterprets the bits (cells aren't typed).
pub trait Value: Copy {
    /// Number of 32-bit slots taken up
    const WIDTH: usize;

    fn into_element(self) -> StackElement;

    fn from_element(element: StackElement) -> Result<Self, ExecutionErrorKind>;
}

fn narrow_bits(element: StackElement) -> Result<u32, ExecutionErrorKind> {
    match element {
        StackElement::Narrow(bits) => Ok(bits),
        StackElement::Wide(_) => Err(ExecutionErrorKind::MismatchedWidth),
    }
}

fn wide_bits(element: StackElement) -> Result<u64, ExecutionErrorKind> {
    match element {
        StackElement::Wide(bits) => Ok(bits),
        StackElement::Narrow(_) => Err(ExecutionErrorKind::MismatchedWidth),
    }
}

/// Narrow values whose bits are some conversion of a `u32`
macro_rules! narrow_value {
    ($typ:ty, $to_bits:expr, $from_bits:expr) => {
        impl Value for $typ {
            const WIDTH: usize = 1;

            fn into_element(self) -> StackElement {
                StackElement::Narrow($to_bits(self))
            }

            fn from_element(element: StackElement) -> Result<Self, ExecutionErrorKind> {
                narrow_bits(element).map($from_bits)
            }
        }
    };
}

narrow_value!(i32, |v: i32| v as u32, |bits: u32| bits as i32);
narrow_value!(f32, f32::to_bits, f32::from_bits);
narrow_value!(Reference, |r: Reference| r.0, Reference);
narrow_value!(ReturnAddress, |r: ReturnAddress| r.0, ReturnAddress);

// Sub-`int` types are stored sign or zero extended (as the JVM does), and truncated on the way out
narrow_value!(i8, |v: i8| i32::from(v) as u32, |bits: u32| bits as i8);
narrow_value!(i16, |v: i16| i32::from(v) as u32, |bits: u32| bits as i16);
narrow_value!(u16, |v: u16| u32::from(v), |bits: u32| bits as u16);
narrow_value!(bool, |v: bool| u32::from(v), |bits: u32| bits & 1 != 0);

impl Value for i64 {
    const WIDTH: usize = 2;

    fn into_element(self) -> StackElement {
        StackElement::Wide(self as u64)
    }

    fn from_element(element: StackElement) -> Result<Self, ExecutionErrorKind> {
        wide_bits(element).map(|bits| bits as i64)
    }
}

impl Value for f64 {
    const WIDTH: usize = 2;

    fn into_element(self) -> StackElement {
        StackElement::Wide(self.to_bits())
    }

    fn from_element(element: StackElement) -> Result<Self, ExecutionErrorKind> {
        wide_bits(element).map(f64::from_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<V: Value>(value: V) -> V {
        V::from_element(value.into_element()).unwrap()
    }

    #[test]
    fn widths() {
        assert_eq!(1i32.into_element().width(), 1);
        assert_eq!(1.0f32.into_element().width(), 1);
        assert_eq!(Reference::NULL.into_element().width(), 1);
        assert_eq!(1i64.into_element().width(), 2);
        assert_eq!(1.0f64.into_element().width(), 2);
    }

    #[test]
    fn floats_keep_their_bits() {
        assert_eq!(1.5f32.into_element(), StackElement::Narrow(0x3FC0_0000));
        assert_eq!(
            (-2.0f64).into_element(),
            StackElement::Wide(0xC000_0000_0000_0000)
        );

        let quiet_nan_with_payload = f32::from_bits(0x7FC0_1234);
        assert_eq!(round_trip(quiet_nan_with_payload).to_bits(), 0x7FC0_1234);
        let negative_zero = -0.0f64;
        assert_eq!(round_trip(negative_zero).to_bits(), negative_zero.to_bits());
    }

    #[test]
    fn integers_round_trip() {
        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(round_trip(value), value);
        }
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(round_trip(value), value);
        }
        assert_eq!(round_trip(-128i8), -128);
        assert_eq!(round_trip(0xFFFFu16), 0xFFFF);
        assert!(round_trip(true));
    }

    #[test]
    fn sub_int_types_extend() {
        assert_eq!((-1i8).into_element(), StackElement::Narrow(0xFFFF_FFFF));
        assert_eq!(0xFFFFu16.into_element(), StackElement::Narrow(0x0000_FFFF));
    }

    #[test]
    fn wrong_width() {
        assert_eq!(
            i64::from_element(StackElement::Narrow(1)),
            Err(ExecutionErrorKind::MismatchedWidth)
        );
        assert_eq!(
            f32::from_element(StackElement::Wide(1)),
            Err(ExecutionErrorKind::MismatchedWidth)
        );
    }
}
