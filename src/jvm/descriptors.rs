use super::DecodeError;
use crate::util::Width;
use std::iter::Peekable;
use std::str::Chars;

/// Utility trait for reading descriptors out of their string representations
pub trait ParseDescriptor: Sized {
    /// Parse a descriptor from a string
    fn parse(source: &str) -> Result<Self, DecodeError> {
        let mut chars = source.chars().peekable();
        let ret = Self::parse_from(&mut chars)?;
        match chars.next() {
            None => Ok(ret),
            Some(c) => Err(bad_descriptor(format!(
                "Unexpected leftover input '{}' in '{}'",
                c, source
            ))),
        }
    }

    /// Read the descriptor from a character buffer
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self, DecodeError>;
}

fn bad_descriptor(msg: impl Into<String>) -> DecodeError {
    DecodeError::BadDescriptor(msg.into())
}

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl Width for BaseType {
    fn width(&self) -> usize {
        match self {
            BaseType::Byte
            | BaseType::Char
            | BaseType::Float
            | BaseType::Int
            | BaseType::Short
            | BaseType::Boolean => 1,
            BaseType::Double | BaseType::Long => 2,
        }
    }
}

impl ParseDescriptor for BaseType {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self, DecodeError> {
        let typ = match source.next() {
            Some('B') => BaseType::Byte,
            Some('C') => BaseType::Char,
            Some('D') => BaseType::Double,
            Some('F') => BaseType::Float,
            Some('I') => BaseType::Int,
            Some('J') => BaseType::Long,
            Some('S') => BaseType::Short,
            Some('Z') => BaseType::Boolean,
            Some(c) => return Err(bad_descriptor(format!("Invalid base type character '{}'", c))),
            None => return Err(bad_descriptor("Missing base type character")),
        };
        Ok(typ)
    }
}

/// Type of a class, instance, or local variable
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType {
    Base(BaseType),

    /// Class or interface, by binary name (eg. `java/lang/String`)
    Object(String),

    Array(Box<FieldType>),
}

impl FieldType {
    /// Most dimensions an array type can have
    pub const MAX_ARRAY_DIMENSIONS: usize = 255;
}

impl Width for FieldType {
    fn width(&self) -> usize {
        match self {
            FieldType::Base(base_type) => base_type.width(),
            FieldType::Object(_) | FieldType::Array(_) => 1,
        }
    }
}

impl ParseDescriptor for FieldType {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self, DecodeError> {
        match source.peek().copied() {
            None => Err(bad_descriptor("Missing field type")),
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => {
                BaseType::parse_from(source).map(FieldType::Base)
            }
            Some('L') => {
                let _ = source.next();
                let mut name = String::new();
                loop {
                    match source.next() {
                        Some(';') if !name.is_empty() => break,
                        Some(';') => return Err(bad_descriptor("Empty class name")),
                        Some(c) => name.push(c),
                        None => return Err(bad_descriptor("Unterminated class name")),
                    }
                }
                Ok(FieldType::Object(name))
            }
            Some('[') => {
                let mut dimensions = 0;
                while source.next_if_eq(&'[').is_some() {
                    dimensions += 1;
                    if dimensions > FieldType::MAX_ARRAY_DIMENSIONS {
                        return Err(bad_descriptor(format!(
                            "Array type has more than {} dimensions",
                            FieldType::MAX_ARRAY_DIMENSIONS
                        )));
                    }
                }
                let mut field_type = FieldType::parse_from(source)?;
                for _ in 0..dimensions {
                    field_type = FieldType::Array(Box::new(field_type));
                }
                Ok(field_type)
            }
            Some(c) => Err(bad_descriptor(format!("Invalid field type character '{}'", c))),
        }
    }
}

/// Signature of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>, // `None` is for `void` (ie. no return)
}

impl MethodDescriptor {
    /// Total length of parameters in local variable slots (not the same as the length of the
    /// vector)
    pub fn parameter_length(&self, has_this_param: bool) -> usize {
        let this_len = if has_this_param { 1 } else { 0 };
        this_len + self.parameters.iter().map(Width::width).sum::<usize>()
    }
}

impl ParseDescriptor for MethodDescriptor {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self, DecodeError> {
        if source.next() != Some('(') {
            return Err(bad_descriptor("Expected '(' for method"));
        }

        let mut parameters = vec![];
        while source.peek().copied() != Some(')') {
            parameters.push(FieldType::parse_from(source)?);
        }
        let _ = source.next();

        let return_type = if let Some('V') = source.peek().copied() {
            let _ = source.next();
            None
        } else {
            Some(FieldType::parse_from(source)?)
        };

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}
