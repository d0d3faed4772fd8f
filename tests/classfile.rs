mod common;

use classrun::jvm::{
    ClassAccessFlags, ClassFile, Constant, ConstantIndex, DecodeError, MethodAccessFlags, Version,
};
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn decode_assembled_class() {
    let mut builder = ClassBuilder::new("demo/Point");
    let long = builder.long(-2);
    let after_long = builder.integer(7);
    builder.method(ACC_PUBLIC | ACC_STATIC, "origin", "()I", 1, 0, &[0x03, 0xac]);
    builder.abstract_method("norm", "()D");
    let class = ClassFile::parse(&builder.finish()).unwrap();

    assert_eq!(class.version, Version::JAVA8);
    assert_eq!(
        class.access_flags,
        ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER
    );
    assert_eq!(class.this_class_name().unwrap(), "demo/Point");
    assert_eq!(
        class.super_class_name().unwrap().as_deref(),
        Some("java/lang/Object")
    );
    assert_eq!(class.interface_names().unwrap(), Vec::<String>::new());

    // The `Long` uses up two indices
    assert_eq!(after_long, long + 2);
    assert_eq!(class.constants.get(ConstantIndex(long)), Ok(&Constant::Long(-2)));
    assert_eq!(
        class.constants.get(ConstantIndex(long + 1)),
        Err(DecodeError::InvalidConstantIndex(long + 1))
    );
    assert_eq!(
        class.constants.get(ConstantIndex(after_long)),
        Ok(&Constant::Integer(7))
    );

    let origin = class.find_method("origin", "()I").unwrap().unwrap();
    assert_eq!(
        origin.access_flags,
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC
    );
    let code = origin.code(&class.constants).unwrap().unwrap();
    assert_eq!(code.max_stack, 1);
    assert_eq!(code.code_array, vec![0x03, 0xac]);

    let norm = class.find_method("norm", "()D").unwrap().unwrap();
    assert!(!norm.is_static());
    assert_eq!(norm.code(&class.constants), Ok(None));
    assert_eq!(
        norm.method_descriptor(&class.constants)
            .unwrap()
            .parameter_length(true),
        1
    );
}

#[test]
fn reject_bad_magic() {
    let mut bytes = ClassBuilder::new("A").finish();
    bytes[0] = 0xCB;
    assert_eq!(ClassFile::parse(&bytes), Err(DecodeError::NotRecognizedFormat));
    assert_eq!(ClassFile::parse(&[]), Err(DecodeError::UnexpectedEndOfInput {
        needed: 4,
        remaining: 0
    }));
}

#[test]
fn reject_trailing_bytes() {
    let mut bytes = ClassBuilder::new("A").finish();
    bytes.extend_from_slice(&[0, 0, 0]);
    assert_eq!(ClassFile::parse(&bytes), Err(DecodeError::TrailingBytes(3)));
}

#[test]
fn reject_truncated_class() {
    let mut builder = ClassBuilder::new("A");
    builder.method(ACC_STATIC, "f", "()V", 0, 0, &[0xb1]);
    let bytes = builder.finish();
    for len in 4..bytes.len() {
        match ClassFile::parse(&bytes[..len]) {
            Err(DecodeError::UnexpectedEndOfInput { .. }) => (),
            other => panic!("truncated to {} bytes: {:?}", len, other),
        }
    }
}

#[test]
fn reject_long_overrunning_pool() {
    // Count says two entries, but the only constant is a `Long` that needs indices 1 and 2
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52, 0, 2];
    bytes.push(5);
    bytes.extend_from_slice(&(-1i64).to_be_bytes());
    assert_eq!(
        ClassFile::parse(&bytes),
        Err(DecodeError::InvalidConstantPoolCount(2))
    );
}

#[test]
fn reject_undefined_constant_tag() {
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52, 0, 2];
    bytes.push(2);
    bytes.extend_from_slice(&[0; 16]);
    assert_eq!(
        ClassFile::parse(&bytes),
        Err(DecodeError::UndefinedConstantTag(2))
    );
}

#[test]
fn empty_pool_class() {
    // Pool count 1 means no entries at all. Indices are only checked when they are looked up.
    let bytes = [
        0xCA, 0xFE, 0xBA, 0xBE, 0, 3, 0, 45, 0, 1, 0x16, 0x31, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(
        class.version,
        Version {
            minor_version: 3,
            major_version: 45
        }
    );
    assert!(class.constants.is_empty());
    assert_eq!(class.access_flags.bits(), 0x1631);
    assert_eq!(
        class.access_flags,
        ClassAccessFlags::PUBLIC
            | ClassAccessFlags::SUPER
            | ClassAccessFlags::ABSTRACT
            | ClassAccessFlags::INTERFACE
            | ClassAccessFlags::SYNTHETIC
            | ClassAccessFlags::FINAL
    );
    assert_eq!(class.super_class_name(), Ok(None));
    assert_eq!(
        class.this_class_name(),
        Err(DecodeError::InvalidConstantIndex(0))
    );
}
