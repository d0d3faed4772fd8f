mod common;

use classrun::jvm::{ClassFile, DecodeError};
use classrun::runtime::{ExecutionErrorKind, Settings, StackElement, Thread, Value};
use common::*;
use pretty_assertions::assert_eq;

fn int(value: i32) -> StackElement {
    value.into_element()
}

fn long(value: i64) -> StackElement {
    value.into_element()
}

fn settings() -> Settings {
    Settings {
        trace_instructions: false,
        ..Settings::default()
    }
}

fn run(
    class: &ClassFile,
    name: &str,
    descriptor: &str,
    args: Vec<StackElement>,
) -> Result<Option<StackElement>, classrun::runtime::ExecutionError> {
    Thread::new(class, settings()).invoke_and_run(name, descriptor, args)
}

/// `static int fact(int n) { return n <= 1 ? 1 : n * fact(n - 1); }`
fn factorial_class() -> ClassFile {
    let mut builder = ClassBuilder::new("Calc");
    let fact = builder.method_ref("Calc", "fact", "(I)I").to_be_bytes();
    #[rustfmt::skip]
    let code = [
        0x1a,                       //  0: iload_0
        0x04,                       //  1: iconst_1
        0xa3, 0x00, 0x05,           //  2: if_icmpgt 7
        0x04,                       //  5: iconst_1
        0xac,                       //  6: ireturn
        0x1a,                       //  7: iload_0
        0x1a,                       //  8: iload_0
        0x04,                       //  9: iconst_1
        0x64,                       // 10: isub
        0xb8, fact[0], fact[1],     // 11: invokestatic fact
        0x68,                       // 14: imul
        0xac,                       // 15: ireturn
    ];
    builder.method(ACC_PUBLIC | ACC_STATIC, "fact", "(I)I", 3, 1, &code);
    ClassFile::parse(&builder.finish()).unwrap()
}

#[test]
fn recursive_factorial() {
    let class = factorial_class();
    for (n, expected) in [(0, 1), (1, 1), (5, 120), (12, 479_001_600)] {
        assert_eq!(
            run(&class, "fact", "(I)I", vec![int(n)]),
            Ok(Some(int(expected))),
            "fact({})",
            n
        );
    }
}

#[test]
fn factorial_overflow_wraps() {
    let class = factorial_class();
    let expected = (1..=13).fold(1i32, |acc: i32, n| acc.wrapping_mul(n));
    assert_eq!(
        run(&class, "fact", "(I)I", vec![int(13)]),
        Ok(Some(int(expected)))
    );
}

#[test]
fn call_depth_limit() {
    let class = factorial_class();
    let settings = Settings {
        max_call_depth: 4,
        trace_instructions: false,
    };

    let mut thread = Thread::new(&class, settings.clone());
    assert_eq!(
        thread.invoke_and_run("fact", "(I)I", vec![int(4)]),
        Ok(Some(int(24)))
    );

    let mut thread = Thread::new(&class, settings);
    let err = thread
        .invoke_and_run("fact", "(I)I", vec![int(5)])
        .unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::CallDepthExceeded(4));
    assert_eq!(err.method, "fact:(I)I");
    assert_eq!(err.pc, 11);
    assert_eq!(err.opcode, Some(0xb8));
    assert_eq!(thread.depth(), 4);
}

#[test]
fn counting_loop() {
    let mut builder = ClassBuilder::new("Loops");
    #[rustfmt::skip]
    let code = [
        0x03,                       //  0: iconst_0
        0x3c,                       //  1: istore_1
        0x1a,                       //  2: iload_0
        0x9e, 0x00, 0x0d,           //  3: ifle 16
        0x1b,                       //  6: iload_1
        0x1a,                       //  7: iload_0
        0x60,                       //  8: iadd
        0x3c,                       //  9: istore_1
        0x84, 0x00, 0xff,           // 10: iinc 0, -1
        0xa7, 0xff, 0xf5,           // 13: goto 2
        0x1b,                       // 16: iload_1
        0xac,                       // 17: ireturn
    ];
    builder.method(ACC_STATIC, "sum", "(I)I", 2, 2, &code);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    assert_eq!(
        run(&class, "sum", "(I)I", vec![int(100)]),
        Ok(Some(int(5050)))
    );
    assert_eq!(
        run(&class, "sum", "(I)I", vec![int(-3)]),
        Ok(Some(int(0)))
    );
}

#[test]
fn wide_arguments_and_constants() {
    let mut builder = ClassBuilder::new("Wide");
    let big = builder.long(1 << 40).to_be_bytes();
    let small = builder.integer(-7).to_be_bytes();
    let add = builder.method_ref("Wide", "add", "(JI)J").to_be_bytes();
    #[rustfmt::skip]
    let add_code = [
        0x1e,                       // 0: lload_0
        0x1c,                       // 1: iload_2
        0x85,                       // 2: i2l
        0x61,                       // 3: ladd
        0xad,                       // 4: lreturn
    ];
    #[rustfmt::skip]
    let main_code = [
        0x14, big[0], big[1],       // 0: ldc2_w big
        0x12, small[1],             // 3: ldc small
        0xb8, add[0], add[1],       // 5: invokestatic add
        0xad,                       // 8: lreturn
    ];
    builder
        .method(ACC_STATIC, "add", "(JI)J", 4, 3, &add_code)
        .method(ACC_STATIC, "main", "()J", 3, 0, &main_code);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    assert_eq!(
        run(&class, "add", "(JI)J", vec![long(-1), int(1)]),
        Ok(Some(long(0)))
    );
    assert_eq!(
        run(&class, "main", "()J", vec![]),
        Ok(Some(long((1 << 40) - 7)))
    );

    // A narrow value where the long goes
    let err = run(&class, "add", "(JI)J", vec![int(1), int(1)]).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::MismatchedWidth);
}

#[test]
fn division_by_zero_reports_location() {
    let mut builder = ClassBuilder::new("Div");
    let code = [0x1a, 0x1b, 0x6c, 0xac]; // iload_0; iload_1; idiv; ireturn
    builder.method(ACC_STATIC, "div", "(II)I", 2, 2, &code);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    assert_eq!(
        run(&class, "div", "(II)I", vec![int(7), int(2)]),
        Ok(Some(int(3)))
    );
    assert_eq!(
        run(&class, "div", "(II)I", vec![int(i32::MIN), int(-1)]),
        Ok(Some(int(i32::MIN)))
    );

    let err = run(&class, "div", "(II)I", vec![int(7), int(0)]).unwrap_err();
    assert_eq!(err.method, "div:(II)I");
    assert_eq!(err.pc, 2);
    assert_eq!(err.opcode, Some(0x6c));
    assert_eq!(err.kind, ExecutionErrorKind::ArithmeticFault("/ by zero"));
}

#[test]
fn heap_operations_are_unsupported() {
    let mut builder = ClassBuilder::new("Heap");
    let this_class = builder.class("Heap").to_be_bytes();
    let string = builder.string("hello").to_be_bytes();
    builder
        .method(ACC_STATIC, "make", "()V", 1, 0, &[0xbb, this_class[0], this_class[1], 0xb1])
        .method(ACC_STATIC, "greet", "()V", 1, 0, &[0x12, string[1], 0xb1]);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    let err = run(&class, "make", "()V", vec![]).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::UnsupportedOpcode(0xbb));
    assert_eq!(err.pc, 0);

    let err = run(&class, "greet", "()V", vec![]).unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::UnloadableConstant(u16::from_be_bytes(string))
    );
}

#[test]
fn invoking_other_classes_is_unresolved() {
    let mut builder = ClassBuilder::new("Caller");
    let abs = builder.method_ref("java/lang/Math", "abs", "(I)I").to_be_bytes();
    let code = [0x1a, 0xb8, abs[0], abs[1], 0xac];
    builder.method(ACC_STATIC, "abs", "(I)I", 1, 1, &code);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    let err = run(&class, "abs", "(I)I", vec![int(-1)]).unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::UnresolvedMethod(u16::from_be_bytes(abs))
    );
    assert_eq!(err.pc, 1);
}

#[test]
fn methods_without_code() {
    let mut builder = ClassBuilder::new("Shape");
    builder.abstract_method("area", "()D");
    let class = ClassFile::parse(&builder.finish()).unwrap();

    let mut thread = Thread::new(&class, settings());
    let err = thread.invoke("area", "()D", vec![int(0)]).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::MissingCode);

    let err = thread.invoke("perimeter", "()D", vec![]).unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::MethodNotFound(String::from("perimeter:()D"))
    );
}

#[test]
fn ret_to_address_outside_code() {
    let mut builder = ClassBuilder::new("Subroutine");
    let address = builder.integer(i32::MIN).to_be_bytes();
    #[rustfmt::skip]
    let code = [
        0x12, address[1],           // 0: ldc 0x80000000
        0x3b,                       // 2: istore_0
        0xa9, 0x00,                 // 3: ret 0
    ];
    builder.method(ACC_STATIC, "escape", "()V", 1, 1, &code);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    let err = run(&class, "escape", "()V", vec![]).unwrap_err();
    assert_eq!(err.pc, 3);
    assert_eq!(err.opcode, Some(0xa9));
    assert_eq!(err.kind, ExecutionErrorKind::InvalidBranchTarget(0x8000_0000));
}

#[test]
fn deeply_nested_array_descriptor() {
    let descriptor = format!("({}I)V", "[".repeat(60000));
    let mut builder = ClassBuilder::new("Deep");
    builder.method(ACC_STATIC, "deep", &descriptor, 0, 1, &[0xb1]);
    let class = ClassFile::parse(&builder.finish()).unwrap();

    let err = run(&class, "deep", &descriptor, vec![int(0)]).unwrap_err();
    assert!(
        matches!(
            err.kind,
            ExecutionErrorKind::Decode(DecodeError::BadDescriptor(_))
        ),
        "{:?}",
        err.kind
    );
}
