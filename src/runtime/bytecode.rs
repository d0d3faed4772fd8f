//! This module contains the opcode table and a decoded form of JVM bytecode. The representation
//! is slightly different from the usual presentation to make it more convenient to interpret:
//!
//!   - The "wide" instruction doesn't show up at all, but instead gets merged into the
//!     instructions it is allowed to modify
//!
//!   - The short forms of loads and stores (eg. `iload_2`) are merged into the general form
//!
//!   - Some instructions (like the branches) get abstracted into one instruction with a field.
//!     This helps with repetitive pattern matches.
//!

use super::ExecutionErrorKind;
use crate::jvm::{ByteCursor, ClassConstantIndex, ConstantIndex, DecodeError};
use std::cmp::Ordering;

/// Number of operand bytes following an opcode
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Operands {
    Fixed(u8),

    /// Depends on the position of the instruction or on the following bytes (`tableswitch`,
    /// `lookupswitch`, `wide`)
    Variable,
}

/// Entry in the opcode table
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OpcodeInfo {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub operands: Operands,
}

const fn op(opcode: u8, mnemonic: &'static str, operand_bytes: u8) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        operands: Operands::Fixed(operand_bytes),
    }
}

const fn var(opcode: u8, mnemonic: &'static str) -> OpcodeInfo {
    OpcodeInfo {
        opcode,
        mnemonic,
        operands: Operands::Variable,
    }
}

/// Every opcode with a meaning, including the reserved ones
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-7.html
const OPCODE_LIST: &[OpcodeInfo] = &[
    // Constants
    op(0x00, "nop", 0),
    op(0x01, "aconst_null", 0),
    op(0x02, "iconst_m1", 0),
    op(0x03, "iconst_0", 0),
    op(0x04, "iconst_1", 0),
    op(0x05, "iconst_2", 0),
    op(0x06, "iconst_3", 0),
    op(0x07, "iconst_4", 0),
    op(0x08, "iconst_5", 0),
    op(0x09, "lconst_0", 0),
    op(0x0a, "lconst_1", 0),
    op(0x0b, "fconst_0", 0),
    op(0x0c, "fconst_1", 0),
    op(0x0d, "fconst_2", 0),
    op(0x0e, "dconst_0", 0),
    op(0x0f, "dconst_1", 0),
    op(0x10, "bipush", 1),
    op(0x11, "sipush", 2),
    op(0x12, "ldc", 1),
    op(0x13, "ldc_w", 2),
    op(0x14, "ldc2_w", 2),
    // Loads
    op(0x15, "iload", 1),
    op(0x16, "lload", 1),
    op(0x17, "fload", 1),
    op(0x18, "dload", 1),
    op(0x19, "aload", 1),
    op(0x1a, "iload_0", 0),
    op(0x1b, "iload_1", 0),
    op(0x1c, "iload_2", 0),
    op(0x1d, "iload_3", 0),
    op(0x1e, "lload_0", 0),
    op(0x1f, "lload_1", 0),
    op(0x20, "lload_2", 0),
    op(0x21, "lload_3", 0),
    op(0x22, "fload_0", 0),
    op(0x23, "fload_1", 0),
    op(0x24, "fload_2", 0),
    op(0x25, "fload_3", 0),
    op(0x26, "dload_0", 0),
    op(0x27, "dload_1", 0),
    op(0x28, "dload_2", 0),
    op(0x29, "dload_3", 0),
    op(0x2a, "aload_0", 0),
    op(0x2b, "aload_1", 0),
    op(0x2c, "aload_2", 0),
    op(0x2d, "aload_3", 0),
    op(0x2e, "iaload", 0),
    op(0x2f, "laload", 0),
    op(0x30, "faload", 0),
    op(0x31, "daload", 0),
    op(0x32, "aaload", 0),
    op(0x33, "baload", 0),
    op(0x34, "caload", 0),
    op(0x35, "saload", 0),
    // Stores
    op(0x36, "istore", 1),
    op(0x37, "lstore", 1),
    op(0x38, "fstore", 1),
    op(0x39, "dstore", 1),
    op(0x3a, "astore", 1),
    op(0x3b, "istore_0", 0),
    op(0x3c, "istore_1", 0),
    op(0x3d, "istore_2", 0),
    op(0x3e, "istore_3", 0),
    op(0x3f, "lstore_0", 0),
    op(0x40, "lstore_1", 0),
    op(0x41, "lstore_2", 0),
    op(0x42, "lstore_3", 0),
    op(0x43, "fstore_0", 0),
    op(0x44, "fstore_1", 0),
    op(0x45, "fstore_2", 0),
    op(0x46, "fstore_3", 0),
    op(0x47, "dstore_0", 0),
    op(0x48, "dstore_1", 0),
    op(0x49, "dstore_2", 0),
    op(0x4a, "dstore_3", 0),
    op(0x4b, "astore_0", 0),
    op(0x4c, "astore_1", 0),
    op(0x4d, "astore_2", 0),
    op(0x4e, "astore_3", 0),
    op(0x4f, "iastore", 0),
    op(0x50, "lastore", 0),
    op(0x51, "fastore", 0),
    op(0x52, "dastore", 0),
    op(0x53, "aastore", 0),
    op(0x54, "bastore", 0),
    op(0x55, "castore", 0),
    op(0x56, "sastore", 0),
    // Stack
    op(0x57, "pop", 0),
    op(0x58, "pop2", 0),
    op(0x59, "dup", 0),
    op(0x5a, "dup_x1", 0),
    op(0x5b, "dup_x2", 0),
    op(0x5c, "dup2", 0),
    op(0x5d, "dup2_x1", 0),
    op(0x5e, "dup2_x2", 0),
    op(0x5f, "swap", 0),
    // Math
    op(0x60, "iadd", 0),
    op(0x61, "ladd", 0),
    op(0x62, "fadd", 0),
    op(0x63, "dadd", 0),
    op(0x64, "isub", 0),
    op(0x65, "lsub", 0),
    op(0x66, "fsub", 0),
    op(0x67, "dsub", 0),
    op(0x68, "imul", 0),
    op(0x69, "lmul", 0),
    op(0x6a, "fmul", 0),
    op(0x6b, "dmul", 0),
    op(0x6c, "idiv", 0),
    op(0x6d, "ldiv", 0),
    op(0x6e, "fdiv", 0),
    op(0x6f, "ddiv", 0),
    op(0x70, "irem", 0),
    op(0x71, "lrem", 0),
    op(0x72, "frem", 0),
    op(0x73, "drem", 0),
    op(0x74, "ineg", 0),
    op(0x75, "lneg", 0),
    op(0x76, "fneg", 0),
    op(0x77, "dneg", 0),
    op(0x78, "ishl", 0),
    op(0x79, "lshl", 0),
    op(0x7a, "ishr", 0),
    op(0x7b, "lshr", 0),
    op(0x7c, "iushr", 0),
    op(0x7d, "lushr", 0),
    op(0x7e, "iand", 0),
    op(0x7f, "land", 0),
    op(0x80, "ior", 0),
    op(0x81, "lor", 0),
    op(0x82, "ixor", 0),
    op(0x83, "lxor", 0),
    op(0x84, "iinc", 2),
    // Conversions
    op(0x85, "i2l", 0),
    op(0x86, "i2f", 0),
    op(0x87, "i2d", 0),
    op(0x88, "l2i", 0),
    op(0x89, "l2f", 0),
    op(0x8a, "l2d", 0),
    op(0x8b, "f2i", 0),
    op(0x8c, "f2l", 0),
    op(0x8d, "f2d", 0),
    op(0x8e, "d2i", 0),
    op(0x8f, "d2l", 0),
    op(0x90, "d2f", 0),
    op(0x91, "i2b", 0),
    op(0x92, "i2c", 0),
    op(0x93, "i2s", 0),
    // Comparisons
    op(0x94, "lcmp", 0),
    op(0x95, "fcmpl", 0),
    op(0x96, "fcmpg", 0),
    op(0x97, "dcmpl", 0),
    op(0x98, "dcmpg", 0),
    op(0x99, "ifeq", 2),
    op(0x9a, "ifne", 2),
    op(0x9b, "iflt", 2),
    op(0x9c, "ifge", 2),
    op(0x9d, "ifgt", 2),
    op(0x9e, "ifle", 2),
    op(0x9f, "if_icmpeq", 2),
    op(0xa0, "if_icmpne", 2),
    op(0xa1, "if_icmplt", 2),
    op(0xa2, "if_icmpge", 2),
    op(0xa3, "if_icmpgt", 2),
    op(0xa4, "if_icmple", 2),
    op(0xa5, "if_acmpeq", 2),
    op(0xa6, "if_acmpne", 2),
    // Control
    op(0xa7, "goto", 2),
    op(0xa8, "jsr", 2),
    op(0xa9, "ret", 1),
    var(0xaa, "tableswitch"),
    var(0xab, "lookupswitch"),
    op(0xac, "ireturn", 0),
    op(0xad, "lreturn", 0),
    op(0xae, "freturn", 0),
    op(0xaf, "dreturn", 0),
    op(0xb0, "areturn", 0),
    op(0xb1, "return", 0),
    // References
    op(0xb2, "getstatic", 2),
    op(0xb3, "putstatic", 2),
    op(0xb4, "getfield", 2),
    op(0xb5, "putfield", 2),
    op(0xb6, "invokevirtual", 2),
    op(0xb7, "invokespecial", 2),
    op(0xb8, "invokestatic", 2),
    op(0xb9, "invokeinterface", 4),
    op(0xba, "invokedynamic", 4),
    op(0xbb, "new", 2),
    op(0xbc, "newarray", 1),
    op(0xbd, "anewarray", 2),
    op(0xbe, "arraylength", 0),
    op(0xbf, "athrow", 0),
    op(0xc0, "checkcast", 2),
    op(0xc1, "instanceof", 2),
    op(0xc2, "monitorenter", 0),
    op(0xc3, "monitorexit", 0),
    // Extended
    var(0xc4, "wide"),
    op(0xc5, "multianewarray", 3),
    op(0xc6, "ifnull", 2),
    op(0xc7, "ifnonnull", 2),
    op(0xc8, "goto_w", 4),
    op(0xc9, "jsr_w", 4),
    // Reserved
    op(0xca, "breakpoint", 0),
    op(0xfe, "impdep1", 0),
    op(0xff, "impdep2", 0),
];

/// Opcode table, indexed by opcode
pub static OPCODES: [Option<OpcodeInfo>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OPCODE_LIST.len() {
        table[OPCODE_LIST[i].opcode as usize] = Some(OPCODE_LIST[i]);
        i += 1;
    }
    table
};

/// Look up an opcode in the table
pub fn opcode_info(opcode: u8) -> Option<&'static OpcodeInfo> {
    OPCODES[opcode as usize].as_ref()
}

/// Decoded JVM bytecode instruction
///
/// Branch offsets are relative to the start of the branching instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    AConstNull,
    IConstM1,
    IConst0,
    IConst1,
    IConst2,
    IConst3,
    IConst4,
    IConst5,
    LConst0,
    LConst1,
    FConst0,
    FConst1,
    FConst2,
    DConst0,
    DConst1,
    BiPush(i8),
    SiPush(i16),
    Ldc(ConstantIndex), // covers both `ldc` and `ldc_w`
    Ldc2(ConstantIndex),
    ILoad(u16), // covers `iload`, `iload{0,3}`, and `wide iload`
    LLoad(u16),
    FLoad(u16),
    DLoad(u16),
    ALoad(u16),
    IALoad,
    LALoad,
    FALoad,
    DALoad,
    AALoad,
    BALoad,
    CALoad,
    SALoad,
    IStore(u16), // covers `istore`, `istore{0,3}`, and `wide istore`
    LStore(u16),
    FStore(u16),
    DStore(u16),
    AStore(u16),
    IAStore,
    LAStore,
    FAStore,
    DAStore,
    AAStore,
    BAStore,
    CAStore,
    SAStore,
    Pop,
    Pop2,
    Dup,
    DupX1,
    DupX2,
    Dup2,
    Dup2X1,
    Dup2X2,
    Swap,
    IAdd,
    LAdd,
    FAdd,
    DAdd,
    ISub,
    LSub,
    FSub,
    DSub,
    IMul,
    LMul,
    FMul,
    DMul,
    IDiv,
    LDiv,
    FDiv,
    DDiv,
    IRem,
    LRem,
    FRem,
    DRem,
    INeg,
    LNeg,
    FNeg,
    DNeg,
    ISh(ShiftType), // covers `ishr`, `ishl`, and `iushr`
    LSh(ShiftType), // covers `lshr`, `lshl`, and `lushr`
    IAnd,
    LAnd,
    IOr,
    LOr,
    IXor,
    LXor,
    IInc(u16, i16), // covers `iinc` and `wide iinc`
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
    LCmp,
    FCmp(CompareMode), // covers `fcmpl` and `fcmpg`
    DCmp(CompareMode), // covers `dcmpl` and `dcmpg`
    If(OrdComparison, i16), // covers `ifeq`, `ifne`, `iflt`, `ifge`, `ifgt`, `ifle`
    IfICmp(OrdComparison, i16), // covers `if_icmpeq`, `if_icmpne`, ... `if_icmple`
    IfACmp(EqComparison, i16), // covers `if_acmpeq`, `if_acmpne`
    Goto(i32), // covers `goto` and `goto_w`
    Jsr(i32),  // covers `jsr` and `jsr_w`
    Ret(u16),  // covers `ret` and `wide ret`
    TableSwitch {
        /// Jump target if the argument is less than `low` or greater than
        /// `low + targets.len() - 1`
        default: i32,

        /// Value associated with the first jump target
        low: i32,

        /// Jump targets
        targets: Vec<i32>,
    },
    LookupSwitch {
        /// Jump target if there is no corresponding key
        default: i32,

        /// Keys and their jump targets
        targets: Vec<(i32, i32)>,
    },
    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    GetStatic(ConstantIndex),
    PutStatic(ConstantIndex),
    GetField(ConstantIndex),
    PutField(ConstantIndex),
    Invoke(InvokeType, ConstantIndex),
    InvokeDynamic(ConstantIndex),
    New(ClassConstantIndex),
    NewArray(u8), // primitive array type code (`4` for `boolean` up to `11` for `long`)
    ANewArray(ClassConstantIndex),
    ArrayLength,
    AThrow,
    CheckCast(ClassConstantIndex),
    InstanceOf(ClassConstantIndex),
    MonitorEnter,
    MonitorExit,
    MultiANewArray(ClassConstantIndex, u8),
    IfNull(EqComparison, i16), // covers `ifnull`, `ifnonnull`
    Reserved(u8),              // covers `breakpoint`, `impdep1`, and `impdep2`
}

impl Instruction {
    /// Decode the instruction whose opcode is at `pc` in the code array
    ///
    /// Returns the instruction and the offset of the instruction following it.
    pub fn decode(code: &[u8], pc: usize) -> Result<(Instruction, usize), ExecutionErrorKind> {
        let opcode = *code
            .get(pc)
            .ok_or(ExecutionErrorKind::InvalidBranchTarget(pc as i64))?;
        let info = opcode_info(opcode).ok_or(ExecutionErrorKind::UnsupportedOpcode(opcode))?;

        let mut cursor = ByteCursor::new(&code[pc + 1..]);
        let insn = decode_operands(opcode, pc, &mut cursor).map_err(|kind| match kind {
            ExecutionErrorKind::Decode(DecodeError::UnexpectedEndOfInput { .. }) => {
                ExecutionErrorKind::TruncatedInstruction
            }
            other => other,
        })?;

        let next_pc = match info.operands {
            Operands::Fixed(n) => pc + 1 + n as usize,
            Operands::Variable => pc + 1 + cursor.position(),
        };
        Ok((insn, next_pc))
    }
}

/// Read the operands after `opcode` (the cursor starts just past the opcode)
fn decode_operands(
    opcode: u8,
    pc: usize,
    cursor: &mut ByteCursor<'_>,
) -> Result<Instruction, ExecutionErrorKind> {
    use Instruction::*;

    let insn = match opcode {
        0x00 => Nop,
        0x01 => AConstNull,
        0x02 => IConstM1,
        0x03 => IConst0,
        0x04 => IConst1,
        0x05 => IConst2,
        0x06 => IConst3,
        0x07 => IConst4,
        0x08 => IConst5,
        0x09 => LConst0,
        0x0a => LConst1,
        0x0b => FConst0,
        0x0c => FConst1,
        0x0d => FConst2,
        0x0e => DConst0,
        0x0f => DConst1,
        0x10 => BiPush(cursor.read_i8()?),
        0x11 => SiPush(cursor.read_i16()?),
        0x12 => Ldc(ConstantIndex(u16::from(cursor.read_u8()?))),
        0x13 => Ldc(cursor.read()?),
        0x14 => Ldc2(cursor.read()?),
        0x15..=0x19 | 0x36..=0x3a => load_or_store(opcode, u16::from(cursor.read_u8()?)),
        0x1a..=0x2d => load_or_store(0x15 + (opcode - 0x1a) / 4, u16::from((opcode - 0x1a) % 4)),
        0x2e => IALoad,
        0x2f => LALoad,
        0x30 => FALoad,
        0x31 => DALoad,
        0x32 => AALoad,
        0x33 => BALoad,
        0x34 => CALoad,
        0x35 => SALoad,
        0x3b..=0x4e => load_or_store(0x36 + (opcode - 0x3b) / 4, u16::from((opcode - 0x3b) % 4)),
        0x4f => IAStore,
        0x50 => LAStore,
        0x51 => FAStore,
        0x52 => DAStore,
        0x53 => AAStore,
        0x54 => BAStore,
        0x55 => CAStore,
        0x56 => SAStore,
        0x57 => Pop,
        0x58 => Pop2,
        0x59 => Dup,
        0x5a => DupX1,
        0x5b => DupX2,
        0x5c => Dup2,
        0x5d => Dup2X1,
        0x5e => Dup2X2,
        0x5f => Swap,
        0x60 => IAdd,
        0x61 => LAdd,
        0x62 => FAdd,
        0x63 => DAdd,
        0x64 => ISub,
        0x65 => LSub,
        0x66 => FSub,
        0x67 => DSub,
        0x68 => IMul,
        0x69 => LMul,
        0x6a => FMul,
        0x6b => DMul,
        0x6c => IDiv,
        0x6d => LDiv,
        0x6e => FDiv,
        0x6f => DDiv,
        0x70 => IRem,
        0x71 => LRem,
        0x72 => FRem,
        0x73 => DRem,
        0x74 => INeg,
        0x75 => LNeg,
        0x76 => FNeg,
        0x77 => DNeg,
        0x78 => ISh(ShiftType::Left),
        0x79 => LSh(ShiftType::Left),
        0x7a => ISh(ShiftType::ArithmeticRight),
        0x7b => LSh(ShiftType::ArithmeticRight),
        0x7c => ISh(ShiftType::LogicalRight),
        0x7d => LSh(ShiftType::LogicalRight),
        0x7e => IAnd,
        0x7f => LAnd,
        0x80 => IOr,
        0x81 => LOr,
        0x82 => IXor,
        0x83 => LXor,
        0x84 => {
            let index = u16::from(cursor.read_u8()?);
            let increment = i16::from(cursor.read_i8()?);
            IInc(index, increment)
        }
        0x85 => I2L,
        0x86 => I2F,
        0x87 => I2D,
        0x88 => L2I,
        0x89 => L2F,
        0x8a => L2D,
        0x8b => F2I,
        0x8c => F2L,
        0x8d => F2D,
        0x8e => D2I,
        0x8f => D2L,
        0x90 => D2F,
        0x91 => I2B,
        0x92 => I2C,
        0x93 => I2S,
        0x94 => LCmp,
        0x95 => FCmp(CompareMode::L),
        0x96 => FCmp(CompareMode::G),
        0x97 => DCmp(CompareMode::L),
        0x98 => DCmp(CompareMode::G),
        0x99 => If(OrdComparison::EQ, cursor.read_i16()?),
        0x9a => If(OrdComparison::NE, cursor.read_i16()?),
        0x9b => If(OrdComparison::LT, cursor.read_i16()?),
        0x9c => If(OrdComparison::GE, cursor.read_i16()?),
        0x9d => If(OrdComparison::GT, cursor.read_i16()?),
        0x9e => If(OrdComparison::LE, cursor.read_i16()?),
        0x9f => IfICmp(OrdComparison::EQ, cursor.read_i16()?),
        0xa0 => IfICmp(OrdComparison::NE, cursor.read_i16()?),
        0xa1 => IfICmp(OrdComparison::LT, cursor.read_i16()?),
        0xa2 => IfICmp(OrdComparison::GE, cursor.read_i16()?),
        0xa3 => IfICmp(OrdComparison::GT, cursor.read_i16()?),
        0xa4 => IfICmp(OrdComparison::LE, cursor.read_i16()?),
        0xa5 => IfACmp(EqComparison::EQ, cursor.read_i16()?),
        0xa6 => IfACmp(EqComparison::NE, cursor.read_i16()?),
        0xa7 => Goto(i32::from(cursor.read_i16()?)),
        0xa8 => Jsr(i32::from(cursor.read_i16()?)),
        0xa9 => Ret(u16::from(cursor.read_u8()?)),
        0xaa => {
            skip_switch_padding(pc, cursor)?;
            let default = cursor.read_i32()?;
            let low = cursor.read_i32()?;
            let high = cursor.read_i32()?;
            let count = i64::from(high) - i64::from(low) + 1;
            if count < 0 {
                return Err(ExecutionErrorKind::InvalidSwitch(count));
            }
            let targets = cursor.repeat(count as usize, ByteCursor::read_i32)?;
            TableSwitch {
                default,
                low,
                targets,
            }
        }
        0xab => {
            skip_switch_padding(pc, cursor)?;
            let default = cursor.read_i32()?;
            let count = cursor.read_i32()?;
            if count < 0 {
                return Err(ExecutionErrorKind::InvalidSwitch(i64::from(count)));
            }
            let targets = cursor.repeat(count as usize, |cursor| {
                Ok((cursor.read_i32()?, cursor.read_i32()?))
            })?;
            LookupSwitch { default, targets }
        }
        0xac => IReturn,
        0xad => LReturn,
        0xae => FReturn,
        0xaf => DReturn,
        0xb0 => AReturn,
        0xb1 => Return,
        0xb2 => GetStatic(cursor.read()?),
        0xb3 => PutStatic(cursor.read()?),
        0xb4 => GetField(cursor.read()?),
        0xb5 => PutField(cursor.read()?),
        0xb6 => Invoke(InvokeType::Virtual, cursor.read()?),
        0xb7 => Invoke(InvokeType::Special, cursor.read()?),
        0xb8 => Invoke(InvokeType::Static, cursor.read()?),
        0xb9 => {
            let index = cursor.read()?;
            let count = cursor.read_u8()?;
            cursor.skip(1)?;
            Invoke(InvokeType::Interface(count), index)
        }
        0xba => {
            let index = cursor.read()?;
            cursor.skip(2)?;
            InvokeDynamic(index)
        }
        0xbb => New(cursor.read()?),
        0xbc => NewArray(cursor.read_u8()?),
        0xbd => ANewArray(cursor.read()?),
        0xbe => ArrayLength,
        0xbf => AThrow,
        0xc0 => CheckCast(cursor.read()?),
        0xc1 => InstanceOf(cursor.read()?),
        0xc2 => MonitorEnter,
        0xc3 => MonitorExit,
        0xc4 => {
            let modified = cursor.read_u8()?;
            match modified {
                0x15..=0x19 | 0x36..=0x3a => load_or_store(modified, cursor.read_u16()?),
                0xa9 => Ret(cursor.read_u16()?),
                0x84 => {
                    let index = cursor.read_u16()?;
                    let increment = cursor.read_i16()?;
                    IInc(index, increment)
                }
                other => return Err(ExecutionErrorKind::InvalidWide(other)),
            }
        }
        0xc5 => {
            let class = cursor.read()?;
            let dimensions = cursor.read_u8()?;
            MultiANewArray(class, dimensions)
        }
        0xc6 => IfNull(EqComparison::EQ, cursor.read_i16()?),
        0xc7 => IfNull(EqComparison::NE, cursor.read_i16()?),
        0xc8 => Goto(cursor.read_i32()?),
        0xc9 => Jsr(cursor.read_i32()?),
        0xca | 0xfe | 0xff => Reserved(opcode),
        other => return Err(ExecutionErrorKind::UnsupportedOpcode(other)),
    };
    Ok(insn)
}

/// Build a load or store from the opcode of its one-byte index form
fn load_or_store(opcode: u8, index: u16) -> Instruction {
    match opcode {
        0x15 => Instruction::ILoad(index),
        0x16 => Instruction::LLoad(index),
        0x17 => Instruction::FLoad(index),
        0x18 => Instruction::DLoad(index),
        0x19 => Instruction::ALoad(index),
        0x36 => Instruction::IStore(index),
        0x37 => Instruction::LStore(index),
        0x38 => Instruction::FStore(index),
        0x39 => Instruction::DStore(index),
        _ => Instruction::AStore(index),
    }
}

/// Switch operands start at a multiple of four bytes from the start of the method, so there is a
/// 0-3 inclusive byte padding after the opcode
fn skip_switch_padding(pc: usize, cursor: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
    let padding = (4 - (pc + 1) % 4) % 4;
    cursor.skip(padding)
}

/// Possible bit shifts
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ShiftType {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// Comparison modes for floating point
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CompareMode {
    /// -1 on NaN
    L,

    /// 1 on NaN
    G,
}

impl CompareMode {
    /// Result pushed by the comparison
    pub fn compare<F: PartialOrd>(self, value1: F, value2: F) -> i32 {
        match value1.partial_cmp(&value2) {
            Some(Ordering::Less) => -1,
            Some(Ordering::Equal) => 0,
            Some(Ordering::Greater) => 1,
            None => match self {
                CompareMode::L => -1,
                CompareMode::G => 1,
            },
        }
    }
}

/// Binary comparison operators available for `int` branches
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OrdComparison {
    EQ,
    GE,
    GT,
    LE,
    LT,
    NE,
}

impl OrdComparison {
    /// Does the comparison hold, given how the first operand compares to the second?
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            OrdComparison::EQ => ordering == Ordering::Equal,
            OrdComparison::GE => ordering != Ordering::Less,
            OrdComparison::GT => ordering == Ordering::Greater,
            OrdComparison::LE => ordering != Ordering::Greater,
            OrdComparison::LT => ordering == Ordering::Less,
            OrdComparison::NE => ordering != Ordering::Equal,
        }
    }
}

/// Equality/inequality comparison operators
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum EqComparison {
    EQ,
    NE,
}

impl EqComparison {
    pub fn holds(self, equal: bool) -> bool {
        match self {
            EqComparison::EQ => equal,
            EqComparison::NE => !equal,
        }
    }
}

/// Type of method to invoke
///
/// Note: `InvokeDynamic` is kept separate because the constant argument it expects is not to a
/// `Constant::MethodRef`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InvokeType {
    Virtual,
    Special,
    Static,
    Interface(u8), // `count` is of total arguments, where `long`/`double` count for 2
}
