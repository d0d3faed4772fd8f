use super::{
    ExecutionErrorKind, Instruction, InvokeType, Reference, ReturnAddress, ShiftType,
    StackElement, Value,
};
use crate::jvm::{Code, Constant, ConstantIndex, ConstantPool};
use crate::util::{OffsetVec, Width};
use std::rc::Rc;

/// Operand stack of a frame
///
/// The capacity is counted in slots, the same way `max_stack` is: `long` and `double` take two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandStack {
    elements: OffsetVec<StackElement>,
    max_stack: usize,
}

impl OperandStack {
    pub fn new(max_stack: usize) -> OperandStack {
        OperandStack {
            elements: OffsetVec::new(),
            max_stack,
        }
    }

    /// Number of elements on the stack (not slots)
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of slots used
    pub fn depth(&self) -> usize {
        self.elements.total_width()
    }

    pub fn push<V: Value>(&mut self, value: V) -> Result<(), ExecutionErrorKind> {
        self.push_element(value.into_element())
    }

    pub fn push_element(&mut self, element: StackElement) -> Result<(), ExecutionErrorKind> {
        if self.depth() + element.width() > self.max_stack {
            return Err(ExecutionErrorKind::OperandStackOverflow);
        }
        let _ = self.elements.push(element);
        Ok(())
    }

    /// Push each element in turn (so the last one ends up on top)
    pub fn push_all(
        &mut self,
        elements: impl IntoIterator<Item = StackElement>,
    ) -> Result<(), ExecutionErrorKind> {
        for element in elements {
            self.push_element(element)?;
        }
        Ok(())
    }

    pub fn pop<V: Value>(&mut self) -> Result<V, ExecutionErrorKind> {
        V::from_element(self.pop_element()?)
    }

    pub fn pop_element(&mut self) -> Result<StackElement, ExecutionErrorKind> {
        self.elements
            .pop()
            .ok_or(ExecutionErrorKind::OperandStackUnderflow)
    }

    /// Pop an element that must be `long` or `double` (`width == 2`) or not (`width == 1`)
    fn pop_element_expecting_width(
        &mut self,
        width: usize,
    ) -> Result<StackElement, ExecutionErrorKind> {
        let element = self.pop_element()?;
        if element.width() == width {
            Ok(element)
        } else {
            Err(ExecutionErrorKind::MismatchedWidth)
        }
    }

    /// Pop `n` values of the same type, returned in the order they were pushed
    ///
    /// Nothing is popped if there aren't enough values.
    pub fn pop_many<V: Value>(&mut self, n: usize) -> Result<Vec<V>, ExecutionErrorKind> {
        self.pop_elements(n)?
            .into_iter()
            .map(V::from_element)
            .collect()
    }

    /// Pop `n` elements, returned in the order they were pushed
    ///
    /// Nothing is popped if there aren't enough elements.
    pub fn pop_elements(&mut self, n: usize) -> Result<Vec<StackElement>, ExecutionErrorKind> {
        if n > self.len() {
            return Err(ExecutionErrorKind::OperandStackUnderflow);
        }
        let mut popped = Vec::with_capacity(n);
        for _ in 0..n {
            popped.push(self.pop_element()?);
        }
        popped.reverse();
        Ok(popped)
    }

    /// Read the top of the stack without removing it
    pub fn peek<V: Value>(&self) -> Result<V, ExecutionErrorKind> {
        V::from_element(*self.peek_element(0)?)
    }

    /// Read an element `depth` elements away from the top (`0` is the top)
    pub fn peek_element(&self, depth: usize) -> Result<&StackElement, ExecutionErrorKind> {
        self.elements
            .peek(depth)
            .ok_or(ExecutionErrorKind::OperandStackUnderflow)
    }

    /// Elements from the top of the stack down
    pub fn iter_from_top(&self) -> impl Iterator<Item = &StackElement> + '_ {
        self.elements.iter().rev().map(|(_, _, element)| element)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

/// Local variables of a frame
///
/// Every slot is 32 bits. A `long` or `double` at index `i` is split across two slots: the high
/// 32 bits go into slot `i` and the low 32 bits into slot `i + 1` (the same order the halves are
/// laid out in the class file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariables {
    slots: Vec<u32>,
}

impl LocalVariables {
    pub fn new(max_locals: usize) -> LocalVariables {
        LocalVariables {
            slots: vec![0; max_locals],
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn store<V: Value>(&mut self, index: u16, value: V) -> Result<(), ExecutionErrorKind> {
        self.store_element(index, value.into_element())
    }

    pub fn store_element(
        &mut self,
        index: u16,
        element: StackElement,
    ) -> Result<(), ExecutionErrorKind> {
        let start = index as usize;
        let slots = self
            .slots
            .get_mut(start..start + element.width())
            .ok_or(ExecutionErrorKind::InvalidLocalIndex(index))?;
        match element {
            StackElement::Narrow(bits) => slots[0] = bits,
            StackElement::Wide(bits) => {
                slots[0] = (bits >> 32) as u32;
                slots[1] = bits as u32;
            }
        }
        Ok(())
    }

    pub fn load<V: Value>(&self, index: u16) -> Result<V, ExecutionErrorKind> {
        V::from_element(self.load_element(index, V::WIDTH)?)
    }

    /// Read the value at `index` that takes up `width` slots
    pub fn load_element(&self, index: u16, width: usize) -> Result<StackElement, ExecutionErrorKind> {
        let start = index as usize;
        let slots = self
            .slots
            .get(start..start + width)
            .ok_or(ExecutionErrorKind::InvalidLocalIndex(index))?;
        match *slots {
            [bits] => Ok(StackElement::Narrow(bits)),
            [high, low] => Ok(StackElement::Wide(u64::from(high) << 32 | u64::from(low))),
            _ => Err(ExecutionErrorKind::MismatchedWidth),
        }
    }
}

/// What the thread should do after an instruction has executed in a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Keep going in the same frame
    Continue,

    /// Call the method referenced by the constant, with arguments on top of the operand stack
    InvokeStatic(ConstantIndex),

    /// Pop this frame, passing the value (if any) to the caller
    Return(Option<StackElement>),
}

/// Activation of one method
#[derive(Debug, Clone)]
pub struct Frame {
    /// Index of the method in the class
    pub method_index: usize,

    /// Offset of the current instruction in the code array
    pub pc: usize,

    pub stack: OperandStack,
    pub locals: LocalVariables,
    code: Rc<Code>,
}

impl Frame {
    pub fn new(method_index: usize, code: Rc<Code>) -> Frame {
        Frame {
            method_index,
            pc: 0,
            stack: OperandStack::new(code.max_stack as usize),
            locals: LocalVariables::new(code.max_locals as usize),
            code,
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Opcode at the current `pc`
    pub fn opcode(&self) -> Option<u8> {
        self.code.code_array.get(self.pc).copied()
    }

    /// Decode the current instruction, along with the offset of the one after it
    pub fn fetch(&self) -> Result<(Instruction, usize), ExecutionErrorKind> {
        Instruction::decode(&self.code.code_array, self.pc)
    }

    /// Fetch and execute the current instruction
    pub fn step(&mut self, constants: &ConstantPool) -> Result<Control, ExecutionErrorKind> {
        let (insn, next_pc) = self.fetch()?;
        self.execute(&insn, next_pc, constants)
    }

    /// Resolve a branch offset relative to the current instruction
    fn branch_target(&self, offset: i32) -> Result<usize, ExecutionErrorKind> {
        let target = self.pc as i64 + i64::from(offset);
        if target < 0 || target as usize >= self.code.code_array.len() {
            Err(ExecutionErrorKind::InvalidBranchTarget(target))
        } else {
            Ok(target as usize)
        }
    }

    fn unsupported(&self) -> ExecutionErrorKind {
        ExecutionErrorKind::UnsupportedOpcode(self.opcode().unwrap_or(0))
    }

    /// Execute an instruction which is at `pc` and is followed by `next_pc`
    ///
    /// The program counter is updated unless the instruction returns from the frame. On error,
    /// the stack and locals may have been partially updated.
    pub fn execute(
        &mut self,
        insn: &Instruction,
        next_pc: usize,
        constants: &ConstantPool,
    ) -> Result<Control, ExecutionErrorKind> {
        use Instruction::*;

        let stack = &mut self.stack;
        let locals = &mut self.locals;

        // Offset from the current instruction, if the instruction jumps
        let mut jump: Option<i32> = None;

        match insn {
            Nop => (),
            AConstNull => stack.push(Reference::NULL)?,
            IConstM1 => stack.push(-1i32)?,
            IConst0 => stack.push(0i32)?,
            IConst1 => stack.push(1i32)?,
            IConst2 => stack.push(2i32)?,
            IConst3 => stack.push(3i32)?,
            IConst4 => stack.push(4i32)?,
            IConst5 => stack.push(5i32)?,
            LConst0 => stack.push(0i64)?,
            LConst1 => stack.push(1i64)?,
            FConst0 => stack.push(0.0f32)?,
            FConst1 => stack.push(1.0f32)?,
            FConst2 => stack.push(2.0f32)?,
            DConst0 => stack.push(0.0f64)?,
            DConst1 => stack.push(1.0f64)?,
            BiPush(byte) => stack.push(i32::from(*byte))?,
            SiPush(short) => stack.push(i32::from(*short))?,
            Ldc(index) => match constants.get(*index)? {
                Constant::Integer(int) => stack.push(*int)?,
                Constant::Float(bits) => stack.push_element(StackElement::Narrow(*bits))?,
                _ => return Err(ExecutionErrorKind::UnloadableConstant(index.0)),
            },
            Ldc2(index) => match constants.get(*index)? {
                Constant::Long(long) => stack.push(*long)?,
                Constant::Double(bits) => stack.push_element(StackElement::Wide(*bits))?,
                _ => return Err(ExecutionErrorKind::UnloadableConstant(index.0)),
            },

            ILoad(index) => stack.push(locals.load::<i32>(*index)?)?,
            LLoad(index) => stack.push(locals.load::<i64>(*index)?)?,
            FLoad(index) => stack.push(locals.load::<f32>(*index)?)?,
            DLoad(index) => stack.push(locals.load::<f64>(*index)?)?,
            ALoad(index) => stack.push(locals.load::<Reference>(*index)?)?,
            IStore(index) => locals.store(*index, stack.pop::<i32>()?)?,
            LStore(index) => locals.store(*index, stack.pop::<i64>()?)?,
            FStore(index) => locals.store(*index, stack.pop::<f32>()?)?,
            DStore(index) => locals.store(*index, stack.pop::<f64>()?)?,

            // `astore` can also store the return address pushed by `jsr`
            AStore(index) => {
                let element = stack.pop_element_expecting_width(1)?;
                locals.store_element(*index, element)?;
            }

            Pop => {
                let _ = stack.pop_element_expecting_width(1)?;
            }

            Pop2 => {
                let value1 = stack.pop_element()?;
                match value1.width() {
                    // Form 1
                    1 => {
                        let _ = stack.pop_element_expecting_width(1)?;
                    }

                    // Form 2
                    _ => (),
                }
            }

            Dup => {
                let value1 = *stack.peek_element(0)?;
                if value1.width() != 1 {
                    return Err(ExecutionErrorKind::MismatchedWidth);
                }
                stack.push_element(value1)?;
            }

            DupX1 => {
                let value1 = stack.pop_element_expecting_width(1)?;
                let value2 = stack.pop_element_expecting_width(1)?;
                stack.push_all([value1, value2, value1])?;
            }

            DupX2 => {
                let value1 = stack.pop_element_expecting_width(1)?;
                let value2 = stack.pop_element()?;
                match value2.width() {
                    // Form 1
                    1 => {
                        let value3 = stack.pop_element_expecting_width(1)?;
                        stack.push_all([value1, value3, value2, value1])?;
                    }

                    // Form 2
                    _ => stack.push_all([value1, value2, value1])?,
                }
            }

            Dup2 => {
                let value1 = stack.pop_element()?;
                match value1.width() {
                    // Form 1
                    1 => {
                        let value2 = stack.pop_element_expecting_width(1)?;
                        stack.push_all([value2, value1, value2, value1])?;
                    }

                    // Form 2
                    _ => stack.push_all([value1, value1])?,
                }
            }

            Dup2X1 => {
                let value1 = stack.pop_element()?;
                let value2 = stack.pop_element_expecting_width(1)?;
                match value1.width() {
                    // Form 1
                    1 => {
                        let value3 = stack.pop_element_expecting_width(1)?;
                        stack.push_all([value2, value1, value3, value2, value1])?;
                    }

                    // Form 2
                    _ => stack.push_all([value1, value2, value1])?,
                }
            }

            Dup2X2 => {
                let value1 = stack.pop_element()?;
                match value1.width() {
                    1 => {
                        let value2 = stack.pop_element_expecting_width(1)?;
                        let value3 = stack.pop_element()?;
                        match value3.width() {
                            // Form 1
                            1 => {
                                let value4 = stack.pop_element_expecting_width(1)?;
                                stack.push_all([value2, value1, value4, value3, value2, value1])?;
                            }

                            // Form 3
                            _ => stack.push_all([value2, value1, value3, value2, value1])?,
                        }
                    }

                    _ => {
                        let value2 = stack.pop_element()?;
                        match value2.width() {
                            // Form 2
                            1 => {
                                let value3 = stack.pop_element_expecting_width(1)?;
                                stack.push_all([value1, value3, value2, value1])?;
                            }

                            // Form 4
                            _ => stack.push_all([value1, value2, value1])?,
                        }
                    }
                }
            }

            Swap => {
                let value1 = stack.pop_element_expecting_width(1)?;
                let value2 = stack.pop_element_expecting_width(1)?;
                stack.push_all([value1, value2])?;
            }

            IAdd => binary(stack, |a: i32, b: i32| Ok(a.wrapping_add(b)))?,
            LAdd => binary(stack, |a: i64, b: i64| Ok(a.wrapping_add(b)))?,
            FAdd => binary(stack, |a: f32, b: f32| Ok(a + b))?,
            DAdd => binary(stack, |a: f64, b: f64| Ok(a + b))?,
            ISub => binary(stack, |a: i32, b: i32| Ok(a.wrapping_sub(b)))?,
            LSub => binary(stack, |a: i64, b: i64| Ok(a.wrapping_sub(b)))?,
            FSub => binary(stack, |a: f32, b: f32| Ok(a - b))?,
            DSub => binary(stack, |a: f64, b: f64| Ok(a - b))?,
            IMul => binary(stack, |a: i32, b: i32| Ok(a.wrapping_mul(b)))?,
            LMul => binary(stack, |a: i64, b: i64| Ok(a.wrapping_mul(b)))?,
            FMul => binary(stack, |a: f32, b: f32| Ok(a * b))?,
            DMul => binary(stack, |a: f64, b: f64| Ok(a * b))?,
            IDiv => binary(stack, |a: i32, b: i32| nonzero(b).map(|b| a.wrapping_div(b)))?,
            LDiv => binary(stack, |a: i64, b: i64| nonzero(b).map(|b| a.wrapping_div(b)))?,
            FDiv => binary(stack, |a: f32, b: f32| Ok(a / b))?,
            DDiv => binary(stack, |a: f64, b: f64| Ok(a / b))?,
            IRem => binary(stack, |a: i32, b: i32| nonzero(b).map(|b| a.wrapping_rem(b)))?,
            LRem => binary(stack, |a: i64, b: i64| nonzero(b).map(|b| a.wrapping_rem(b)))?,
            FRem => binary(stack, |a: f32, b: f32| Ok(a % b))?,
            DRem => binary(stack, |a: f64, b: f64| Ok(a % b))?,
            INeg => unary(stack, |a: i32| a.wrapping_neg())?,
            LNeg => unary(stack, |a: i64| a.wrapping_neg())?,
            FNeg => unary(stack, |a: f32| -a)?,
            DNeg => unary(stack, |a: f64| -a)?,

            // Only the low 5 (`int`) or 6 (`long`) bits of the shift distance are used
            ISh(shift) => {
                let distance = stack.pop::<i32>()? as u32 & 0x1f;
                let value = stack.pop::<i32>()?;
                stack.push(match shift {
                    ShiftType::Left => value << distance,
                    ShiftType::ArithmeticRight => value >> distance,
                    ShiftType::LogicalRight => ((value as u32) >> distance) as i32,
                })?;
            }
            LSh(shift) => {
                let distance = stack.pop::<i32>()? as u32 & 0x3f;
                let value = stack.pop::<i64>()?;
                stack.push(match shift {
                    ShiftType::Left => value << distance,
                    ShiftType::ArithmeticRight => value >> distance,
                    ShiftType::LogicalRight => ((value as u64) >> distance) as i64,
                })?;
            }

            IAnd => binary(stack, |a: i32, b: i32| Ok(a & b))?,
            LAnd => binary(stack, |a: i64, b: i64| Ok(a & b))?,
            IOr => binary(stack, |a: i32, b: i32| Ok(a | b))?,
            LOr => binary(stack, |a: i64, b: i64| Ok(a | b))?,
            IXor => binary(stack, |a: i32, b: i32| Ok(a ^ b))?,
            LXor => binary(stack, |a: i64, b: i64| Ok(a ^ b))?,
            IInc(index, increment) => {
                let value = locals.load::<i32>(*index)?;
                locals.store(*index, value.wrapping_add(i32::from(*increment)))?;
            }

            // Float to integer conversions saturate, with NaN going to 0
            I2L => unary(stack, |a: i32| i64::from(a))?,
            I2F => unary(stack, |a: i32| a as f32)?,
            I2D => unary(stack, |a: i32| f64::from(a))?,
            L2I => unary(stack, |a: i64| a as i32)?,
            L2F => unary(stack, |a: i64| a as f32)?,
            L2D => unary(stack, |a: i64| a as f64)?,
            F2I => unary(stack, |a: f32| a as i32)?,
            F2L => unary(stack, |a: f32| a as i64)?,
            F2D => unary(stack, |a: f32| f64::from(a))?,
            D2I => unary(stack, |a: f64| a as i32)?,
            D2L => unary(stack, |a: f64| a as i64)?,
            D2F => unary(stack, |a: f64| a as f32)?,
            I2B => unary(stack, |a: i32| a as i8)?,
            I2C => unary(stack, |a: i32| a as u16)?,
            I2S => unary(stack, |a: i32| a as i16)?,

            LCmp => binary(stack, |a: i64, b: i64| Ok(a.cmp(&b) as i32))?,
            FCmp(mode) => binary(stack, |a: f32, b: f32| Ok(mode.compare(a, b)))?,
            DCmp(mode) => binary(stack, |a: f64, b: f64| Ok(mode.compare(a, b)))?,

            If(comparison, offset) => {
                let value = stack.pop::<i32>()?;
                if comparison.holds(value.cmp(&0)) {
                    jump = Some(i32::from(*offset));
                }
            }
            IfICmp(comparison, offset) => {
                let value2 = stack.pop::<i32>()?;
                let value1 = stack.pop::<i32>()?;
                if comparison.holds(value1.cmp(&value2)) {
                    jump = Some(i32::from(*offset));
                }
            }
            IfACmp(comparison, offset) => {
                let value2 = stack.pop::<Reference>()?;
                let value1 = stack.pop::<Reference>()?;
                if comparison.holds(value1 == value2) {
                    jump = Some(i32::from(*offset));
                }
            }
            IfNull(comparison, offset) => {
                let value = stack.pop::<Reference>()?;
                if comparison.holds(value.is_null()) {
                    jump = Some(i32::from(*offset));
                }
            }
            Goto(offset) => jump = Some(*offset),
            Jsr(offset) => {
                stack.push(ReturnAddress(next_pc as u32))?;
                jump = Some(*offset);
            }
            Ret(index) => {
                let ReturnAddress(address) = locals.load(*index)?;
                if address as usize >= self.code.code_array.len() {
                    return Err(ExecutionErrorKind::InvalidBranchTarget(i64::from(address)));
                }
                self.pc = address as usize;
                return Ok(Control::Continue);
            }
            TableSwitch {
                default,
                low,
                targets,
            } => {
                let index = i64::from(stack.pop::<i32>()?) - i64::from(*low);
                let target = usize::try_from(index)
                    .ok()
                    .and_then(|index| targets.get(index));
                jump = Some(*target.unwrap_or(default));
            }
            LookupSwitch { default, targets } => {
                let key = stack.pop::<i32>()?;
                let target = targets
                    .iter()
                    .find(|(candidate, _)| *candidate == key)
                    .map_or(default, |(_, target)| target);
                jump = Some(*target);
            }

            IReturn => return Ok(Control::Return(Some(stack.pop::<i32>()?.into_element()))),
            LReturn => return Ok(Control::Return(Some(stack.pop::<i64>()?.into_element()))),
            FReturn => return Ok(Control::Return(Some(stack.pop::<f32>()?.into_element()))),
            DReturn => return Ok(Control::Return(Some(stack.pop::<f64>()?.into_element()))),
            AReturn => {
                return Ok(Control::Return(Some(
                    stack.pop::<Reference>()?.into_element(),
                )))
            }
            Return => return Ok(Control::Return(None)),

            Invoke(InvokeType::Static, index) => {
                self.pc = next_pc;
                return Ok(Control::InvokeStatic(*index));
            }

            // Everything below needs a heap, field storage, monitors, or other classes
            IALoad | LALoad | FALoad | DALoad | AALoad | BALoad | CALoad | SALoad | IAStore
            | LAStore | FAStore | DAStore | AAStore | BAStore | CAStore | SAStore
            | GetStatic(_) | PutStatic(_) | GetField(_) | PutField(_) | Invoke(_, _)
            | InvokeDynamic(_) | New(_) | NewArray(_) | ANewArray(_) | ArrayLength | AThrow
            | CheckCast(_) | InstanceOf(_) | MonitorEnter | MonitorExit | MultiANewArray(_, _)
            | Reserved(_) => return Err(self.unsupported()),
        }

        self.pc = match jump {
            Some(offset) => self.branch_target(offset)?,
            None => next_pc,
        };
        Ok(Control::Continue)
    }
}

/// Pop one value, push the result
fn unary<A: Value, B: Value>(
    stack: &mut OperandStack,
    op: impl FnOnce(A) -> B,
) -> Result<(), ExecutionErrorKind> {
    let value = stack.pop::<A>()?;
    stack.push(op(value))
}

/// Pop two values, push the result
///
/// The value on top of the stack is the second operand.
fn binary<A: Value, B: Value>(
    stack: &mut OperandStack,
    op: impl FnOnce(A, A) -> Result<B, ExecutionErrorKind>,
) -> Result<(), ExecutionErrorKind> {
    let value2 = stack.pop::<A>()?;
    let value1 = stack.pop::<A>()?;
    stack.push(op(value1, value2)?)
}

/// Integer divisor, which must not be zero
fn nonzero<I: Default + PartialEq>(divisor: I) -> Result<I, ExecutionErrorKind> {
    if divisor == I::default() {
        Err(ExecutionErrorKind::ArithmeticFault("/ by zero"))
    } else {
        Ok(divisor)
    }
}
