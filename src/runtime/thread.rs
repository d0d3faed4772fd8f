use super::{
    opcode_info, Control, ExecutionError, ExecutionErrorKind, Frame, Settings, StackElement,
};
use crate::jvm::{ClassFile, Code, ConstantIndex};
use crate::util::Width;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::rc::Rc;

/// Result of executing one instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// There are still frames left to run
    Running,

    /// The outermost frame returned this value (`None` for `void`)
    Finished(Option<StackElement>),
}

/// Single logical thread of execution over the methods of one class
///
/// The innermost (currently executing) frame is at the end of `frames`. Only `invokestatic` of
/// methods declared in the same class can push new frames.
pub struct Thread<'a> {
    class: &'a ClassFile,
    settings: Settings,
    frames: Vec<Frame>,

    /// Decoded `Code` attributes, keyed by method index
    code_cache: HashMap<usize, Rc<Code>>,
}

impl<'a> Thread<'a> {
    pub fn new(class: &'a ClassFile, settings: Settings) -> Thread<'a> {
        Thread {
            class,
            settings,
            frames: vec![],
            code_cache: HashMap::new(),
        }
    }

    pub fn class(&self) -> &'a ClassFile {
        self.class
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames, outermost first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Push a frame for the method with this name and descriptor
    ///
    /// The arguments seed the local variables, starting at index 0 (`long` and `double` take up
    /// two indices). For a non-`static` method, the first argument is `this`.
    pub fn invoke(
        &mut self,
        name: &str,
        descriptor: &str,
        args: Vec<StackElement>,
    ) -> Result<(), ExecutionError> {
        let method = format!("{}:{}", name, descriptor);
        let outside_code = |kind: ExecutionErrorKind| ExecutionError {
            method: method.clone(),
            pc: 0,
            opcode: None,
            kind,
        };

        let method_index = self
            .class
            .find_method_index(name, descriptor)
            .map_err(|err| outside_code(err.into()))?
            .ok_or_else(|| outside_code(ExecutionErrorKind::MethodNotFound(method.clone())))?;
        self.push_frame(method_index, args).map_err(outside_code)
    }

    /// Invoke a method and run it to completion
    pub fn invoke_and_run(
        &mut self,
        name: &str,
        descriptor: &str,
        args: Vec<StackElement>,
    ) -> Result<Option<StackElement>, ExecutionError> {
        self.invoke(name, descriptor, args)?;
        self.run()
    }

    /// Run until the outermost frame returns
    pub fn run(&mut self) -> Result<Option<StackElement>, ExecutionError> {
        loop {
            if let StepOutcome::Finished(value) = self.step()? {
                return Ok(value);
            }
        }
    }

    /// Execute exactly one instruction
    ///
    /// Stepping a thread with no frames does nothing and reports `Finished(None)`.
    pub fn step(&mut self) -> Result<StepOutcome, ExecutionError> {
        let (method_index, pc, opcode) = match self.frames.last() {
            Some(frame) => (frame.method_index, frame.pc, frame.opcode()),
            None => return Ok(StepOutcome::Finished(None)),
        };
        self.step_frame().map_err(|kind| ExecutionError {
            method: self.method_name(method_index),
            pc,
            opcode,
            kind,
        })
    }

    fn step_frame(&mut self) -> Result<StepOutcome, ExecutionErrorKind> {
        let class = self.class;
        let depth = self.frames.len();
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => return Ok(StepOutcome::Finished(None)),
        };

        let (insn, next_pc) = frame.fetch()?;
        if self.settings.trace_instructions {
            let mnemonic = frame
                .opcode()
                .and_then(opcode_info)
                .map_or("?", |info| info.mnemonic);
            trace!("[{}] {:>5}: {:<14} {:?}", depth, frame.pc, mnemonic, insn);
        }

        match frame.execute(&insn, next_pc, &class.constants)? {
            Control::Continue => Ok(StepOutcome::Running),

            Control::InvokeStatic(index) => {
                let method_index = self.resolve_static(index)?;
                let arg_count = class.methods[method_index]
                    .method_descriptor(&class.constants)?
                    .parameters
                    .len();
                let args = match self.frames.last_mut() {
                    Some(caller) => caller.stack.pop_elements(arg_count)?,
                    None => vec![],
                };
                self.push_frame(method_index, args)?;
                Ok(StepOutcome::Running)
            }

            Control::Return(value) => {
                if let Some(callee) = self.frames.pop() {
                    debug!("Leaving {}", self.method_name(callee.method_index));
                }
                match self.frames.last_mut() {
                    Some(caller) => {
                        if let Some(value) = value {
                            caller.stack.push_element(value)?;
                        }
                        Ok(StepOutcome::Running)
                    }
                    None => Ok(StepOutcome::Finished(value)),
                }
            }
        }
    }

    /// Find the method in this class that `invokestatic` refers to
    fn resolve_static(&self, index: ConstantIndex) -> Result<usize, ExecutionErrorKind> {
        let method_ref = self.class.constants.method_ref(index)?;
        if method_ref.class != self.class.this_class_name()? {
            return Err(ExecutionErrorKind::UnresolvedMethod(index.0));
        }
        match self
            .class
            .find_method_index(&method_ref.name, &method_ref.descriptor)?
        {
            Some(method_index) if self.class.methods[method_index].is_static() => Ok(method_index),
            _ => Err(ExecutionErrorKind::UnresolvedMethod(index.0)),
        }
    }

    /// Create a frame for a method, check the arguments against the descriptor, and store them
    /// in the local variables
    fn push_frame(
        &mut self,
        method_index: usize,
        args: Vec<StackElement>,
    ) -> Result<(), ExecutionErrorKind> {
        if self.frames.len() >= self.settings.max_call_depth {
            return Err(ExecutionErrorKind::CallDepthExceeded(
                self.settings.max_call_depth,
            ));
        }

        let class = self.class;
        let method = &class.methods[method_index];
        let descriptor = method.method_descriptor(&class.constants)?;
        let this_count = if method.is_static() { 0 } else { 1 };
        let expected = this_count + descriptor.parameters.len();
        if args.len() != expected {
            return Err(ExecutionErrorKind::WrongArgumentCount {
                expected,
                found: args.len(),
            });
        }
        let widths_match = args[this_count..]
            .iter()
            .zip(&descriptor.parameters)
            .all(|(arg, parameter)| arg.width() == parameter.width());
        if !widths_match || args[..this_count].iter().any(|this| this.width() != 1) {
            return Err(ExecutionErrorKind::MismatchedWidth);
        }

        let mut frame = Frame::new(method_index, self.code(method_index)?);
        let mut local_index: u16 = 0;
        for arg in args {
            frame.locals.store_element(local_index, arg)?;
            local_index += arg.width() as u16;
        }

        debug!(
            "Entering {} (depth {})",
            self.method_name(method_index),
            self.frames.len() + 1
        );
        self.frames.push(frame);
        Ok(())
    }

    /// Decoded `Code` of a method
    fn code(&mut self, method_index: usize) -> Result<Rc<Code>, ExecutionErrorKind> {
        if let Some(code) = self.code_cache.get(&method_index) {
            return Ok(code.clone());
        }
        let code = self.class.methods[method_index]
            .code(&self.class.constants)?
            .ok_or(ExecutionErrorKind::MissingCode)?;
        if !code.exception_table.is_empty() {
            warn!(
                "Ignoring {} exception handlers in {}",
                code.exception_table.len(),
                self.method_name(method_index)
            );
        }
        let code = Rc::new(code);
        self.code_cache.insert(method_index, code.clone());
        Ok(code)
    }

    /// `name:descriptor` of a method, for messages
    fn method_name(&self, method_index: usize) -> String {
        let method = &self.class.methods[method_index];
        match (
            method.name(&self.class.constants),
            method.descriptor(&self.class.constants),
        ) {
            (Ok(name), Ok(descriptor)) => format!("{}:{}", name, descriptor),
            _ => format!("<method #{}>", method_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, WriteBytesExt};
    use pretty_assertions::assert_eq;

    fn utf8(bytes: &mut Vec<u8>, text: &str) {
        bytes.push(1);
        bytes.write_u16::<BigEndian>(text.len() as u16).unwrap();
        bytes.extend_from_slice(text.as_bytes());
    }

    /// `class Answer { static int answer() { return 42; } }`
    fn answer_class() -> ClassFile {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52];
        bytes.write_u16::<BigEndian>(8).unwrap();
        utf8(&mut bytes, "Answer");
        bytes.extend_from_slice(&[7, 0, 1]);
        utf8(&mut bytes, "java/lang/Object");
        bytes.extend_from_slice(&[7, 0, 3]);
        utf8(&mut bytes, "Code");
        utf8(&mut bytes, "answer");
        utf8(&mut bytes, "()I");
        bytes.extend_from_slice(&[0, 0x21, 0, 2, 0, 4, 0, 0, 0, 0]);

        let code = [0x10, 42, 0xac]; // bipush 42; ireturn
        bytes.write_u16::<BigEndian>(1).unwrap(); // methods
        bytes.extend_from_slice(&[0, 0x09, 0, 6, 0, 7, 0, 1]);
        bytes.write_u16::<BigEndian>(5).unwrap();
        bytes.write_u32::<BigEndian>(12 + code.len() as u32).unwrap();
        bytes.extend_from_slice(&[0, 1, 0, 0]); // max_stack, max_locals
        bytes.write_u32::<BigEndian>(code.len() as u32).unwrap();
        bytes.extend_from_slice(&code);
        bytes.extend_from_slice(&[0, 0, 0, 0]); // exception table, attributes
        bytes.extend_from_slice(&[0, 0]); // class attributes

        ClassFile::parse(&bytes).unwrap()
    }

    #[test]
    fn step_through_method() {
        let class = answer_class();
        let mut thread = Thread::new(&class, Settings::default());
        assert_eq!(thread.step(), Ok(StepOutcome::Finished(None)));

        thread.invoke("answer", "()I", vec![]).unwrap();
        assert_eq!(thread.depth(), 1);
        assert_eq!(thread.step(), Ok(StepOutcome::Running));
        assert_eq!(thread.current_frame().map(|frame| frame.pc), Some(2));
        assert_eq!(
            thread.step(),
            Ok(StepOutcome::Finished(Some(StackElement::Narrow(42))))
        );
        assert_eq!(thread.depth(), 0);
    }

    #[test]
    fn missing_method() {
        let class = answer_class();
        let mut thread = Thread::new(&class, Settings::default());
        let err = thread.invoke("answer", "()J", vec![]).unwrap_err();
        assert_eq!(
            err,
            ExecutionError {
                method: String::from("answer:()J"),
                pc: 0,
                opcode: None,
                kind: ExecutionErrorKind::MethodNotFound(String::from("answer:()J")),
            }
        );
        assert_eq!(thread.depth(), 0);
    }

    #[test]
    fn wrong_argument_count() {
        let class = answer_class();
        let mut thread = Thread::new(&class, Settings::default());
        let err = thread
            .invoke("answer", "()I", vec![StackElement::Narrow(1)])
            .unwrap_err();
        assert_eq!(
            err.kind,
            ExecutionErrorKind::WrongArgumentCount {
                expected: 0,
                found: 1
            }
        );
    }

    #[test]
    fn zero_call_depth() {
        let class = answer_class();
        let settings = Settings {
            max_call_depth: 0,
            trace_instructions: false,
        };
        let mut thread = Thread::new(&class, settings);
        let err = thread.invoke("answer", "()I", vec![]).unwrap_err();
        assert_eq!(err.kind, ExecutionErrorKind::CallDepthExceeded(0));
    }
}
