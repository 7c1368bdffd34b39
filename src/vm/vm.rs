use std::io::{self, Write};
use log::trace;
use smallvec::SmallVec;

use crate::class_parser::code::CodeAttribute;
use crate::class_parser::types::{ParsedClass, PoolIndex};
use crate::vm::frame::OperandStack;
use crate::vm::instructions::{operand_count, Opcode};
use crate::vm::native;
use crate::vm::{VmError, CODE_ATTRIBUTE, ENTRY_POINT};

const MAX_NO_OF_ARGS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ExecState {
    Running,
    Halted,
}

/// Executes one class's entry method. Owns the decoded class and the output
/// sink for the duration of the run; nothing is shared across invocations.
pub struct VirtualMachine<W> {
    class: ParsedClass,
    out: W,
    state: ExecState,
}

impl VirtualMachine<io::Stdout> {
    pub fn new(class: ParsedClass) -> Self {
        VirtualMachine::with_output(class, io::stdout())
    }
}

impl<W: Write> VirtualMachine<W> {
    pub fn with_output(class: ParsedClass, out: W) -> Self {
        VirtualMachine {
            class,
            out,
            state: ExecState::Halted,
        }
    }

    /// Scans the method table for the entry method, decodes its Code
    /// attribute and drives the dispatch loop to completion or first error.
    pub fn run_entry_method(&mut self) -> Result<(), VmError> {
        let code = self.entry_code()?;
        trace!("entry method: max_stack={} max_locals={} code={} bytes",
               code.max_stack, code.max_locals, code.code.len());

        self.state = ExecState::Running;
        self.execute(&code)
    }

    fn entry_code(&self) -> Result<CodeAttribute, VmError> {
        let mut entry = None;
        for method in &self.class.methods {
            if self.class.utf8_at(method.name_index)? == ENTRY_POINT {
                entry = Some(method);
                break;
            }
        }
        let method = entry.ok_or(VmError::EntryPointNotFound)?;

        // the executable body is found by name, not by position
        for attr in &method.attributes {
            if self.class.utf8_at(attr.attribute_name_index)? == CODE_ATTRIBUTE {
                return Ok(CodeAttribute::parse(attr)?);
            }
        }

        Err(VmError::MissingCode(ENTRY_POINT.to_string()))
    }

    fn execute(&mut self, code: &CodeAttribute) -> Result<(), VmError> {
        let mut stack = OperandStack::with_capacity(code.max_stack as usize);
        let mut pc = 0usize;

        while self.state == ExecState::Running {
            let byte = match code.code.get(pc) {
                Some(byte) => *byte,
                None => {
                    // running off the end of the stream is normal completion
                    self.state = ExecState::Halted;
                    break;
                }
            };
            let opcode = Opcode::try_from(byte)
                .map_err(|_| VmError::UnsupportedOpcode { opcode: byte, pc })?;
            let operands = code.code.get(pc + 1..pc + 1 + operand_count(opcode))
                .ok_or(VmError::TruncatedCode { pc })?;
            trace!("{} at pc {}, stack depth {}", opcode, pc, stack.depth());
            pc += 1 + operand_count(opcode);

            match opcode {
                Opcode::Getstatic => {
                    let index = PoolIndex(u16::from_be_bytes([operands[0], operands[1]]));
                    // existence only; the field kind is checked when consumed
                    self.class.cp_entry(index)?;
                    stack.push(index);
                }
                Opcode::Ldc => {
                    let index = PoolIndex(operands[0] as u16);
                    self.class.cp_entry(index)?;
                    stack.push(index);
                }
                Opcode::Invokevirtual => {
                    let index = PoolIndex(u16::from_be_bytes([operands[0], operands[1]]));
                    self.invoke_virtual(index, &mut stack)?;
                }
                Opcode::Return => {
                    self.state = ExecState::Halted;
                }
            }
        }

        Ok(())
    }

    fn invoke_virtual(&mut self, index: PoolIndex, stack: &mut OperandStack) -> Result<(), VmError> {
        let method_ref = self.class.method_ref_at(index)?;
        let callee = self.class.name_and_type_at(method_ref.name_and_type_index)?;
        let method_name = self.class.utf8_at(callee.name_index)?;
        let descriptor = self.class.utf8_at(callee.descriptor_index)?;

        let argc = descriptor_arg_count(descriptor);
        let mut args: SmallVec<[PoolIndex; MAX_NO_OF_ARGS]> = SmallVec::new();
        for _ in 0..argc {
            args.push(stack.pop()?);
        }
        args.reverse();

        // below the arguments sits the receiver, pushed by getstatic
        let receiver = stack.pop()?;
        let field_ref = self.class.field_ref_at(receiver)?;
        let declaring_class = self.class.class_name_at(field_ref.class_index)?;
        let field = self.class.name_and_type_at(field_ref.name_and_type_index)?;
        let field_descriptor = self.class.utf8_at(field.descriptor_index)?;

        let receiver_class = reference_descriptor_class(field_descriptor)
            .unwrap_or(field_descriptor);
        trace!("invokevirtual {}.{}{} via {}", receiver_class, method_name, descriptor,
               declaring_class);

        let handler = native::lookup(receiver_class, method_name, descriptor)
            .ok_or_else(|| VmError::UnsupportedNativeCall {
                class_name: receiver_class.to_string(),
                method_name: method_name.to_string(),
                descriptor: descriptor.to_string(),
            })?;

        let mut texts: SmallVec<[&str; MAX_NO_OF_ARGS]> = SmallVec::new();
        for arg in &args {
            texts.push(self.class.string_text_at(*arg)?);
        }

        handler(&texts, &mut self.out).map_err(VmError::Native)
    }
}

/// Argument count of a method descriptor, derived by splitting on `;` and
/// subtracting the trailing return-type segment. Correct for reference-typed
/// parameter lists with a primitive return marker; primitive parameters are
/// not counted.
pub(crate) fn descriptor_arg_count(descriptor: &str) -> usize {
    descriptor.split(';').count() - 1
}

/// Class name inside an `L...;` reference descriptor.
pub(crate) fn reference_descriptor_class(descriptor: &str) -> Option<&str> {
    descriptor.strip_prefix('L')?.strip_suffix(';')
}
