use thiserror::Error;
use crate::class_parser::ParseError;

pub mod frame;
pub mod instructions;
pub mod native;
pub mod vm;

/// Name the entry method must resolve to.
pub const ENTRY_POINT: &str = "main";
/// Attribute kind holding a method's executable body.
pub const CODE_ATTRIBUTE: &str = "Code";

/// Execution failures. Fatal to the current run; there is no alternate
/// execution path to retry on.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("constant pool: {0}")]
    Resolve(#[from] ParseError),
    #[error("class has no method named `main`")]
    EntryPointNotFound,
    #[error("method `{0}` has no Code attribute")]
    MissingCode(String),
    #[error("unsupported opcode {opcode:#04x} at pc {pc}")]
    UnsupportedOpcode { opcode: u8, pc: usize },
    #[error("instruction at pc {pc} runs past the end of the code stream")]
    TruncatedCode { pc: usize },
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error("unsupported native call {class_name}.{method_name}{descriptor}")]
    UnsupportedNativeCall {
        class_name: String,
        method_name: String,
        descriptor: String,
    },
    #[error("native call failed: {0}")]
    Native(#[source] std::io::Error),
}
