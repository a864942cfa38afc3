mod error;
mod instruction_set;
mod output;
mod program;
mod runtime;
mod stack;


pub use error::{ExecutionError, Fault};
pub use instruction_set::{Address, Arity, Instruction, Opcode, Operands, Value};
#[cfg(feature = "std")]
pub use output::IoSink;
pub use output::{NullSink, OutputSink, SinkError, write_value};
pub use program::Program;
pub use runtime::{Flow, HaltReason, Machine, MachineState, Status, execute};
pub use stack::{Stack, StackError};
