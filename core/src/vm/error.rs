//! Runtime execution errors.
//!
//! Every error here ends the current run. The engine never panics on a bad
//! program: stack underflow, malformed operands and dangling jumps all come
//! back as an [`ExecutionError`] carrying the address and opcode at fault.
//!
//! # Error Categories
//!
//! - **Startup errors**: the run cannot begin (`EmptyProgram`).
//! - **Faults**: an instruction could not execute (`Fault`).
//! - **Resource exceeded errors**: a host-imposed limit was hit
//!   (`StepLimitExceeded`).

use thiserror::Error;

use super::instruction_set::{Address, Opcode};
use super::stack::StackError;

/// Error returned by [`Machine`](super::Machine) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// No instruction was loaded before the run started.
    #[error("program is empty")]
    EmptyProgram,

    /// An instruction failed; the run is over.
    #[error("{opcode} at address {address}: {fault}")]
    Fault {
        address: Address,
        opcode: Opcode,
        fault: Fault,
    },

    /// The configured step budget ran out before the program halted.
    #[error("step limit of {limit} exceeded at address {address}")]
    StepLimitExceeded { limit: u64, address: Address },
}

/// Why a single instruction could not execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack underflow (needs {needed} value(s), stack has {available})")]
    StackUnderflow { needed: usize, available: usize },

    #[error("stack overflow (limit: {limit} values)")]
    StackOverflow { limit: usize },

    #[error("invalid operands: {reason}")]
    InvalidOperand { reason: &'static str },

    #[error("jump target {target} does not exist")]
    UnresolvedJumpTarget { target: Address },

    #[error("integer overflow")]
    IntegerOverflow,

    #[error("output sink failed: {message}")]
    Output { message: crate::String },
}

impl Fault {
    /// Stable diagnostic code for this fault.
    pub fn code(&self) -> &'static str {
        match self {
            Fault::StackUnderflow { .. } => "R001",
            Fault::StackOverflow { .. } => "R002",
            Fault::InvalidOperand { .. } => "R003",
            Fault::UnresolvedJumpTarget { .. } => "R004",
            Fault::IntegerOverflow => "R005",
            Fault::Output { .. } => "R006",
        }
    }
}

impl From<StackError> for Fault {
    fn from(e: StackError) -> Self {
        match e {
            StackError::Underflow { needed, available } => {
                Fault::StackUnderflow { needed, available }
            }
            StackError::Overflow { limit } => Fault::StackOverflow { limit },
        }
    }
}
