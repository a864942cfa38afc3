//! Public error types for the linevm API.
//!
//! This module defines the stable error types exposed to library users.
//! Loader and engine errors are converted to these public types at the API
//! boundary, where the source text is still available to attach locations.

use core::fmt;

use crate::parser::Span;
use crate::vm::{Address, ExecutionError, Fault, Opcode};
use crate::{String, ToString, Vec, format, vec};

/// Public error type for all linevm operations.
#[derive(Debug)]
pub enum Error {
    /// The program was rejected by the loader.
    ///
    /// Only produced when [`LoadOptions`](super::LoadOptions) asks for strict
    /// loading; by default bad lines are skipped and reported as diagnostics
    /// on the [`LoadedProgram`](super::LoadedProgram).
    Load { diagnostics: Vec<Diagnostic> },

    /// No instruction was loaded, so there is nothing to run.
    EmptyProgram,

    /// An instruction faulted during execution.
    ///
    /// `diagnostic` points at the faulting line; the other fields carry the
    /// same facts for callers that act on them.
    Runtime {
        diagnostic: Diagnostic,
        address: Address,
        opcode: Opcode,
        fault: Fault,
    },

    /// Resource limits exceeded (e.g. step limit).
    ResourceExceeded(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load { diagnostics } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                let warning_count = diagnostics.len() - error_count;
                write!(
                    f,
                    "Loading failed with {} error(s) and {} warning(s)",
                    error_count, warning_count
                )
            }
            Error::EmptyProgram => write!(f, "Program is empty"),
            Error::Runtime { diagnostic, .. } => write!(f, "Runtime error: {}", diagnostic.message),
            Error::ResourceExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Byte range in the program source.
    pub span: Span,

    /// 1-based source line, when the diagnostic points at one.
    pub line: Option<usize>,

    /// Suggestions for fixing the issue.
    pub help: Vec<String>,

    /// Error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Info - informational message.
    Info,
    /// Warning - the line loaded, but probably not as intended.
    Warning,
    /// Error - the line was discarded.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        write!(f, ": {}", self.message)?;
        for help_msg in &self.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }
        Ok(())
    }
}

// ============================================================================
// Conversion from engine errors
// ============================================================================

impl Error {
    /// Converts an engine error, attaching the source location of the
    /// faulting instruction when `locate` knows it.
    pub(crate) fn from_execution(
        err: ExecutionError,
        locate: impl Fn(i64) -> Option<(Span, usize)>,
    ) -> Self {
        match &err {
            ExecutionError::EmptyProgram => Error::EmptyProgram,
            ExecutionError::StepLimitExceeded { .. } => Error::ResourceExceeded(err.to_string()),
            ExecutionError::Fault {
                address,
                opcode,
                fault,
            } => {
                let (span, line) = match locate(*address) {
                    Some((span, line)) => (span, Some(line)),
                    None => (Span::new(0, 0), None),
                };
                Error::Runtime {
                    diagnostic: Diagnostic {
                        severity: Severity::Error,
                        message: err.to_string(),
                        span,
                        line,
                        help: fault_help(fault),
                        code: Some(fault.code().to_string()),
                    },
                    address: *address,
                    opcode: *opcode,
                    fault: fault.clone(),
                }
            }
        }
    }
}

fn fault_help(fault: &Fault) -> Vec<String> {
    match fault {
        Fault::StackUnderflow { needed, .. } => vec![format!(
            "push at least {} value(s) before this instruction",
            needed
        )],
        Fault::UnresolvedJumpTarget { target } => {
            vec![format!("add an instruction at address {}", target)]
        }
        Fault::InvalidOperand { .. } => {
            vec!["JUMP and IFEQ take one address; POP takes an optional count >= 1".to_string()]
        }
        _ => Vec::new(),
    }
}
