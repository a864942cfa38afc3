//! linevm - a minimal line-addressed stack machine
//!
//! # Overview
//!
//! A linevm program is plain text, one instruction per line:
//!
//! ```text
//! # print "hi"
//! 10 PUSH 105 104
//! 20 PRINT
//! 30 POP
//! 40 PRINT
//! 50 HLT
//! ```
//!
//! Every line starts with an integer address. Execution begins at the
//! lowest address and proceeds in address order; `JUMP` and `IFEQ` move to
//! any stored address. Values are signed 64-bit integers on a single
//! operand stack, plus one accumulator register.
//!
//! # Quick Start
//!
//! ```
//! use linevm::{Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let program = engine.load("10 PUSH 105 104\n20 PRINT\n30 POP\n40 PRINT\n50 HLT\n").unwrap();
//!
//! let mut output = Vec::<u8>::new();
//! let report = program.run(&mut output).unwrap();
//! assert_eq!(output, b"hi");
//! assert_eq!(report.stack, vec![105]);
//! ```
//!
//! # Error Reporting
//!
//! Loader diagnostics and runtime faults carry byte spans into the program
//! text. [`render_error`] and [`render_diagnostics`] draw them as annotated
//! source snippets.

mod error_renderer;

// Re-export public API from linevm_core
pub use linevm_core::api::{
    Diagnostic, Engine, EngineOptions, Error, ExecutionOptions, LoadOptions, LoadedProgram,
    RunReport, Severity,
};

// Re-export the machine for hosts that drive it directly
pub use linevm_core::vm::{
    self, Address, ExecutionError, Fault, HaltReason, Instruction, IoSink, Machine, NullSink,
    Opcode, OutputSink, Program, Status, Value,
};
pub use linevm_core::parser::{self, Span};

pub use error_renderer::{
    render_diagnostics, render_error, render_error_to, render_error_to_string,
    render_error_to_string_no_color,
};
