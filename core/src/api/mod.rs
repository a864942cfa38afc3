//! Public API for loading and running linevm programs.
//!
//! # Example
//!
//! ```
//! use linevm_core::api::{Engine, EngineOptions, ExecutionOptions};
//!
//! let engine = Engine::new(EngineOptions {
//!     execution: ExecutionOptions {
//!         max_steps: Some(10_000),
//!         ..ExecutionOptions::default()
//!     },
//!     ..EngineOptions::default()
//! });
//!
//! let program = engine.load("10 PUSH 104 105\n20 PRINT\n30 POP\n40 PRINT\n50 HLT\n").unwrap();
//! assert!(program.diagnostics().is_empty());
//!
//! let mut output = Vec::<u8>::new();
//! program.run(&mut output).unwrap();
//! assert_eq!(output, b"ih");
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::{Engine, LoadedProgram, RunReport};
pub use error::{Diagnostic, Error, Severity};
pub use options::{EngineOptions, ExecutionOptions, LoadOptions};
