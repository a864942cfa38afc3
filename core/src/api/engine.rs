//! The linevm loading and execution engine.

use alloc::collections::BTreeMap;

use super::{Diagnostic, EngineOptions, Error, ExecutionOptions};
use crate::Vec;
use crate::parser::{self, SourceLocation};
use crate::vm::{
    Address, ExecutionError, HaltReason, Machine, OutputSink, Program, Value,
};

/// The linevm engine.
///
/// Holds the options every program loaded through it shares. Loading is
/// cheap and produces a [`LoadedProgram`] that can be run any number of
/// times.
///
/// # Example
///
/// ```
/// use linevm_core::api::{Engine, EngineOptions};
///
/// let engine = Engine::new(EngineOptions::default());
/// let program = engine.load("10 PUSH 2\n20 PUSH 3\n30 ADD\n40 HLT\n").unwrap();
///
/// let mut output = Vec::<u8>::new();
/// let report = program.run(&mut output).unwrap();
/// assert_eq!(report.stack, vec![5]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Load a program text.
    ///
    /// Bad lines are skipped and reported through
    /// [`LoadedProgram::diagnostics`]. With [`LoadOptions`](super::LoadOptions)
    /// set to strict, errors (or warnings) reject the whole program instead.
    pub fn load(&self, source: &str) -> Result<LoadedProgram, Error> {
        let parsed = parser::parse_program(source);

        let load = &self.options.load;
        if (load.fail_on_errors && parsed.has_errors())
            || (load.deny_warnings && parsed.has_warnings())
        {
            return Err(Error::Load {
                diagnostics: parsed.diagnostics,
            });
        }

        Ok(LoadedProgram {
            program: parsed.program,
            diagnostics: parsed.diagnostics,
            source_map: parsed.source_map,
            options: self.options.execution.clone(),
        })
    }
}

/// A program that went through the loader.
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    program: Program,
    diagnostics: Vec<Diagnostic>,
    source_map: BTreeMap<Address, SourceLocation>,
    options: ExecutionOptions,
}

/// Final machine state of a run that halted normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub halt: HaltReason,
    pub steps: u64,
    /// Stack contents, bottom first.
    pub stack: Vec<Value>,
    pub accumulator: Value,
}

impl LoadedProgram {
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Loader errors and warnings, in line order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Where the instruction at `address` was defined.
    pub fn location_of(&self, address: Address) -> Option<&SourceLocation> {
        self.source_map.get(&address)
    }

    pub fn execution_options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Start a run without executing anything.
    ///
    /// Use this to drive the machine one [`step`](Machine::step) at a time.
    /// Errors from the machine can be turned into located public errors
    /// with [`runtime_error`](Self::runtime_error).
    pub fn start<S: OutputSink>(&self, sink: S) -> Result<Machine<'_, S>, Error> {
        Machine::new(&self.program, &self.options, sink).map_err(|err| self.runtime_error(err))
    }

    /// Run the program to completion, writing `PRINT` output to `sink`.
    pub fn run<S: OutputSink>(&self, sink: S) -> Result<RunReport, Error> {
        let mut machine = self.start(sink)?;
        let halt = machine.run().map_err(|err| self.runtime_error(err))?;
        let (stack, accumulator) = machine.snapshot();

        Ok(RunReport {
            halt,
            steps: machine.steps(),
            stack,
            accumulator,
        })
    }

    /// Convert a machine error into a public error pointing at the
    /// faulting line.
    pub fn runtime_error(&self, err: ExecutionError) -> Error {
        Error::from_execution(err, |address| {
            self.location_of(address)
                .map(|location| (location.span.clone(), location.line))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LoadOptions, Severity};
    use crate::vm::{Fault, NullSink, Opcode};
    use pretty_assertions::assert_eq;

    fn engine_with(load: LoadOptions) -> Engine {
        Engine::new(EngineOptions {
            load,
            ..EngineOptions::default()
        })
    }

    #[test]
    fn test_load_and_run() {
        let engine = Engine::default();
        let program = engine.load("10 PUSH 72 105\n20 PRINT\n30 POP\n40 PRINT\n").unwrap();

        let mut output = Vec::<u8>::new();
        let report = program.run(&mut output).unwrap();
        assert_eq!(output, b"iH".to_vec());
        assert_eq!(
            report,
            RunReport {
                halt: HaltReason::EndOfProgram,
                steps: 4,
                stack: vec![72],
                accumulator: 105,
            }
        );
    }

    #[test]
    fn test_lenient_load_keeps_diagnostics() {
        let program = Engine::default().load("10 PUSH 1\nbad line\n20 HLT\n").unwrap();

        assert_eq!(program.program().len(), 2);
        assert_eq!(program.diagnostics().len(), 1);
        assert_eq!(program.diagnostics()[0].severity, Severity::Error);
    }

    #[test]
    fn test_strict_load_rejects_errors() {
        let engine = engine_with(LoadOptions {
            fail_on_errors: true,
            ..LoadOptions::default()
        });

        match engine.load("10 PUSH 1\nbad line\n") {
            Err(Error::Load { diagnostics }) => assert_eq!(diagnostics.len(), 1),
            other => panic!("expected load error, got {:?}", other),
        }

        // Warnings alone are fine.
        assert!(engine.load("10 FROB\n").is_ok());
    }

    #[test]
    fn test_deny_warnings() {
        let engine = engine_with(LoadOptions {
            deny_warnings: true,
            ..LoadOptions::default()
        });

        match engine.load("10 PUSH 1\n10 PUSH 2\n") {
            Err(Error::Load { diagnostics }) => {
                assert_eq!(diagnostics[0].code.as_deref(), Some("W003"))
            }
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        let program = Engine::default().load("# nothing here\n").unwrap();
        assert!(matches!(program.run(NullSink), Err(Error::EmptyProgram)));
    }

    #[test]
    fn test_runtime_error_points_at_line() {
        let source = "10 PUSH 1\n20 ADD\n";
        let program = Engine::default().load(source).unwrap();

        match program.run(NullSink) {
            Err(Error::Runtime { diagnostic, .. }) => {
                assert_eq!(diagnostic.line, Some(2));
                assert_eq!(diagnostic.span.str_of(source), "20 ADD");
                assert_eq!(diagnostic.code.as_deref(), Some("R001"));
                assert!(!diagnostic.help.is_empty());
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_error_carries_fault_details() {
        let program = Engine::default().load("10 PUSH 1\n20 ADD\n").unwrap();

        match program.run(NullSink) {
            Err(Error::Runtime {
                address,
                opcode,
                fault,
                ..
            }) => {
                assert_eq!(address, 20);
                assert_eq!(opcode, Opcode::Add);
                assert_eq!(
                    fault,
                    Fault::StackUnderflow {
                        needed: 2,
                        available: 1
                    }
                );
            }
            other => panic!("expected runtime error, got {:?}", other),
        }

        // Faults without a source location keep the structured fields.
        let error = program.runtime_error(ExecutionError::Fault {
            address: 99,
            opcode: Opcode::Jump,
            fault: Fault::UnresolvedJumpTarget { target: 5 },
        });
        match error {
            Error::Runtime {
                diagnostic,
                address,
                opcode,
                ..
            } => {
                assert_eq!(diagnostic.line, None);
                assert_eq!((address, opcode), (99, Opcode::Jump));
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_step_limit_is_resource_error() {
        let engine = Engine::new(EngineOptions {
            execution: ExecutionOptions {
                max_steps: Some(100),
                ..ExecutionOptions::default()
            },
            ..EngineOptions::default()
        });
        let program = engine.load("10 JUMP 10\n").unwrap();

        assert!(matches!(
            program.run(NullSink),
            Err(Error::ResourceExceeded(_))
        ));
    }

    #[test]
    fn test_start_allows_stepping() {
        let program = Engine::default().load("10 PUSH 1\n20 DUP\n30 HLT\n").unwrap();
        let mut machine = program.start(NullSink).unwrap();

        machine.step().unwrap();
        assert_eq!(machine.stack(), &[1]);
        assert_eq!(machine.program_counter(), 20);
        assert_eq!(
            machine.program().get(20).map(|i| i.opcode),
            Some(Opcode::Dup)
        );
        assert_eq!(machine.run().unwrap(), HaltReason::Instruction);
        assert_eq!(machine.stack(), &[1, 1]);
    }

    #[test]
    fn test_program_reruns_from_scratch() {
        let program = Engine::default().load("10 PUSH 7\n20 LOADA\n30 PUSHA\n40 HLT\n").unwrap();

        let first = program.run(NullSink).unwrap();
        let second = program.run(NullSink).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.accumulator, 7);
    }
}
