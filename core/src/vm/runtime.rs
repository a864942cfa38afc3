use tracing::{debug, trace};

use super::error::{ExecutionError, Fault};
use super::instruction_set::{Address, Instruction, Opcode, Value};
use super::output::{OutputSink, write_value};
use super::program::Program;
use super::stack::Stack;
use crate::api::ExecutionOptions;
use crate::Vec;

/// Why a run stopped normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// An `HLT` instruction executed.
    Instruction,
    /// Sequential advance ran past the highest address.
    EndOfProgram,
}

/// Machine status after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted(HaltReason),
}

/// Control-flow outcome of a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue at the next stored address.
    Next,
    /// Continue at a validated address.
    Jump(Address),
    Halt,
}

/// Registers and stack of one run.
#[derive(Debug)]
pub struct MachineState {
    pub stack: Stack<Value>,
    pub accumulator: Value,
    pub program_counter: Address,
    /// Instructions retired so far.
    pub steps: u64,
}

impl MachineState {
    pub fn new(entry: Address, max_stack_size: usize) -> Self {
        Self {
            stack: Stack::new(max_stack_size),
            accumulator: 0,
            program_counter: entry,
            steps: 0,
        }
    }
}

/// Executes one instruction against `state`.
///
/// Stack and accumulator effects are applied here; the program counter is
/// not touched; the returned [`Flow`] says where to go next. A failing
/// instruction leaves the stack and accumulator unchanged.
pub fn execute<S: OutputSink + ?Sized>(
    program: &Program,
    state: &mut MachineState,
    instruction: &Instruction,
    sink: &mut S,
) -> Result<Flow, Fault> {
    use Opcode::*;
    match instruction.opcode {
        Push => {
            state.stack.push_all(&instruction.operands)?;
        }
        Pop => {
            let count = pop_count(instruction)?;
            if let Some(last) = state.stack.pop_n(count)? {
                state.accumulator = last;
            }
        }
        Add => {
            state.stack.require(2)?;
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            match a.checked_add(b) {
                Some(sum) => state.stack.push(sum)?,
                None => {
                    // Put the operands back so the fault leaves no trace.
                    state.stack.push(b)?;
                    state.stack.push(a)?;
                    return Err(Fault::IntegerOverflow);
                }
            }
        }
        Dup => {
            state.stack.dup()?;
        }
        Print => {
            let top = *state.stack.peek()?;
            write_value(sink, top).map_err(|e| Fault::Output { message: e.0 })?;
        }
        StackSize => {
            let size = state.stack.len() as Value;
            state.stack.push(size)?;
        }
        PushAcc => {
            state.stack.push(state.accumulator)?;
        }
        LoadAcc => {
            state.accumulator = *state.stack.peek()?;
        }
        Jump => {
            let target = jump_operand(instruction)?;
            return resolve(program, target);
        }
        IfEq => {
            let target = jump_operand(instruction)?;
            if *state.stack.peek()? == 0 {
                return resolve(program, target);
            }
        }
        Nop => {}
        Halt => return Ok(Flow::Halt),
    }
    Ok(Flow::Next)
}

fn pop_count(instruction: &Instruction) -> Result<usize, Fault> {
    match instruction.operands.as_slice() {
        [] => Ok(1),
        // Counts beyond usize can never be satisfied; report them as underflow.
        [n] if *n >= 1 => Ok(usize::try_from(*n).unwrap_or(usize::MAX)),
        [_] => Err(Fault::InvalidOperand {
            reason: "POP count must be at least 1",
        }),
        _ => Err(Fault::InvalidOperand {
            reason: "POP takes at most one operand",
        }),
    }
}

fn jump_operand(instruction: &Instruction) -> Result<Address, Fault> {
    instruction.jump_target().ok_or(Fault::InvalidOperand {
        reason: "expected exactly one jump target",
    })
}

fn resolve(program: &Program, target: Address) -> Result<Flow, Fault> {
    if program.contains(target) {
        Ok(Flow::Jump(target))
    } else {
        Err(Fault::UnresolvedJumpTarget { target })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunState {
    Running,
    Halted(HaltReason),
    Faulted(ExecutionError),
}

/// The execution engine.
///
/// A `Machine` borrows a loaded [`Program`] and an output sink for the
/// lifetime of one run. Creating it starts the run; [`step`](Self::step)
/// executes exactly one instruction, which lets a host interleave execution
/// with its own work. [`run`](Self::run) steps until the machine halts.
///
/// Once a step fails, the machine stays faulted and every later call to
/// `step` returns the same error.
pub struct Machine<'p, S> {
    program: &'p Program,
    state: MachineState,
    run_state: RunState,
    max_steps: Option<u64>,
    sink: S,
}

impl<'p, S: OutputSink> Machine<'p, S> {
    /// Starts a run at the lowest address of `program`.
    ///
    /// Fails with [`ExecutionError::EmptyProgram`] if nothing was loaded.
    pub fn new(
        program: &'p Program,
        options: &ExecutionOptions,
        sink: S,
    ) -> Result<Self, ExecutionError> {
        let entry = program.min_address()?;
        debug!(
            entry,
            instructions = program.len(),
            max_steps = ?options.max_steps,
            "starting run"
        );
        Ok(Self {
            program,
            state: MachineState::new(entry, options.max_stack_size),
            run_state: RunState::Running,
            max_steps: options.max_steps,
            sink,
        })
    }

    /// Executes the instruction at the program counter.
    ///
    /// Returns the status after the step. Stepping a halted machine is a
    /// no-op that reports the same halt again.
    pub fn step(&mut self) -> Result<Status, ExecutionError> {
        match &self.run_state {
            RunState::Running => {}
            RunState::Halted(reason) => return Ok(Status::Halted(*reason)),
            RunState::Faulted(err) => return Err(err.clone()),
        }

        let program = self.program;
        let address = self.state.program_counter;
        if let Some(limit) = self.max_steps {
            if self.state.steps >= limit {
                return Err(self.fail(ExecutionError::StepLimitExceeded { limit, address }));
            }
        }

        // The counter only ever holds the entry point, a next_after() result,
        // or a validated jump target, so it always names a stored instruction.
        let Some(instruction) = program.get(address) else {
            return Ok(self.halt(HaltReason::EndOfProgram));
        };

        trace!(
            address,
            opcode = %instruction.opcode,
            depth = self.state.stack.len(),
            "step"
        );

        let flow = match execute(program, &mut self.state, instruction, &mut self.sink) {
            Ok(flow) => flow,
            Err(fault) => {
                return Err(self.fail(ExecutionError::Fault {
                    address,
                    opcode: instruction.opcode,
                    fault,
                }));
            }
        };
        self.state.steps += 1;

        let status = match flow {
            Flow::Next => match program.next_after(address) {
                Some(next) => {
                    self.state.program_counter = next;
                    Status::Running
                }
                None => self.halt(HaltReason::EndOfProgram),
            },
            Flow::Jump(target) => {
                self.state.program_counter = target;
                Status::Running
            }
            Flow::Halt => self.halt(HaltReason::Instruction),
        };
        Ok(status)
    }

    /// Steps until the machine halts or faults.
    pub fn run(&mut self) -> Result<HaltReason, ExecutionError> {
        loop {
            if let Status::Halted(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    fn halt(&mut self, reason: HaltReason) -> Status {
        debug!(
            ?reason,
            address = self.state.program_counter,
            steps = self.state.steps,
            "halted"
        );
        self.run_state = RunState::Halted(reason);
        Status::Halted(reason)
    }

    fn fail(&mut self, err: ExecutionError) -> ExecutionError {
        debug!(error = %err, "run faulted");
        self.run_state = RunState::Faulted(err.clone());
        err
    }
}

impl<'p, S> Machine<'p, S> {
    pub fn is_running(&self) -> bool {
        matches!(self.run_state, RunState::Running)
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.run_state {
            RunState::Halted(reason) => Some(reason),
            _ => None,
        }
    }

    /// The error that ended the run, if it faulted.
    pub fn error(&self) -> Option<&ExecutionError> {
        match &self.run_state {
            RunState::Faulted(err) => Some(err),
            _ => None,
        }
    }

    /// Stack contents, bottom first.
    pub fn stack(&self) -> &[Value] {
        self.state.stack.as_slice()
    }

    pub fn accumulator(&self) -> Value {
        self.state.accumulator
    }

    /// Address of the instruction about to execute (or the one that faulted).
    pub fn program_counter(&self) -> Address {
        self.state.program_counter
    }

    pub fn steps(&self) -> u64 {
        self.state.steps
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Snapshot of the stack and accumulator.
    pub fn snapshot(&self) -> (Vec<Value>, Value) {
        (self.stack().to_vec(), self.state.accumulator)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
