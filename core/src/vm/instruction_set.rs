//! linevm Instructions - Line-Addressed Format
//!
//! This module defines the instruction set for linevm's stack-based virtual machine.
//!
//! # Instruction Format
//!
//! Every instruction is one source line:
//! ```text
//! ┌───────────┬────────────┬──────────────────────┐
//! │  Address  │  Mnemonic  │  Operands (0 or more)│
//! │   (i64)   │  (opcode)  │        (i64)         │
//! └───────────┴────────────┴──────────────────────┘
//! ```
//!
//! Addresses are sparse: `10 PUSH 1` followed by `20 HLT` is a valid program,
//! and execution always follows address order, never textual order.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use smallvec::SmallVec;

/// Address of an instruction in the program store.
pub type Address = i64;

/// The only runtime value type.
pub type Value = i64;

/// Operand list of a single instruction.
///
/// Almost every instruction carries zero or one operand, so two inline slots
/// avoid a heap allocation for all but long `PUSH` lines.
pub type Operands = SmallVec<[Value; 2]>;

/// Instruction kind.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push every operand, in order
    /// Stack: [...] -> [..., op1, ..., opN]
    Push = 0x00,

    /// Pop N values (default 1); the last value popped lands in the accumulator
    /// Stack: [..., aN, ..., a1] -> [...]
    Pop = 0x01,

    /// Jump to the operand address if the top of the stack is zero
    /// Stack: [..., a] -> [..., a]
    IfEq = 0x02,

    /// Jump unconditionally to the operand address
    Jump = 0x03,

    /// Integer addition
    /// Stack: [..., b, a] -> [..., b + a]
    Add = 0x04,

    /// Duplicate the top of the stack
    /// Stack: [..., a] -> [..., a, a]
    Dup = 0x05,

    /// Write the top of the stack to the output sink
    /// Stack: [..., a] -> [..., a]
    Print = 0x06,

    /// No operation
    Nop = 0x07,

    /// Push the current stack size
    /// Stack: [a1, ..., aN] -> [a1, ..., aN, N]
    StackSize = 0x08,

    /// Push the accumulator
    /// Stack: [...] -> [..., acc]
    PushAcc = 0x09,

    /// Copy the top of the stack into the accumulator
    /// Stack: [..., a] -> [..., a]
    LoadAcc = 0x0A,

    /// Halt execution
    Halt = 0x0B,
}

static_assertions::assert_eq_size!(Opcode, u8);

/// How many operands an opcode accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Operands are ignored.
    None,
    /// Zero or one operand.
    Optional,
    /// Exactly one operand.
    One,
    /// Any number of operands.
    Variadic,
}

impl Arity {
    /// Whether `count` operands fit this arity. Extra operands on a
    /// nullary opcode fit, since they are ignored.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::None | Arity::Variadic => true,
            Arity::Optional => count <= 1,
            Arity::One => count == 1,
        }
    }
}

/// Mnemonic table, indexed by opcode discriminant.
const MNEMONICS: [(&str, Opcode); 12] = [
    ("PUSH", Opcode::Push),
    ("POP", Opcode::Pop),
    ("IFEQ", Opcode::IfEq),
    ("JUMP", Opcode::Jump),
    ("ADD", Opcode::Add),
    ("DUP", Opcode::Dup),
    ("PRINT", Opcode::Print),
    ("NOP", Opcode::Nop),
    ("STACKSZ", Opcode::StackSize),
    ("PUSHA", Opcode::PushAcc),
    ("LOADA", Opcode::LoadAcc),
    ("HLT", Opcode::Halt),
];

impl Opcode {
    /// All opcodes, in discriminant order.
    pub const ALL: [Opcode; 12] = [
        Opcode::Push,
        Opcode::Pop,
        Opcode::IfEq,
        Opcode::Jump,
        Opcode::Add,
        Opcode::Dup,
        Opcode::Print,
        Opcode::Nop,
        Opcode::StackSize,
        Opcode::PushAcc,
        Opcode::LoadAcc,
        Opcode::Halt,
    ];

    /// Looks up an opcode by its source token. Matching is case-sensitive.
    pub fn from_mnemonic(token: &str) -> Option<Opcode> {
        MNEMONICS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, opcode)| *opcode)
    }

    /// The source token for this opcode.
    pub fn mnemonic(self) -> &'static str {
        MNEMONICS[self as usize].0
    }

    pub fn arity(self) -> Arity {
        match self {
            Opcode::Push => Arity::Variadic,
            Opcode::Pop => Arity::Optional,
            Opcode::IfEq | Opcode::Jump => Arity::One,
            Opcode::Add
            | Opcode::Dup
            | Opcode::Print
            | Opcode::Nop
            | Opcode::StackSize
            | Opcode::PushAcc
            | Opcode::LoadAcc
            | Opcode::Halt => Arity::None,
        }
    }

    /// Returns true for opcodes whose operand is a jump target.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::IfEq | Opcode::Jump)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single decoded instruction.
///
/// Instructions are immutable once stored in a [`Program`](super::Program).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: Address,
    pub opcode: Opcode,
    pub operands: Operands,
}

impl Instruction {
    pub fn new(address: Address, opcode: Opcode, operands: &[Value]) -> Self {
        Self {
            address,
            opcode,
            operands: Operands::from_slice(operands),
        }
    }

    /// Jump target of `JUMP`/`IFEQ`, if the instruction carries exactly one operand.
    pub fn jump_target(&self) -> Option<Address> {
        match (self.opcode.is_jump(), self.operands.as_slice()) {
            (true, [target]) => Some(*target),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
