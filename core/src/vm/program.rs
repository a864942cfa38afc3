use alloc::collections::BTreeMap;
use alloc::collections::BTreeSet;
use core::ops::Bound;

use super::error::ExecutionError;
use super::instruction_set::{Address, Instruction};

/// Sparse, address-ordered instruction store.
///
/// Execution follows key order, not insertion order, so a program may be
/// assembled from lines in any sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: BTreeMap<Address, Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instruction` at its own address, returning the instruction it
    /// replaced, if any.
    pub fn insert(&mut self, instruction: Instruction) -> Option<Instruction> {
        self.instructions.insert(instruction.address, instruction)
    }

    pub fn get(&self, address: Address) -> Option<&Instruction> {
        self.instructions.get(&address)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.instructions.contains_key(&address)
    }

    /// Lowest stored address, where execution starts.
    pub fn min_address(&self) -> Result<Address, ExecutionError> {
        self.instructions
            .first_key_value()
            .map(|(address, _)| *address)
            .ok_or(ExecutionError::EmptyProgram)
    }

    pub fn max_address(&self) -> Result<Address, ExecutionError> {
        self.instructions
            .last_key_value()
            .map(|(address, _)| *address)
            .ok_or(ExecutionError::EmptyProgram)
    }

    /// Smallest stored address strictly greater than `address`.
    ///
    /// `None` means the end of the program.
    pub fn next_after(&self, address: Address) -> Option<Address> {
        self.instructions
            .range((Bound::Excluded(address), Bound::Unbounded))
            .next()
            .map(|(address, _)| *address)
    }

    /// Instructions in execution (address) order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.values()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        let mut program = Program::new();
        for instruction in iter {
            program.insert(instruction);
        }
        program
    }
}

impl core::fmt::Display for Program {
    /// Writes one instruction per line. Jump targets get an `Ln:` label and
    /// jumps to missing addresses are flagged.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // First pass: collect jump targets that actually exist
        let targets: BTreeSet<Address> = self
            .iter()
            .filter_map(Instruction::jump_target)
            .filter(|target| self.contains(*target))
            .collect();

        // Assign label numbers in address order for deterministic output
        let labels: BTreeMap<Address, usize> = targets
            .into_iter()
            .enumerate()
            .map(|(i, address)| (address, i))
            .collect();

        // Second pass: print instructions with labels
        for instruction in self.iter() {
            match labels.get(&instruction.address) {
                Some(label) => write!(f, "{:>5} ", alloc::format!("L{}:", label))?,
                None => write!(f, "{:>5} ", "")?,
            }
            write!(f, "{}", instruction)?;

            if let Some(target) = instruction.jump_target() {
                match labels.get(&target) {
                    Some(label) => write!(f, " (to L{})", label)?,
                    None => write!(f, " (to @{}, missing)", target)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
