use linevm::HaltReason;
use once_cell::sync::Lazy;

pub enum Expected {
    Halted {
        halt: HaltReason,
        stack: Vec<i64>,
        accumulator: i64,
    },
    Fault {
        code: &'static str,
        line: usize,
    },
}

pub struct ProgramCase {
    pub name: &'static str,
    pub source: &'static str,
    /// Bytes written by PRINT, including output before a fault.
    pub output: &'static [u8],
    pub expected: Expected,
}

pub static PROGRAM_CASES: Lazy<Vec<ProgramCase>> = Lazy::new(|| {
    vec![
        ProgramCase {
            name: "hello",
            source: "# prints hi and a newline\n\
                     10 PUSH 10 105 104\n\
                     20 PRINT\n\
                     30 POP\n\
                     40 PRINT\n\
                     50 POP\n\
                     60 PRINT\n\
                     70 HLT\n",
            output: b"hi\n",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![10],
                accumulator: 105,
            },
        },
        ProgramCase {
            name: "countdown",
            source: "10 PUSH 3\n\
                     20 IFEQ 70\n\
                     30 PRINT\n\
                     40 PUSH -1\n\
                     50 ADD\n\
                     60 JUMP 20\n\
                     70 HLT\n",
            output: b"\x03\x02\x01",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![0],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "decimal_output",
            source: "10 PUSH 1000\n20 PRINT\n30 PUSH -5\n40 PRINT\n",
            output: b"1000-5",
            expected: Expected::Halted {
                halt: HaltReason::EndOfProgram,
                stack: vec![1000, -5],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "pop_many_keeps_deepest",
            source: "10 PUSH 1 2 3\n20 POP 3\n30 PUSHA\n40 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![1],
                accumulator: 1,
            },
        },
        ProgramCase {
            name: "stack_size",
            source: "10 PUSH 5 5\n20 STACKSZ\n30 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![5, 5, 2],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "double_into_accumulator",
            source: "10 PUSH 9\n20 DUP\n30 ADD\n40 LOADA\n50 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![18],
                accumulator: 18,
            },
        },
        ProgramCase {
            name: "unknown_mnemonic_is_nop",
            source: "10 PUSH 1\n20 FROB 5\n30 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![1],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "lines_out_of_order",
            source: "30 HLT\n10 PUSH 4\n20 DUP\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![4, 4],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "ifeq_not_taken",
            source: "10 PUSH 1\n20 IFEQ 999\n30 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![1],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "bad_line_skipped",
            source: "10 PUSH 1\n15 PUSH oops\n20 HLT\n",
            output: b"",
            expected: Expected::Halted {
                halt: HaltReason::Instruction,
                stack: vec![1],
                accumulator: 0,
            },
        },
        ProgramCase {
            name: "pop_empty",
            source: "10 POP\n",
            output: b"",
            expected: Expected::Fault {
                code: "R001",
                line: 1,
            },
        },
        ProgramCase {
            name: "print_then_underflow",
            source: "10 PUSH 33\n20 PRINT\n30 POP 2\n",
            output: b"!",
            expected: Expected::Fault {
                code: "R001",
                line: 3,
            },
        },
        ProgramCase {
            name: "pop_zero",
            source: "10 PUSH 1\n20 POP 0\n",
            output: b"",
            expected: Expected::Fault {
                code: "R003",
                line: 2,
            },
        },
        ProgramCase {
            name: "unresolved_jump",
            source: "10 PUSH 0\n20 IFEQ 99\n",
            output: b"",
            expected: Expected::Fault {
                code: "R004",
                line: 2,
            },
        },
        ProgramCase {
            name: "add_overflow",
            source: "10 PUSH 9223372036854775807 1\n20 ADD\n",
            output: b"",
            expected: Expected::Fault {
                code: "R005",
                line: 2,
            },
        },
    ]
});
