use alloc::collections::BTreeMap;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::{debug, warn};

use crate::api::Diagnostic;
use crate::parser::error::{
    ParseError, ParseErrorKind, ParseWarning, ParseWarningKind, convert_pest_error, token_end,
};
use crate::parser::syntax::{SourceLocation, Span};
use crate::vm::{Address, Arity, Instruction, Opcode, Operands, Program, Value};
use crate::{ToString, Vec};

#[derive(Parser)]
#[grammar = "parser/program.pest"]
pub struct LineParser;

/// One instruction line, before the mnemonic is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub address: Address,
    pub mnemonic: &'a str,
    /// `None` when the mnemonic is not in the instruction set.
    pub opcode: Option<Opcode>,
    pub operands: Operands,
    /// Address through last operand, relative to the line.
    pub span: Span,
    pub mnemonic_span: Span,
}

impl ParsedLine<'_> {
    /// The decoded instruction; unknown mnemonics decode to `NOP`.
    pub fn to_instruction(&self) -> Instruction {
        Instruction {
            address: self.address,
            opcode: self.opcode.unwrap_or(Opcode::Nop),
            operands: self.operands.clone(),
        }
    }
}

/// Result of loading a whole program text.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    pub program: Program,
    /// Errors for skipped lines and warnings for suspicious ones, in line order.
    pub diagnostics: Vec<Diagnostic>,
    /// Source location of every stored instruction.
    pub source_map: BTreeMap<Address, SourceLocation>,
}

impl ParsedProgram {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::api::Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == crate::api::Severity::Warning)
    }
}

/// Parses a single line.
///
/// Returns `Ok(None)` for blank lines and comments. Spans in the result are
/// relative to `text`; `line` is only used for error reporting.
pub fn parse_line(text: &str, line: usize) -> Result<Option<ParsedLine<'_>>, ParseError> {
    let mut pairs = match LineParser::parse(Rule::line, text) {
        Ok(pairs) => pairs,
        Err(err) => return Err(classify_error(err, text, line)),
    };

    let Some(line_pair) = pairs.next() else {
        return Ok(None);
    };
    let Some(instruction) = line_pair
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::instruction)
    else {
        return Ok(None);
    };

    let start = instruction.as_span().start();
    let mut end = start;
    let mut address = None;
    let mut mnemonic = None;
    let mut operands = Operands::new();

    for pair in instruction.into_inner() {
        match pair.as_rule() {
            Rule::address => {
                end = pair.as_span().end();
                address = Some(parse_integer(pair, line)?);
            }
            Rule::mnemonic => {
                end = pair.as_span().end();
                mnemonic = Some((pair.as_str(), Span::from(pair.as_span())));
            }
            Rule::operand => {
                end = pair.as_span().end();
                operands.push(parse_integer(pair, line)?);
            }
            _ => {}
        }
    }

    // The grammar guarantees both are present in an `instruction` pair.
    let (Some(address), Some((mnemonic, mnemonic_span))) = (address, mnemonic) else {
        return Ok(None);
    };

    Ok(Some(ParsedLine {
        address,
        mnemonic,
        opcode: Opcode::from_mnemonic(mnemonic),
        operands,
        span: Span::new(start, end),
        mnemonic_span,
    }))
}

fn parse_integer(pair: Pair<'_, Rule>, line: usize) -> Result<Value, ParseError> {
    let text = pair.as_str();
    text.parse::<Value>().map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidNumber {
                text: text.to_string(),
            },
            Span::from(pair.as_span()),
            line,
        )
    })
}

/// A line whose first token isn't a whole integer is reported as a missing
/// address; anything else goes through the generic pest conversion.
fn classify_error(err: pest::error::Error<Rule>, text: &str, line: usize) -> ParseError {
    let trimmed = text.trim_start_matches([' ', '\t']);
    let start = text.len() - trimmed.len();
    let end = token_end(text, start);
    let first = &text[start..end];
    let first_digits = first.strip_prefix(['+', '-']).unwrap_or(first);

    let rest = first_digits.trim_start_matches(|c: char| c.is_ascii_digit());
    let is_integer =
        rest.len() < first_digits.len() && (rest.is_empty() || rest.starts_with('#'));

    if !is_integer {
        return ParseError::new(
            ParseErrorKind::MissingAddress {
                found: first.to_string(),
            },
            Span::new(start, end),
            line,
        );
    }
    convert_pest_error(err, text, 0, line)
}

/// Loads a whole program text.
///
/// Loading never fails: lines with syntax errors are skipped and reported,
/// unknown mnemonics decode to `NOP` with a warning, and a repeated address
/// replaces the earlier instruction with a warning. Operand counts that
/// don't fit the opcode's arity are loaded as written, with a warning. All spans in the result
/// are relative to `source`.
pub fn parse_program(source: &str) -> ParsedProgram {
    let mut parsed = ParsedProgram::default();
    let mut offset = 0;

    for (index, text) in source.split('\n').enumerate() {
        let line = index + 1;
        let line_offset = offset;
        offset += text.len() + 1;

        let parsed_line = match parse_line(text, line) {
            Ok(Some(parsed_line)) => parsed_line,
            Ok(None) => continue,
            Err(err) => {
                let err = ParseError {
                    span: err.span.shifted(line_offset),
                    ..err
                };
                warn!(line, error = %err, "skipping line");
                parsed.diagnostics.push(err.to_diagnostic());
                continue;
            }
        };

        let instruction = parsed_line.to_instruction();
        let span = parsed_line.span.shifted(line_offset);
        debug!(line, instruction = %instruction, "loaded");

        let mut warnings = Vec::new();
        match parsed_line.opcode {
            None => warnings.push(ParseWarning {
                kind: ParseWarningKind::UnknownMnemonic {
                    mnemonic: parsed_line.mnemonic.to_string(),
                },
                span: parsed_line.mnemonic_span.shifted(line_offset),
                line,
            }),
            Some(opcode) if opcode.arity() == Arity::None && !instruction.operands.is_empty() => {
                warnings.push(ParseWarning {
                    kind: ParseWarningKind::UnexpectedOperands {
                        mnemonic: opcode.mnemonic(),
                        count: instruction.operands.len(),
                    },
                    span: span.clone(),
                    line,
                })
            }
            Some(opcode) if !opcode.arity().accepts(instruction.operands.len()) => {
                warnings.push(ParseWarning {
                    kind: ParseWarningKind::OperandCount {
                        mnemonic: opcode.mnemonic(),
                        arity: opcode.arity(),
                        count: instruction.operands.len(),
                    },
                    span: span.clone(),
                    line,
                })
            }
            Some(_) => {}
        }

        let address = instruction.address;
        if parsed.program.insert(instruction).is_some() {
            let previous_line = parsed
                .source_map
                .get(&address)
                .map(|location| location.line)
                .unwrap_or_default();
            warnings.push(ParseWarning {
                kind: ParseWarningKind::DuplicateAddress {
                    address,
                    previous_line,
                },
                span: span.clone(),
                line,
            });
        }
        parsed
            .source_map
            .insert(address, SourceLocation { span, line });

        for warning in warnings {
            let diagnostic = warning.to_diagnostic();
            warn!(line, "{}", diagnostic.message);
            parsed.diagnostics.push(diagnostic);
        }
    }

    parsed
}
