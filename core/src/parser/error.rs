use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};
use crate::vm::Arity;
use crate::{String, ToString, Vec, format, vec};

/// Syntax error on one program line. The line is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// 1-based line number.
    pub line: usize,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// The line does not start with an integer address
    MissingAddress { found: String },
    /// Integer literal out of range
    InvalidNumber { text: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, line: usize) -> Self {
        Self { kind, span, line }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                vec![],
            ),
            ParseErrorKind::MissingAddress { found } => (
                format!("Expected an integer address, found '{}'", found),
                "P002",
                vec!["Start every instruction with its address, e.g. `10 PUSH 1`".to_string()],
            ),
            ParseErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "P003",
                vec!["Integers must fit in a signed 64-bit value".to_string()],
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            line: Some(self.line),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

/// A line that loaded, but probably not as the author intended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub kind: ParseWarningKind,
    pub span: Span,
    /// 1-based line number.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarningKind {
    /// Mnemonic not in the instruction set; decoded as `NOP`
    UnknownMnemonic { mnemonic: String },
    /// Operands given to an instruction that takes none
    UnexpectedOperands { mnemonic: &'static str, count: usize },
    /// Operand count the opcode can't execute with; the line will fault
    OperandCount {
        mnemonic: &'static str,
        arity: Arity,
        count: usize,
    },
    /// Address already used by an earlier line, which is replaced
    DuplicateAddress { address: i64, previous_line: usize },
}

impl ParseWarning {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseWarningKind::UnknownMnemonic { mnemonic } => (
                format!("Unknown instruction '{}', treated as NOP", mnemonic),
                "W001",
                suggest_mnemonic(mnemonic),
            ),
            ParseWarningKind::UnexpectedOperands { mnemonic, count } => (
                format!("{} takes no operands, {} ignored", mnemonic, count),
                "W002",
                vec![],
            ),
            ParseWarningKind::OperandCount {
                mnemonic,
                arity,
                count,
            } => (
                format!(
                    "{} takes {}, found {}",
                    mnemonic,
                    match arity {
                        Arity::Optional => "at most one operand",
                        _ => "exactly one operand",
                    },
                    count
                ),
                "W004",
                vec!["this instruction faults with an invalid operand when it runs".to_string()],
            ),
            ParseWarningKind::DuplicateAddress {
                address,
                previous_line,
            } => (
                format!(
                    "Address {} already defined on line {}, replacing it",
                    address, previous_line
                ),
                "W003",
                vec![],
            ),
        };

        Diagnostic {
            severity: Severity::Warning,
            message,
            span: self.span.clone(),
            line: Some(self.line),
            help,
            code: Some(code.to_string()),
        }
    }
}

/// Suggests the canonical spelling for case mistakes like `push`.
fn suggest_mnemonic(mnemonic: &str) -> Vec<String> {
    let upper = mnemonic.to_ascii_uppercase();
    match crate::vm::Opcode::from_mnemonic(&upper) {
        Some(opcode) => vec![format!("instructions are case-sensitive: did you mean `{}`?", opcode)],
        None if upper == "HALT" => vec!["did you mean `HLT`?".to_string()],
        None => vec![],
    }
}

/// Convert a Pest error to a human-readable ParseError.
///
/// `offset` is the byte offset of the line within the whole program.
pub fn convert_pest_error(
    err: pest::error::Error<Rule>,
    line_text: &str,
    offset: usize,
    line: usize,
) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..token_end(line_text, pos)),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives: _,
        } => {
            let found = match span.str_of(line_text) {
                "" => "end of line".to_string(),
                token => format!("'{}'", token),
            };
            ParseErrorKind::UnexpectedToken {
                expected: format_expected_rules(&positives),
                found,
            }
        }
        ErrorVariant::CustomError { message } => ParseErrorKind::UnexpectedToken {
            expected: message,
            found: "something else".to_string(),
        },
    };

    ParseError::new(kind, span.shifted(offset), line)
}

/// End of the whitespace-delimited token starting at `pos`.
pub(crate) fn token_end(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + rest
        .find(|c: char| c == ' ' || c == '\t' || c == '\r')
        .unwrap_or(rest.len())
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::address => "address",
            Rule::mnemonic => "instruction name",
            Rule::operand | Rule::integer => "integer operand",
            Rule::comment => "comment",
            Rule::EOI => "end of line",
            _ => "something else",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "integer operand".to_string(),
                found: "'x'".to_string(),
            },
            Span(10..11),
            3,
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.message.contains("Expected integer operand"));
        assert!(diagnostic.message.contains("found 'x'"));
        assert_eq!(diagnostic.code, Some("P001".to_string()));
        assert_eq!(diagnostic.line, Some(3));
    }

    #[test]
    fn test_format_expected_rules() {
        assert_eq!(format_expected_rules(&[Rule::mnemonic]), "instruction name");
        assert_eq!(
            format_expected_rules(&[Rule::operand, Rule::comment, Rule::EOI]),
            "integer operand, comment or end of line"
        );
        assert_eq!(
            format_expected_rules(&[Rule::operand, Rule::integer]),
            "integer operand"
        );
    }

    #[test]
    fn test_suggest_mnemonic() {
        assert_eq!(
            suggest_mnemonic("push"),
            vec!["instructions are case-sensitive: did you mean `PUSH`?".to_string()]
        );
        assert_eq!(suggest_mnemonic("HALT"), vec!["did you mean `HLT`?".to_string()]);
        assert!(suggest_mnemonic("FROB").is_empty());
    }

    #[test]
    fn test_token_end() {
        assert_eq!(token_end("10 PUSH 1", 3), 7);
        assert_eq!(token_end("10 PUSH 1", 8), 9);
        assert_eq!(token_end("10 PUSH 1", 9), 9);
    }
}
