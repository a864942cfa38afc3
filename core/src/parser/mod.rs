pub mod error;
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::LineParser;
pub use parser::Rule;
pub use parser::{ParsedLine, ParsedProgram, parse_line, parse_program};

pub use error::{ParseError, ParseErrorKind, ParseWarning, ParseWarningKind, convert_pest_error};
pub use syntax::{SourceLocation, Span};
