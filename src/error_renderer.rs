//! Error rendering using ariadne
//!
//! This module renders linevm errors and loader diagnostics with source
//! snippets and annotations. Errors don't own the program text, so every
//! entry point takes the `name` to show in headers and the `source` the
//! spans point into.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use linevm::{Engine, NullSink, render_error};
///
/// let source = "10 PUSH 1\n20 ADD\n";
/// let program = Engine::default().load(source).unwrap();
/// if let Err(e) = program.run(NullSink) {
///     render_error(&e, "add.lvm", source);
/// }
/// ```
pub fn render_error(error: &Error, name: &str, source: &str) {
    render_error_to_writer(error, name, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &Error,
    name: &str,
    source: &str,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, name, source, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error, name: &str, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, name, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, name: &str, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, name, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    name: &str,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Load { diagnostics } => {
            render_diagnostics(name, source, diagnostics, writer, use_color)?;
            writeln!(writer, "{}", error)
        }
        // Faults at addresses without a source line (hand-built programs)
        // have nothing to point at.
        Error::Runtime { diagnostic, .. } if diagnostic.line.is_none() => {
            writeln!(writer, "{}", diagnostic)
        }
        Error::Runtime { diagnostic, .. } => {
            render_diagnostics(name, source, core::slice::from_ref(diagnostic), writer, use_color)
        }
        Error::EmptyProgram => {
            writeln!(writer, "Error: {}: no instructions to run", name)
        }
        Error::ResourceExceeded(msg) => {
            writeln!(writer, "Resource limit exceeded: {}", msg)
        }
    }
}

/// Render loader or runtime diagnostics against the program text.
pub fn render_diagnostics(
    name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        // Spans are byte offsets.
        let config = ariadne::Config::default()
            .with_color(use_color)
            .with_index_type(IndexType::Byte);

        let mut report = Report::build(kind, (name, diag.span.0.clone()))
            .with_message(&diag.message)
            .with_config(config);

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        let color = colors.next();
        report = report.with_label(
            Label::new((name, diag.span.0.clone()))
                .with_message(label_for(diag))
                .with_color(color),
        );

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report
            .finish()
            .write((name, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

fn label_for(diag: &Diagnostic) -> &'static str {
    match diag.severity {
        Severity::Error if diag.code.as_deref().is_some_and(|c| c.starts_with('R')) => {
            "faulted here"
        }
        Severity::Error => "line skipped",
        Severity::Warning => "here",
        Severity::Info => "note",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions, LoadOptions, NullSink};

    #[test]
    fn test_render_load_error() {
        let engine = Engine::new(EngineOptions {
            load: LoadOptions {
                fail_on_errors: true,
                ..LoadOptions::default()
            },
            ..EngineOptions::default()
        });

        let source = "10 PUSH 1\n20 PUSH one\n";
        let result = engine.load(source);

        assert!(result.is_err());
        if let Err(e) = result {
            let output = render_error_to_string_no_color(&e, "bad.lvm", source);

            assert!(output.contains("Error"));
            assert!(output.contains("P001"));
            // Should show the offending line
            assert!(output.contains("20 PUSH one"));
            assert!(output.contains("bad.lvm"));
            assert!(output.contains("Loading failed with 1 error(s) and 0 warning(s)"));
        }
    }

    #[test]
    fn test_render_runtime_error() {
        let source = "10 PUSH 1\n20 JUMP 99\n";
        let program = Engine::default().load(source).unwrap();
        let result = program.run(NullSink);

        assert!(result.is_err());
        if let Err(e) = result {
            let output = render_error_to_string_no_color(&e, "jump.lvm", source);

            assert!(output.contains("R004"));
            assert!(output.contains("20 JUMP 99"));
            assert!(output.contains("add an instruction at address 99"));
        }
    }

    #[test]
    fn test_render_warnings() {
        let source = "10 push 1\n20 HLT\n";
        let program = Engine::default().load(source).unwrap();

        let mut buf = Vec::new();
        render_diagnostics("warn.lvm", source, program.diagnostics(), &mut buf, false).unwrap();
        let output = String::from_utf8_lossy(&buf);

        assert!(output.contains("Warning"));
        assert!(output.contains("W001"));
        assert!(output.contains("did you mean `PUSH`?"));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_empty_program() {
        let program = Engine::default().load("").unwrap();
        let err = program.run(NullSink).unwrap_err();

        let output = render_error_to_string_no_color(&err, "empty.lvm", "");
        assert_eq!(output, "Error: empty.lvm: no instructions to run\n");
    }
}
