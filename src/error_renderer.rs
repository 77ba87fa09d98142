//! Error rendering using ariadne
//!
//! Errors carry spans but not the program text, so every function here takes
//! the source the error came from.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<input>";

/// Render an error with source snippets to stderr
///
/// # Example
/// ```no_run
/// use plang::{Engine, render_error};
///
/// let engine = Engine::default();
/// let source = "(1, 2]";
/// if let Err(e) = engine.eval(source) {
///     render_error(source, &e);
/// }
/// ```
pub fn render_error(source: &str, error: &Error) {
    render_error_to_writer(source, error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(source: &str, error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(source, error, writer, true)
}

/// Render an error to a String (useful for logs, UIs, etc.)
pub fn render_error_to_string(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render loose diagnostics, e.g. the output of [`Engine::check`](crate::Engine::check).
pub fn render_diagnostics_to_string(source: &str, diagnostics: &[Diagnostic], use_color: bool) -> String {
    let mut buf = Vec::new();
    render_diagnostics(source, diagnostics, &mut buf, use_color).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation { diagnostics } => render_diagnostics(source, diagnostics, writer, use_color),
        Error::Runtime { diagnostic } => {
            render_diagnostics(source, std::slice::from_ref(diagnostic), writer, use_color)
        }
        Error::ResourceExceeded(err) => {
            writeln!(writer, "Resource limit exceeded: {}", err)
        }
        Error::Api(msg) => {
            writeln!(writer, "API error: {}", msg)
        }
    }
}

fn render_diagnostics(
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

        // Spans past the end (e.g. unclosed regions at EOF) point at the end.
        let end = source.len();
        let span = diag.span.0.start.min(end)..diag.span.0.end.min(end);

        let mut report = Report::build(kind, (SOURCE_ID, span.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_ID, span))
                .with_message(&diag.message)
                .with_color(color),
        );

        if let Some(help) = &diag.help {
            report = report.with_help(help);
        }

        report.finish().write((SOURCE_ID, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions};

    #[test]
    fn test_render_parse_error() {
        let engine = Engine::default();
        let source = "(1, 2]";
        let error = engine.eval(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &error);

        assert!(output.contains("Error"));
        assert!(output.contains("P001"));
        assert!(output.contains("(1, 2]"));
    }

    #[test]
    fn test_render_runtime_error() {
        let engine = Engine::new(EngineOptions {
            prelude: false,
            ..EngineOptions::default()
        });
        let source = "x = 1 + 2";
        let error = engine.eval(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &error);

        assert!(output.contains("'+' is undefined, not callable"));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_resource_error() {
        let engine = Engine::new(EngineOptions {
            evaluator: plang_core::evaluator::EvaluatorOptions {
                max_call_depth: 5,
                ..Default::default()
            },
            prelude: true,
        });
        let source = "f = () { f() }; f()";
        let error = engine.eval(source).unwrap_err();
        let output = render_error_to_string_no_color(source, &error);
        assert!(output.starts_with("Resource limit exceeded: call depth"));
    }

    #[test]
    fn test_render_checked_diagnostics() {
        let engine = Engine::default();
        let source = "a b; (2]";
        let output = render_diagnostics_to_string(source, &engine.check(source), false);
        assert!(output.contains("P008"));
        assert!(output.contains("P001"));
    }
}
