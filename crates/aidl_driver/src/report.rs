//! Diagnostic rendering: the plain `ERROR: file:line:col: message` stream, or
//! ariadne reports with a source excerpt.

use std::collections::HashMap;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

use aidl_ast::{Diagnostic, Diagnostics, Location};
use aidl_check::AidlError;
use aidl_lexer::LineIndex;
use aidl_parser::IoDelegate;
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Add a diagnostic for failures that did not report one themselves.
/// Internal errors become fatal, so the driver stops right after printing.
pub fn record_unreported(err: &AidlError, diags: &mut Diagnostics) {
    match err {
        AidlError::Internal(internal) => diags.push(internal.clone().into_diagnostic()),
        AidlError::Io { path, source } => diags.error(path.as_path(), source.to_string()),
        _ => {}
    }
}

pub fn emit_plain<W: Write>(diags: &Diagnostics, out: &mut W) -> io::Result<()> {
    diags.emit(out)
}

/// Render to stderr. Diagnostics whose file cannot be read fall back to
/// the plain format.
pub fn emit_pretty(diags: &Diagnostics, io: &dyn IoDelegate) -> io::Result<()> {
    let mut sources: HashMap<String, Option<String>> = HashMap::new();
    let mut stderr = io::stderr();

    for diagnostic in diags {
        let Some(location) = diagnostic.location() else {
            writeln!(stderr, "{}", diagnostic)?;
            continue;
        };
        let file = location.file().to_string();
        let text = sources
            .entry(file.clone())
            .or_insert_with(|| io.read_file(Path::new(&file)).ok());
        match text.as_deref() {
            Some(text) => pretty_report(diagnostic, location, &file, text).eprint((file.clone(), Source::from(text)))?,
            None => writeln!(stderr, "{}", diagnostic)?,
        }
    }
    Ok(())
}

fn pretty_report<'a>(
    diagnostic: &Diagnostic,
    location: &Location,
    file: &str,
    text: &str,
) -> Report<'a, (String, Range<usize>)> {
    let range = byte_range(location, text);
    let kind = if diagnostic.is_fatal() { ReportKind::Custom("FATAL", Color::Red) } else { ReportKind::Error };
    Report::build(kind, file.to_string(), range.start)
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((file.to_string(), range))
                .with_message(&diagnostic.message)
                .with_color(Color::Red),
        )
        .finish()
}

/// Byte range of a location, at least one character wide when the source
/// has room for it
pub fn byte_range(location: &Location, text: &str) -> Range<usize> {
    let index = LineIndex::new(text);
    let begin = location.begin();
    let end = location.end();
    let start = index.offset(begin.line, begin.column).min(text.len());
    let stop = index.offset(end.line, end.column).min(text.len()).max(start);
    if stop == start && start < text.len() {
        return start..start + 1;
    }
    start..stop
}
