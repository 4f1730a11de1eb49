//! Structured diagnostics.
//!
//! Nothing in the library terminates the process. Errors are collected here
//! and the driver decides what to print and whether a fatal entry aborts.

use std::fmt;
use std::io;
use std::path::Path;

use crate::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    /// Compiler bug; the driver terminates after printing it
    Fatal,
}

/// What a diagnostic is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticContext {
    File(String),
    Location(Location),
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticContext::File(name) => write!(f, "{}", name),
            DiagnosticContext::Location(loc) => write!(f, "{}", loc),
        }
    }
}

impl From<&Location> for DiagnosticContext {
    fn from(loc: &Location) -> Self {
        DiagnosticContext::Location(loc.clone())
    }
}

impl From<Location> for DiagnosticContext {
    fn from(loc: Location) -> Self {
        DiagnosticContext::Location(loc)
    }
}

impl From<&str> for DiagnosticContext {
    fn from(file: &str) -> Self {
        DiagnosticContext::File(file.to_string())
    }
}

impl From<String> for DiagnosticContext {
    fn from(file: String) -> Self {
        DiagnosticContext::File(file)
    }
}

impl From<&Path> for DiagnosticContext {
    fn from(file: &Path) -> Self {
        DiagnosticContext::File(file.display().to_string())
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub context: DiagnosticContext,
    pub message: String,
}

impl Diagnostic {
    pub fn error(context: impl Into<DiagnosticContext>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, context: context.into(), message: message.into() }
    }

    pub fn fatal(context: impl Into<DiagnosticContext>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Fatal, context: context.into(), message: message.into() }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    pub fn location(&self) -> Option<&Location> {
        match &self.context {
            DiagnosticContext::Location(loc) => Some(loc),
            DiagnosticContext::File(_) => None,
        }
    }
}

/// Renders `ERROR: <context>: <message>` without the trailing newline
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR: {}: {}", self.context, self.message)
    }
}

/// An internal invariant was broken. Never caused by user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("aidl internal error: {message}")]
pub struct InternalError {
    pub context: DiagnosticContext,
    pub message: String,
}

impl InternalError {
    pub fn new(context: impl Into<DiagnosticContext>, message: impl Into<String>) -> Self {
        Self { context: context.into(), message: message.into() }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let message = self.to_string();
        Diagnostic::fatal(self.context, message)
    }
}

/// Collects diagnostics in report order and counts non-fatal errors.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, context: impl Into<DiagnosticContext>, message: impl Into<String>) {
        self.push(Diagnostic::error(context, message));
    }

    pub fn fatal(&mut self, context: impl Into<DiagnosticContext>, message: impl Into<String>) {
        self.push(Diagnostic::fatal(context, message));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Move every diagnostic of `other` to the end of this collector
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.error_count += other.error_count;
        self.diagnostics.append(&mut other.diagnostics);
        other.error_count = 0;
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    /// Write every diagnostic in the fixed `ERROR: ` format, one per line
    pub fn emit<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(out, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
