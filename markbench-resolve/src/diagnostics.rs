//! Diagnostic reporting
//!
//! Resolution never prints. Failures become `Diagnostic` values and go to
//! whatever `DiagnosticSink` the caller supplies.

use crate::error::{ErrorKind, ResolveError};
use crate::registry::SourceLocation;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request failed
    Error,
    /// Worth surfacing, not fatal
    Warning,
}

/// A structured failure report
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Failure kind, when produced from a `ResolveError`
    pub kind: Option<ErrorKind>,
    /// Human-readable detail
    pub message: String,
    /// Declaration the failure points at
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// An error with no kind or location
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: None,
            message: message.into(),
            location: None,
        }
    }

    /// A warning with no kind or location
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    /// Attach a location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl From<&ResolveError> for Diagnostic {
    fn from(err: &ResolveError) -> Self {
        Self {
            severity: Severity::Error,
            kind: Some(err.kind()),
            message: err.to_string(),
            location: err.location().cloned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match self.kind {
            Some(kind) => write!(f, "{}[{}]: {}", level, kind, self.message)?,
            None => write!(f, "{}: {}", level, self.message)?,
        }
        if let Some(loc) = &self.location {
            write!(f, "\n  --> {}", loc)?;
        }
        Ok(())
    }
}

/// Consumer of diagnostics
pub trait DiagnosticSink {
    /// Accept one diagnostic
    fn report(&mut self, diagnostic: Diagnostic);

    /// Report a plain error message
    fn error(&mut self, message: &str) {
        self.report(Diagnostic::error(message));
    }

    /// Report an error at a declaration
    fn error_at(&mut self, message: &str, location: &SourceLocation) {
        self.report(Diagnostic::error(message).at(location.clone()));
    }

    /// Report an error caused by another error
    fn error_with(&mut self, message: &str, cause: &dyn std::error::Error) {
        self.report(Diagnostic::error(format!("{} {}", message, cause)));
    }

    /// Report a resolution failure
    fn resolve_error(&mut self, err: &ResolveError) {
        self.report(Diagnostic::from(err));
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink {
    errors: usize,
}

impl TracingSink {
    /// Create a sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far
    pub fn error_count(&self) -> usize {
        self.errors
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        let location = diagnostic
            .location
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let kind = diagnostic.kind.map(ErrorKind::as_str).unwrap_or("");
        match diagnostic.severity {
            Severity::Error => {
                self.errors += 1;
                tracing::error!(kind, location = %location, "{}", diagnostic.message);
            }
            Severity::Warning => {
                tracing::warn!(kind, location = %location, "{}", diagnostic.message);
            }
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Diagnostics in report order
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any error was reported
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
