//! Signature contract for marked methods
//!
//! A marked method is a valid benchmark when it takes exactly one
//! `&mut Loop` and returns `RunResult`.

use crate::enumerate::MethodCandidate;
use crate::registry::normalize_type_text;
use markbench_core::BenchmarkType;
use thiserror::Error;

/// Final path segment of the execution context type
pub const CONTEXT_TYPE: &str = "Loop";

/// Final path segment of the result type
pub const RESULT_TYPE: &str = "RunResult";

/// Coarse classification of a declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `&mut Loop`
    Context,
    /// `RunResult`
    Result,
    /// `()`
    Unit,
    /// Anything else, as written
    Other(String),
}

impl ValueKind {
    /// Classify type text as written or as printed by a token printer
    pub fn of(text: &str) -> Self {
        let text = normalize_type_text(text);
        if text == "()" {
            return ValueKind::Unit;
        }
        let (is_reference, is_context) = match mut_reference_target(&text) {
            Some(inner) => (true, last_segment(inner) == CONTEXT_TYPE),
            None => (false, false),
        };
        if is_context {
            ValueKind::Context
        } else if !is_reference && last_segment(&text) == RESULT_TYPE {
            ValueKind::Result
        } else {
            ValueKind::Other(text)
        }
    }
}

/// `&'a mut T` or `&mut T` to `T`; `None` for anything else
fn mut_reference_target(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('&')?.trim_start();
    let rest = match rest.strip_prefix('\'') {
        Some(lifetime) => {
            let end = lifetime
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(lifetime.len());
            lifetime[end..].trim_start()
        }
        None => rest,
    };
    let rest = rest.strip_prefix("mut")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn last_segment(path: &str) -> &str {
    let path = path.trim().trim_start_matches("::");
    path.rsplit_once("::").map_or(path, |(_, last)| last)
}

/// Which part of the contract a marked method breaks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureViolation {
    /// Return type is not `RunResult`
    #[error("return type must be RunResult, found {found}")]
    ReturnType {
        /// Declared return type
        found: String,
    },

    /// Not exactly one parameter
    #[error("expected exactly 1 parameter, found {found}")]
    ParameterCount {
        /// Declared parameter count
        found: usize,
    },

    /// The single parameter is not `&mut Loop`
    #[error("parameter type must be &mut Loop, found {found}")]
    ParameterType {
        /// Declared parameter type
        found: String,
    },
}

/// Outcome of checking one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No benchmark marker; ignored by resolution
    NotMarked,
    /// Marked and well-formed, with the declared mode
    MarkedValid(BenchmarkType),
    /// Marked but malformed
    MarkedInvalid(SignatureViolation),
}

/// Check a candidate against the benchmark contract.
///
/// Checks run return type, then parameter count, then parameter type; the
/// first failure is reported.
pub fn classify(candidate: &MethodCandidate<'_>) -> Classification {
    let Some(mode) = candidate.mode() else {
        return Classification::NotMarked;
    };
    let method = candidate.method();

    if candidate.return_kind() != ValueKind::Result {
        return Classification::MarkedInvalid(SignatureViolation::ReturnType {
            found: method.returns.clone(),
        });
    }

    if method.params.len() != 1 {
        return Classification::MarkedInvalid(SignatureViolation::ParameterCount {
            found: method.params.len(),
        });
    }

    if candidate.parameter_kinds()[0] != ValueKind::Context {
        return Classification::MarkedInvalid(SignatureViolation::ParameterType {
            found: method.params[0].clone(),
        });
    }

    Classification::MarkedValid(mode)
}
