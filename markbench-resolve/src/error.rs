//! Resolution errors

use crate::registry::SourceLocation;
use crate::signature::SignatureViolation;
use markbench_core::UnknownModeError;
use std::fmt;
use thiserror::Error;

/// Errors that end a single resolution request
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The qualified name has no `::` separator or an empty component
    #[error("invalid benchmark name `{0}`: expected `Type::method`")]
    InvalidQualifiedName(String),

    /// The type component could not be loaded
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// No validly marked method with the requested name exists
    #[error("no matching benchmark method `{method}` found on {type_name}")]
    MethodNotFound {
        /// Type that was searched
        type_name: String,
        /// Requested method name
        method: String,
    },

    /// A marked method with the requested name breaks the signature contract
    #[error("marked benchmark {signature} does not satisfy the signature contract: {violation}")]
    InvalidSignature {
        /// Offending method signature
        signature: String,
        /// Which check failed
        violation: SignatureViolation,
        /// Where the method is declared
        location: Option<SourceLocation>,
    },

    /// More than one validly marked method shares the requested name
    #[error("ambiguous benchmark methods named `{method}`: {}", .candidates.join(", "))]
    AmbiguousMethod {
        /// Requested method name
        method: String,
        /// Signatures of every match, in enumeration order
        candidates: Vec<String>,
        /// Where the first match is declared
        location: Option<SourceLocation>,
    },

    /// A declared mode has no handler mapping
    #[error(transparent)]
    UnknownBenchmarkType(#[from] UnknownModeError),
}

/// Discriminant of a `ResolveError`, for sinks that group by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ResolveError::InvalidQualifiedName`]
    InvalidQualifiedName,
    /// See [`ResolveError::TypeNotFound`]
    TypeNotFound,
    /// See [`ResolveError::MethodNotFound`]
    MethodNotFound,
    /// See [`ResolveError::InvalidSignature`]
    InvalidSignature,
    /// See [`ResolveError::AmbiguousMethod`]
    AmbiguousMethod,
    /// See [`ResolveError::UnknownBenchmarkType`]
    UnknownBenchmarkType,
}

impl ErrorKind {
    /// Stable short name
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidQualifiedName => "invalid-name",
            ErrorKind::TypeNotFound => "type-not-found",
            ErrorKind::MethodNotFound => "method-not-found",
            ErrorKind::InvalidSignature => "invalid-signature",
            ErrorKind::AmbiguousMethod => "ambiguous-method",
            ErrorKind::UnknownBenchmarkType => "unknown-benchmark-type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ResolveError {
    /// The kind of failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidQualifiedName(_) => ErrorKind::InvalidQualifiedName,
            ResolveError::TypeNotFound(_) => ErrorKind::TypeNotFound,
            ResolveError::MethodNotFound { .. } => ErrorKind::MethodNotFound,
            ResolveError::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            ResolveError::AmbiguousMethod { .. } => ErrorKind::AmbiguousMethod,
            ResolveError::UnknownBenchmarkType(_) => ErrorKind::UnknownBenchmarkType,
        }
    }

    /// Source location hint, when the failure points at a declaration
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            ResolveError::InvalidSignature { location, .. }
            | ResolveError::AmbiguousMethod { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}
