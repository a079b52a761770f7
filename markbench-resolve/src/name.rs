//! Qualified benchmark names

use crate::error::ResolveError;
use std::fmt;

/// Separator between path components
pub const SEPARATOR: &str = "::";

/// A `Type::method` name split at its last separator
///
/// Splitting is lexical: `a::b::Suite::run` becomes `("a::b::Suite", "run")`
/// whether or not `a::b::Suite` exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    type_name: String,
    method_name: String,
}

impl QualifiedName {
    /// Split `qualified` at its last separator
    pub fn parse(qualified: &str) -> Result<Self, ResolveError> {
        let invalid = || ResolveError::InvalidQualifiedName(qualified.to_string());
        let (type_name, method_name) = qualified.rsplit_once(SEPARATOR).ok_or_else(invalid)?;
        let type_name = type_name.trim();
        let method_name = method_name.trim();
        if type_name.is_empty() || method_name.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            type_name: type_name.to_string(),
            method_name: method_name.to_string(),
        })
    }

    /// Join a type and method name
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }

    /// The containing type component
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The method component
    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.type_name, SEPARATOR, self.method_name)
    }
}

impl std::str::FromStr for QualifiedName {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
