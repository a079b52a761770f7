//! Benchmark Resolver
//!
//! Finds the single benchmark method a name refers to.
//!
//! Resolution order for candidates named `method`:
//! 1. any marked candidate that breaks the signature contract fails the
//!    request, even when a valid sibling exists
//! 2. two or more valid marked candidates are ambiguous
//! 3. none is not found
//! 4. exactly one is the result

use crate::enumerate::{MethodCandidate, enumerate};
use crate::error::ResolveError;
use crate::name::QualifiedName;
use crate::registry::{MethodInfo, TypeHandle, TypeLoader, TypeRegistry};
use crate::signature::{Classification, classify};
use markbench_core::{BenchmarkType, RunnerFn};
use rayon::prelude::*;
use std::fmt;

/// The method chosen for a benchmark name
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBenchmark {
    target: String,
    method: MethodInfo,
    mode: BenchmarkType,
}

impl ResolvedBenchmark {
    /// Type the name was resolved against
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Type that declares the method (the target or one of its ancestors)
    pub fn owner(&self) -> &str {
        &self.method.owner
    }

    /// Method name
    pub fn method_name(&self) -> &str {
        &self.method.name
    }

    /// Full method descriptor
    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    /// Declared execution mode
    pub fn mode(&self) -> BenchmarkType {
        self.mode
    }

    /// Entry point, if the descriptor carries one
    pub fn runner(&self) -> Option<RunnerFn> {
        self.method.runner
    }

    /// `Target::method`
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.target, &self.method.name)
    }
}

impl fmt::Display for ResolvedBenchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.target, self.method.name)
    }
}

/// Resolve `method_name` on `ty` or its ancestors
pub fn resolve(ty: TypeHandle<'_>, method_name: &str) -> Result<ResolvedBenchmark, ResolveError> {
    let mut valid: Vec<(MethodCandidate<'_>, BenchmarkType)> = Vec::new();

    for candidate in enumerate(ty).into_iter().filter(|c| c.name() == method_name) {
        match classify(&candidate) {
            Classification::NotMarked => {
                tracing::debug!("{}: not marked, skipped", candidate.signature());
            }
            Classification::MarkedInvalid(violation) => {
                tracing::debug!("{}: invalid ({})", candidate.signature(), violation);
                return Err(ResolveError::InvalidSignature {
                    signature: candidate.signature(),
                    violation,
                    location: candidate.method().location.clone(),
                });
            }
            Classification::MarkedValid(mode) => {
                tracing::debug!("{}: valid {} benchmark", candidate.signature(), mode);
                valid.push((candidate, mode));
            }
        }
    }

    match valid.as_slice() {
        [] => Err(ResolveError::MethodNotFound {
            type_name: ty.name().to_string(),
            method: method_name.to_string(),
        }),
        [(candidate, mode)] => Ok(ResolvedBenchmark {
            target: ty.name().to_string(),
            method: candidate.method().clone(),
            mode: *mode,
        }),
        [(first, _), ..] => Err(ResolveError::AmbiguousMethod {
            method: method_name.to_string(),
            candidates: valid.iter().map(|(c, _)| c.signature()).collect(),
            location: first.method().location.clone(),
        }),
    }
}

/// Resolve a `Type::method` name, loading the type through `loader`
pub fn resolve_qualified<L>(loader: &L, qualified: &str) -> Result<ResolvedBenchmark, ResolveError>
where
    L: TypeLoader + ?Sized,
{
    let name = QualifiedName::parse(qualified)?;
    let ty = loader.load_type(name.type_name())?;
    resolve(ty, name.method_name())
}

/// Resolve many names in parallel; results keep the input order
pub fn resolve_all<L, S>(loader: &L, names: &[S]) -> Vec<Result<ResolvedBenchmark, ResolveError>>
where
    L: TypeLoader + Sync + ?Sized,
    S: AsRef<str> + Sync,
{
    names
        .par_iter()
        .map(|name| resolve_qualified(loader, name.as_ref()))
        .collect()
}

/// Every `Type::method` with at least one marked candidate, sorted
///
/// Inherited benchmarks are listed under each type that can reach them.
pub fn marked_benchmarks(registry: &TypeRegistry) -> Vec<String> {
    let mut names: Vec<String> = registry
        .types()
        .into_iter()
        .flat_map(|ty| {
            enumerate(ty)
                .into_iter()
                .filter(|c| c.has_marker())
                .map(move |c| QualifiedName::new(ty.name(), c.name()).to_string())
        })
        .collect();
    names.sort();
    names.dedup();
    names
}
