#![warn(missing_docs)]
//! # Markbench
//!
//! Marker-driven microbenchmarks: tag methods with `#[benchmark]`, resolve
//! them by name, and dispatch each to the handler for its execution mode.
//!
//! - **Static registration**: `#[suite]` records every method of an impl
//!   block, and its parent suite, in a compile-time table
//! - **Strict contract**: a benchmark takes `&mut Loop` and returns
//!   `RunResult`; a marked method that doesn't is an error, never skipped
//! - **Inheritance**: `#[suite(extends = Base)]` makes `Base`'s benchmarks
//!   resolvable through the child
//! - **Mode dispatch**: single-shot and loop benchmarks get different handlers
//!
//! ## Quick Start
//!
//! ```ignore
//! use markbench::prelude::*;
//!
//! pub struct Parsing;
//!
//! #[suite]
//! impl Parsing {
//!     #[benchmark]
//!     fn tokenize(l: &mut Loop) -> RunResult {
//!         while !l.is_done() {
//!             std::hint::black_box(tokenize_input());
//!         }
//!         l.result()
//!     }
//!
//!     #[benchmark(mode = "single_shot")]
//!     fn cold_start(l: &mut Loop) -> RunResult {
//!         while !l.is_done() {
//!             std::hint::black_box(build_parser());
//!         }
//!         l.result()
//!     }
//! }
//!
//! fn main() {
//!     markbench::run().unwrap();
//! }
//! ```
//!
//! ## Resolving by hand
//!
//! ```ignore
//! let registry = TypeRegistry::from_inventory();
//! let resolved = resolve_qualified(&registry, "my_benches::Parsing::tokenize")?;
//! let report = create(resolved, ExecutionConfig::default()).run()?;
//! ```

// Re-export core types
pub use markbench_core::{
    BenchSuite, BenchmarkType, Loop, MethodDef, RunResult, RunnerFn, TypeDef, UnknownModeError,
};

// Re-export macros
pub use markbench_macros::{benchmark, suite};

// Re-export resolution
pub use markbench_resolve::{
    BenchmarkTable, Classification, CollectingSink, Diagnostic, DiagnosticSink, ErrorKind,
    ExecutionConfig, ExecutionHandler, HandlerError, MethodCandidate, MethodInfo, QualifiedName,
    ResolveError, ResolvedBenchmark, RunReport, SignatureViolation, SourceLocation, TracingSink,
    TypeHandle, TypeInfo, TypeLoader, TypeRegistry, ValueKind, classify, create, enumerate,
    marked_benchmarks, resolve, resolve_all, resolve_qualified,
};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchSuite, BenchmarkType, ExecutionConfig, Loop, RunResult, TypeRegistry, benchmark,
        create, resolve, resolve_qualified, suite,
    };
}

/// Run the Markbench CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() {
///     markbench::run().unwrap();
/// }
/// ```
pub use markbench_cli::run;
