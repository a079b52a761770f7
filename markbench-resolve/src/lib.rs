#![warn(missing_docs)]
//! Markbench Resolve - Benchmark Method Resolution
//!
//! Turns a benchmark name into a ready-to-run handler:
//!
//! ```text
//! "app::Suite::run"  ──▶ QualifiedName ──▶ TypeLoader ──▶ TypeHandle
//!                                                            │
//!                              enumerate (type + ancestors) ◀┘
//!                                         │
//!                              classify (signature contract)
//!                                         │
//!                              resolve ──▶ ResolvedBenchmark
//!                                         │
//!                              create  ──▶ ExecutionHandler
//! ```
//!
//! Every step is a pure function of immutable registry data, so batches can
//! be resolved in parallel with [`resolve_all`].

mod diagnostics;
mod enumerate;
mod error;
mod handler;
mod name;
mod registry;
mod resolver;
mod signature;
mod table;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use enumerate::{MethodCandidate, enumerate};
pub use error::{ErrorKind, ResolveError};
pub use handler::{
    ExecutionConfig, ExecutionHandler, HandlerError, LoopHandler, RunReport, ShotHandler, create,
};
pub use name::{QualifiedName, SEPARATOR};
pub use registry::{
    MethodInfo, SourceLocation, TypeHandle, TypeInfo, TypeLoader, TypeRegistry,
    normalize_type_text,
};
pub use resolver::{
    ResolvedBenchmark, marked_benchmarks, resolve, resolve_all, resolve_qualified,
};
pub use signature::{
    CONTEXT_TYPE, Classification, RESULT_TYPE, SignatureViolation, ValueKind, classify,
};
pub use table::{BenchmarkTable, MethodRecord, TableError, TypeRecord};
