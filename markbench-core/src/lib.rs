#![warn(missing_docs)]
//! Markbench Core - Descriptor Model
//!
//! This crate holds the plain data every other markbench crate works on:
//! - `Loop` (the execution context) and `RunResult` (the result type)
//! - `BenchmarkType`, the closed set of execution modes
//! - `TypeDef` / `MethodDef`, static descriptors emitted by `#[suite]`

mod context;
mod mode;

pub use context::{Loop, RunResult};
pub use mode::{BenchmarkType, UnknownModeError};

/// Signature every runnable benchmark method coerces to
pub type RunnerFn = fn(&mut Loop) -> RunResult;

/// Implemented by `#[suite]` for every type that carries benchmark methods
pub trait BenchSuite {
    /// Fully-qualified type name (`module::path::Type`)
    const TYPE_NAME: &'static str;
}

/// A suite type registered via `#[suite]`
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Fully-qualified type name
    pub name: &'static str,
    /// Fully-qualified name of the parent suite, if any
    pub parent: Option<&'static str>,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
}

/// A method declared inside a `#[suite]` impl block
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Fully-qualified name of the declaring type
    pub owner: &'static str,
    /// Method name
    pub name: &'static str,
    /// Mode from the `#[benchmark]` marker; `None` when unmarked
    pub marker: Option<BenchmarkType>,
    /// Declared return type, as written
    pub returns: &'static str,
    /// Declared parameter types in order, receiver excluded
    pub params: &'static [&'static str],
    /// Generated by tooling rather than written by the user
    pub synthetic: bool,
    /// Entry point, present when the signature coerces to `RunnerFn`
    pub runner: Option<RunnerFn>,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
}

inventory::collect!(TypeDef);
inventory::collect!(MethodDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<TypeDef> {}
    for _ in inventory::iter::<MethodDef> {}
};
