//! Handler Factory
//!
//! Maps a resolved benchmark's mode to the handler that will run it.
//!
//! ```text
//! ResolvedBenchmark ──┬── SingleShot ──▶ ShotHandler
//!                     └── Loop ────────▶ LoopHandler
//! ```

use crate::resolver::ResolvedBenchmark;
use markbench_core::{BenchmarkType, Loop, RunResult, RunnerFn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Settings handed to a handler unexamined by the factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Warmup time in nanoseconds (loop mode)
    pub warmup_time_ns: u64,
    /// Time per measured invocation in nanoseconds (loop mode)
    pub measurement_time_ns: u64,
    /// Measured invocations (loop mode)
    pub iterations: u64,
    /// Invocations (single-shot mode)
    pub shots: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            warmup_time_ns: 1_000_000_000,      // 1 second
            measurement_time_ns: 1_000_000_000, // 1 second
            iterations: 5,
            shots: 10,
        }
    }
}

/// Errors raised while a handler runs
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandlerError {
    /// The descriptor has no entry point (e.g. loaded from a table)
    #[error("benchmark {0} has no runnable entry point")]
    NotRunnable(String),
}

/// Results of one handler run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// `Target::method`
    pub benchmark: String,
    /// Mode the handler ran in
    pub mode: BenchmarkType,
    /// One entry per measured invocation
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// Operations across all invocations
    pub fn total_ops(&self) -> u64 {
        self.results.iter().map(|r| r.ops).sum()
    }

    /// Time across all invocations, in nanoseconds
    pub fn total_time_ns(&self) -> u64 {
        self.results.iter().map(|r| r.elapsed_ns).sum()
    }

    /// Mean nanoseconds per operation
    pub fn mean_ns_per_op(&self) -> f64 {
        RunResult {
            ops: self.total_ops(),
            elapsed_ns: self.total_time_ns(),
        }
        .ns_per_op()
    }
}

/// Runs a single-shot benchmark: one operation per invocation
#[derive(Debug, Clone)]
pub struct ShotHandler {
    benchmark: ResolvedBenchmark,
    config: ExecutionConfig,
}

impl ShotHandler {
    fn run(&self) -> Result<RunReport, HandlerError> {
        let runner = runner_for(&self.benchmark)?;
        let shots = self.config.shots.max(1);
        tracing::debug!("{}: {} single shots", self.benchmark, shots);

        let results = (0..shots)
            .map(|_| runner(&mut Loop::single_shot()))
            .collect();

        Ok(RunReport {
            benchmark: self.benchmark.to_string(),
            mode: BenchmarkType::SingleShot,
            results,
        })
    }
}

/// Runs a looping benchmark: warmup, then timed invocations
#[derive(Debug, Clone)]
pub struct LoopHandler {
    benchmark: ResolvedBenchmark,
    config: ExecutionConfig,
}

impl LoopHandler {
    fn run(&self) -> Result<RunReport, HandlerError> {
        let runner = runner_for(&self.benchmark)?;

        if self.config.warmup_time_ns > 0 {
            let warmup = runner(&mut Loop::timed(Duration::from_nanos(
                self.config.warmup_time_ns,
            )));
            tracing::debug!("{}: warmup {} ops", self.benchmark, warmup.ops);
        }

        let measurement = Duration::from_nanos(self.config.measurement_time_ns);
        let results = (0..self.config.iterations.max(1))
            .map(|_| runner(&mut Loop::timed(measurement)))
            .collect();

        Ok(RunReport {
            benchmark: self.benchmark.to_string(),
            mode: BenchmarkType::Loop,
            results,
        })
    }
}

fn runner_for(benchmark: &ResolvedBenchmark) -> Result<RunnerFn, HandlerError> {
    benchmark
        .runner()
        .ok_or_else(|| HandlerError::NotRunnable(benchmark.to_string()))
}

/// One handler per execution mode
#[derive(Debug, Clone)]
pub enum ExecutionHandler {
    /// Handler for [`BenchmarkType::SingleShot`]
    SingleShot(ShotHandler),
    /// Handler for [`BenchmarkType::Loop`]
    Loop(LoopHandler),
}

impl ExecutionHandler {
    /// Mode this handler runs
    pub fn mode(&self) -> BenchmarkType {
        match self {
            ExecutionHandler::SingleShot(_) => BenchmarkType::SingleShot,
            ExecutionHandler::Loop(_) => BenchmarkType::Loop,
        }
    }

    /// The benchmark this handler owns
    pub fn benchmark(&self) -> &ResolvedBenchmark {
        match self {
            ExecutionHandler::SingleShot(h) => &h.benchmark,
            ExecutionHandler::Loop(h) => &h.benchmark,
        }
    }

    /// Settings passed through from the caller
    pub fn config(&self) -> &ExecutionConfig {
        match self {
            ExecutionHandler::SingleShot(h) => &h.config,
            ExecutionHandler::Loop(h) => &h.config,
        }
    }

    /// Invoke the benchmark
    pub fn run(&self) -> Result<RunReport, HandlerError> {
        match self {
            ExecutionHandler::SingleShot(h) => h.run(),
            ExecutionHandler::Loop(h) => h.run(),
        }
    }
}

/// Build the handler for `benchmark`'s declared mode
///
/// The match is exhaustive: a new `BenchmarkType` without a mapping here
/// does not compile.
pub fn create(benchmark: ResolvedBenchmark, config: ExecutionConfig) -> ExecutionHandler {
    match benchmark.mode() {
        BenchmarkType::SingleShot => ExecutionHandler::SingleShot(ShotHandler { benchmark, config }),
        BenchmarkType::Loop => ExecutionHandler::Loop(LoopHandler { benchmark, config }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MethodInfo, TypeInfo, TypeRegistry};
    use crate::resolver::resolve;

    fn count(l: &mut Loop) -> RunResult {
        let mut n = 0u64;
        while !l.is_done() {
            n = std::hint::black_box(n + 1);
        }
        l.result()
    }

    fn resolved(mode: BenchmarkType, runnable: bool) -> ResolvedBenchmark {
        let mut method = MethodInfo::new("Suite", "run", ["&mut Loop"], "RunResult").marked(mode);
        if runnable {
            method = method.with_runner(count);
        }
        let mut registry = TypeRegistry::new();
        registry.add_type(TypeInfo::new("Suite"));
        registry.add_method(method).unwrap();
        resolve(registry.get("Suite").unwrap(), "run").unwrap()
    }

    fn quick() -> ExecutionConfig {
        ExecutionConfig {
            warmup_time_ns: 0,
            measurement_time_ns: 100_000,
            iterations: 3,
            shots: 4,
        }
    }

    #[test]
    fn test_single_shot_maps_to_shot_handler() {
        let handler = create(resolved(BenchmarkType::SingleShot, true), quick());
        assert!(matches!(handler, ExecutionHandler::SingleShot(_)));
        assert_eq!(handler.mode(), BenchmarkType::SingleShot);
        assert_eq!(handler.benchmark().to_string(), "Suite::run");
    }

    #[test]
    fn test_loop_maps_to_loop_handler() {
        let handler = create(resolved(BenchmarkType::Loop, true), quick());
        assert!(matches!(handler, ExecutionHandler::Loop(_)));
        assert_eq!(handler.mode(), BenchmarkType::Loop);
    }

    #[test]
    fn test_config_passes_through() {
        let handler = create(resolved(BenchmarkType::Loop, true), quick());
        assert_eq!(handler.config(), &quick());
    }

    #[test]
    fn test_every_mode_maps_to_itself() {
        for mode in BenchmarkType::ALL {
            assert_eq!(create(resolved(mode, true), quick()).mode(), mode);
        }
    }

    #[test]
    fn test_shot_run() {
        let report = create(resolved(BenchmarkType::SingleShot, true), quick())
            .run()
            .unwrap();
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.total_ops(), 4);
        assert_eq!(report.mode, BenchmarkType::SingleShot);
    }

    #[test]
    fn test_loop_run() {
        let report = create(resolved(BenchmarkType::Loop, true), quick())
            .run()
            .unwrap();
        assert_eq!(report.results.len(), 3);
        assert!(report.results.iter().all(|r| r.ops >= 1));
        assert!(report.mean_ns_per_op() > 0.0);
    }

    #[test]
    fn test_not_runnable() {
        let err = create(resolved(BenchmarkType::Loop, false), quick())
            .run()
            .unwrap_err();
        assert!(matches!(err, HandlerError::NotRunnable(name) if name == "Suite::run"));
    }
}
