//! Execution context and result types
//!
//! A benchmark method receives a `&mut Loop` and returns a `RunResult`.
//! The loop decides when the measured body stops repeating; the method
//! hands the loop back as a result once it is done.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Operation budget for a single `Loop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    /// Stop after this many operations
    Ops(u64),
    /// Stop once this much time has elapsed (checked every operation)
    Time(Duration),
}

/// The execution context handed to every benchmark method.
///
/// ```ignore
/// fn run(l: &mut Loop) -> RunResult {
///     while !l.is_done() {
///         std::hint::black_box(work());
///     }
///     l.result()
/// }
/// ```
#[derive(Debug)]
pub struct Loop {
    budget: Budget,
    ops: u64,
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl Loop {
    /// A loop that allows exactly one operation
    pub fn single_shot() -> Self {
        Self::with_ops(1)
    }

    /// A loop that allows a fixed number of operations
    pub fn with_ops(ops: u64) -> Self {
        Self {
            budget: Budget::Ops(ops),
            ops: 0,
            started: None,
            finished: None,
        }
    }

    /// A loop that keeps going until `duration` has elapsed
    ///
    /// At least one operation is always performed.
    pub fn timed(duration: Duration) -> Self {
        Self {
            budget: Budget::Time(duration),
            ops: 0,
            started: None,
            finished: None,
        }
    }

    /// Returns `true` once the budget is spent; otherwise counts one operation.
    pub fn is_done(&mut self) -> bool {
        if self.finished.is_some() {
            return true;
        }
        let now = Instant::now();
        let started = *self.started.get_or_insert(now);

        let done = match self.budget {
            Budget::Ops(limit) => self.ops >= limit,
            Budget::Time(limit) => self.ops > 0 && now.duration_since(started) >= limit,
        };

        if done {
            self.finished = Some(now);
        } else {
            self.ops += 1;
        }
        done
    }

    /// Number of operations counted so far
    pub fn ops(&self) -> u64 {
        self.ops
    }

    /// Snapshot of the loop as a result
    pub fn result(&self) -> RunResult {
        let elapsed = match (self.started, self.finished) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        };
        RunResult {
            ops: self.ops,
            elapsed_ns: elapsed.as_nanos() as u64,
        }
    }
}

/// Outcome of one benchmark invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Operations performed
    pub ops: u64,
    /// Wall-clock time spent, in nanoseconds
    pub elapsed_ns: u64,
}

impl RunResult {
    /// Mean time per operation in nanoseconds (0.0 when no ops ran)
    pub fn ns_per_op(&self) -> f64 {
        if self.ops == 0 {
            0.0
        } else {
            self.elapsed_ns as f64 / self.ops as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_runs_once() {
        let mut l = Loop::single_shot();
        let mut count = 0;
        while !l.is_done() {
            count += 1;
        }
        assert_eq!(count, 1);
        assert_eq!(l.result().ops, 1);
    }

    #[test]
    fn test_fixed_ops() {
        let mut l = Loop::with_ops(25);
        while !l.is_done() {}
        assert_eq!(l.ops(), 25);
        // Stays done
        assert!(l.is_done());
        assert_eq!(l.ops(), 25);
    }

    #[test]
    fn test_timed_runs_at_least_once() {
        let mut l = Loop::timed(Duration::ZERO);
        while !l.is_done() {}
        assert_eq!(l.ops(), 1);
    }

    #[test]
    fn test_timed_respects_duration() {
        let mut l = Loop::timed(Duration::from_millis(2));
        while !l.is_done() {}
        assert!(l.ops() >= 1);
        assert!(l.result().elapsed_ns >= 2_000_000);
    }

    #[test]
    fn test_ns_per_op() {
        let r = RunResult {
            ops: 4,
            elapsed_ns: 100,
        };
        assert_eq!(r.ns_per_op(), 25.0);
        assert_eq!(RunResult::default().ns_per_op(), 0.0);
    }
}
