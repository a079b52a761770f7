//! Benchmark execution modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declared timing strategy of a benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkType {
    /// Each invocation performs one operation
    SingleShot,
    /// Invocations repeat the body for a time budget
    #[default]
    Loop,
}

impl BenchmarkType {
    /// Every mode, in declaration order
    pub const ALL: [BenchmarkType; 2] = [BenchmarkType::SingleShot, BenchmarkType::Loop];

    /// Canonical name used in attributes and tables
    pub fn as_str(self) -> &'static str {
        match self {
            BenchmarkType::SingleShot => "single-shot",
            BenchmarkType::Loop => "loop",
        }
    }
}

impl fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mode name that maps to no `BenchmarkType`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown benchmark type: {0}")]
pub struct UnknownModeError(pub String);

impl FromStr for BenchmarkType {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "single-shot" | "singleshot" | "shot" => Ok(BenchmarkType::SingleShot),
            "loop" => Ok(BenchmarkType::Loop),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}
