//! Configuration loading from markbench.toml
//!
//! Settings can be placed in a `markbench.toml` file in the project root.
//! The file is discovered by walking up from the current directory.

use markbench_resolve::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Markbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarkbenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Resolution configuration
    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Runner configuration for handler execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Warmup duration before measurement (e.g., "1s")
    #[serde(default = "default_warmup")]
    pub warmup_time: String,
    /// Duration of each measured loop invocation (e.g., "1s")
    #[serde(default = "default_measurement")]
    pub measurement_time: String,
    /// Measured invocations for loop benchmarks
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Invocations for single-shot benchmarks
    #[serde(default = "default_shots")]
    pub shots: u64,
    /// Threads used by `check` (0 = all cores)
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmup_time: default_warmup(),
            measurement_time: default_measurement(),
            iterations: default_iterations(),
            shots: default_shots(),
            jobs: None,
        }
    }
}

fn default_warmup() -> String {
    "1s".to_string()
}
fn default_measurement() -> String {
    "1s".to_string()
}
fn default_iterations() -> u64 {
    5
}
fn default_shots() -> u64 {
    10
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

/// Where benchmark descriptors come from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolveConfig {
    /// Benchmark table to load instead of the compiled-in registry
    #[serde(default)]
    pub table: Option<PathBuf>,
}

impl MarkbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `markbench.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join("markbench.toml");
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Handler settings derived from `[runner]`
    pub fn execution_config(&self) -> anyhow::Result<ExecutionConfig> {
        Ok(ExecutionConfig {
            warmup_time_ns: Self::parse_duration(&self.runner.warmup_time)?,
            measurement_time_ns: Self::parse_duration(&self.runner.measurement_time)?,
            iterations: self.runner.iterations,
            shots: self.runner.shots,
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Markbench Configuration

[runner]
# Warmup duration before measurement (loop benchmarks)
warmup_time = "1s"
# Duration of each measured invocation (loop benchmarks)
measurement_time = "1s"
# Measured invocations per loop benchmark
iterations = 5
# Invocations per single-shot benchmark
shots = 10
# Threads used by `markbench check` (uncomment to enable)
# jobs = 4

[output]
# Default output format: human or json
format = "human"

[resolve]
# Load descriptors from a JSON/TOML table instead of the compiled-in registry
# table = "target/markbench/table.json"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if value < 0.0 {
            return Err(anyhow::anyhow!("Negative duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
