#![warn(missing_docs)]
//! Markbench CLI Library
//!
//! Command-line harness for benchmark binaries. Call `markbench::run()` (or
//! `markbench_cli::run()`) from `main` to list, check and run every suite
//! compiled into the binary.
//!
//! # Example
//!
//! ```ignore
//! use markbench::prelude::*;
//!
//! #[suite]
//! impl Parsing {
//!     #[benchmark]
//!     fn tokenize(l: &mut Loop) -> RunResult { ... }
//! }
//!
//! fn main() {
//!     markbench::run().unwrap();
//! }
//! ```

mod config;

pub use config::*;

use clap::{Parser, Subcommand};
use markbench_resolve::{
    BenchmarkTable, CollectingSink, DiagnosticSink, ExecutionConfig, RunReport, TracingSink,
    TypeRegistry, create, marked_benchmarks, resolve_all, resolve_qualified,
};
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::path::PathBuf;

/// Markbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "markbench")]
#[command(author, version, about = "Markbench - marker-driven microbenchmarks")]
pub struct Cli {
    /// Subcommand; defaults to running every benchmark
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load descriptors from a JSON/TOML benchmark table
    #[arg(long, global = true)]
    pub table: Option<PathBuf>,

    /// Output format: human, json
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Warmup time (e.g. "500ms")
    #[arg(long, global = true)]
    pub warmup: Option<String>,

    /// Time per measured loop invocation (e.g. "1s")
    #[arg(long, global = true)]
    pub measurement: Option<String>,

    /// Measured invocations for loop benchmarks
    #[arg(long, global = true)]
    pub iterations: Option<u64>,

    /// Invocations for single-shot benchmarks
    #[arg(long, global = true)]
    pub shots: Option<u64>,

    /// Threads used for parallel resolution (0 = all cores)
    #[arg(long, short = 'j', global = true)]
    pub jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true, global = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List marked benchmarks
    List {
        /// Regex filter on `Type::method`
        #[arg(default_value = ".*")]
        filter: String,
    },
    /// Resolve benchmarks and report every failure
    Check {
        /// Names to check (default: every marked benchmark)
        names: Vec<String>,
    },
    /// Resolve and run benchmarks (default)
    Run {
        /// Qualified names, `path::to::Type::method` (default: every marked benchmark)
        names: Vec<String>,
    },
    /// Write the descriptor table as JSON
    Table {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the Markbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if a command fails.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Markbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        "markbench=debug"
    } else {
        "markbench=info"
    };
    // A subscriber may already be installed by the host binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = MarkbenchConfig::discover().unwrap_or_default();
    let registry = load_registry(&cli, &config)?;

    match &cli.command {
        Some(Commands::List { filter }) => list_benchmarks(&registry, filter),
        Some(Commands::Check { names }) => check_benchmarks(&cli, &config, &registry, names),
        Some(Commands::Run { names }) => run_benchmarks(&cli, &config, &registry, names),
        Some(Commands::Table { output }) => write_table(&registry, output.as_ref()),
        None => run_benchmarks(&cli, &config, &registry, &[]),
    }
}

/// Descriptors from `--table`, `[resolve] table`, or the compiled-in registry
fn load_registry(cli: &Cli, config: &MarkbenchConfig) -> anyhow::Result<TypeRegistry> {
    match cli.table.as_ref().or(config.resolve.table.as_ref()) {
        Some(path) => {
            tracing::debug!("loading benchmark table {}", path.display());
            let table = BenchmarkTable::load(path)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path.display(), e))?;
            Ok(table.into_registry()?)
        }
        None => Ok(TypeRegistry::from_inventory()),
    }
}

/// CLI overrides applied on top of `[runner]`
fn execution_config(cli: &Cli, config: &MarkbenchConfig) -> anyhow::Result<ExecutionConfig> {
    let mut exec = config.execution_config()?;
    if let Some(w) = &cli.warmup {
        exec.warmup_time_ns = MarkbenchConfig::parse_duration(w)?;
    }
    if let Some(m) = &cli.measurement {
        exec.measurement_time_ns = MarkbenchConfig::parse_duration(m)?;
    }
    if let Some(n) = cli.iterations {
        exec.iterations = n;
    }
    if let Some(n) = cli.shots {
        exec.shots = n;
    }
    Ok(exec)
}

fn output_format(cli: &Cli, config: &MarkbenchConfig) -> anyhow::Result<OutputFormat> {
    cli.format
        .as_deref()
        .unwrap_or(config.output.format.as_str())
        .parse()
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Human,
    /// Pretty-printed JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

fn list_benchmarks(registry: &TypeRegistry, filter: &str) -> anyhow::Result<()> {
    let re = Regex::new(filter)?;
    let names: Vec<String> = marked_benchmarks(registry)
        .into_iter()
        .filter(|n| re.is_match(n))
        .collect();

    if names.is_empty() {
        println!("No benchmarks found.");
        return Ok(());
    }
    for name in &names {
        println!("{}", name);
    }
    println!("\n{} benchmarks found.", names.len());
    Ok(())
}

fn check_benchmarks(
    cli: &Cli,
    config: &MarkbenchConfig,
    registry: &TypeRegistry,
    names: &[String],
) -> anyhow::Result<()> {
    let names = if names.is_empty() {
        marked_benchmarks(registry)
    } else {
        names.to_vec()
    };

    let jobs = cli.jobs.or(config.runner.jobs).unwrap_or(0);
    let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let results = pool.install(|| resolve_all(registry, &names));

    let mut sink = CollectingSink::new();
    for (name, result) in names.iter().zip(&results) {
        match result {
            Ok(resolved) => {
                tracing::debug!("{} -> {} ({})", name, resolved.method().signature(), resolved.mode());
            }
            Err(e) => sink.resolve_error(e),
        }
    }

    for diagnostic in &sink.diagnostics {
        eprintln!("{}", diagnostic);
    }
    let failed = sink.diagnostics.len();
    println!("{} checked, {} failed", names.len(), failed);

    if sink.has_errors() {
        return Err(anyhow::anyhow!("{} benchmark(s) failed to resolve", failed));
    }
    Ok(())
}

/// Run each name in turn; a name that fails to resolve is reported and skipped
fn run_benchmarks(
    cli: &Cli,
    config: &MarkbenchConfig,
    registry: &TypeRegistry,
    names: &[String],
) -> anyhow::Result<()> {
    let format = output_format(cli, config)?;
    let exec = execution_config(cli, config)?;
    let names = if names.is_empty() {
        marked_benchmarks(registry)
    } else {
        names.to_vec()
    };

    if names.is_empty() {
        println!("No benchmarks found.");
        return Ok(());
    }

    let mut sink = TracingSink::new();
    let mut reports = Vec::with_capacity(names.len());
    for name in &names {
        let resolved = match resolve_qualified(registry, name) {
            Ok(resolved) => resolved,
            Err(e) => {
                sink.resolve_error(&e);
                continue;
            }
        };

        let handler = create(resolved, exec.clone());
        tracing::info!("running {} ({})", handler.benchmark(), handler.mode());
        match handler.run() {
            Ok(report) => {
                if format == OutputFormat::Human {
                    println!("{}\n", format_human(&report));
                }
                reports.push(report);
            }
            Err(e) => sink.error_with("benchmark failed:", &e),
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if sink.error_count() > 0 {
        return Err(anyhow::anyhow!(
            "{} of {} benchmark(s) failed",
            sink.error_count(),
            names.len()
        ));
    }
    Ok(())
}

fn write_table(registry: &TypeRegistry, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&BenchmarkTable::from_registry(registry))?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Table written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Render a run report as plain text
pub fn format_human(report: &RunReport) -> String {
    format!(
        "{} ({})\n  invocations: {}\n  total ops:   {}\n  total time:  {}\n  mean:        {}/op",
        report.benchmark,
        report.mode,
        report.results.len(),
        report.total_ops(),
        format_ns(report.total_time_ns() as f64),
        format_ns(report.mean_ns_per_op()),
    )
}

/// Format nanoseconds with an appropriate unit
pub fn format_ns(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{:.2} ns", ns)
    } else if ns < 1_000_000.0 {
        format!("{:.2} us", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else {
        format!("{:.2} s", ns / 1_000_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markbench_core::{BenchmarkType, RunResult};

    #[test]
    fn test_format_ns() {
        assert_eq!(format_ns(12.345), "12.35 ns");
        assert_eq!(format_ns(1_500.0), "1.50 us");
        assert_eq!(format_ns(2_000_000.0), "2.00 ms");
        assert_eq!(format_ns(3_000_000_000.0), "3.00 s");
    }

    #[test]
    fn test_format_human() {
        let report = RunReport {
            benchmark: "Suite::run_a".to_string(),
            mode: BenchmarkType::Loop,
            results: vec![
                RunResult {
                    ops: 10,
                    elapsed_ns: 1_000,
                },
                RunResult {
                    ops: 30,
                    elapsed_ns: 3_000,
                },
            ],
        };
        let text = format_human(&report);
        assert!(text.starts_with("Suite::run_a (loop)"));
        assert!(text.contains("total ops:   40"));
        assert!(text.contains("100.00 ns/op"));
    }

    #[test]
    fn test_output_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "markbench",
            "run",
            "Suite::run_a",
            "--warmup",
            "0ms",
            "--shots",
            "2",
        ]);
        let exec = execution_config(&cli, &MarkbenchConfig::default()).unwrap();
        assert_eq!(exec.warmup_time_ns, 0);
        assert_eq!(exec.shots, 2);
        assert_eq!(exec.iterations, 5);
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::parse_from(["markbench", "--bench"]);
        assert!(cli.command.is_none());
        assert!(cli.bench);
    }

    #[test]
    fn test_run_skips_unresolvable() {
        let mut registry = TypeRegistry::new();
        registry.add_type(markbench_resolve::TypeInfo::new("Suite"));
        registry
            .add_method(
                markbench_resolve::MethodInfo::new("Suite", "tick", ["&mut Loop"], "RunResult")
                    .marked(BenchmarkType::SingleShot)
                    .with_runner(|l| {
                        while !l.is_done() {}
                        l.result()
                    }),
            )
            .unwrap();

        let cli = Cli::parse_from(["markbench", "run", "--shots", "1"]);
        let config = MarkbenchConfig::default();
        assert!(run_benchmarks(&cli, &config, &registry, &[]).is_ok());

        let names = vec!["Suite::tick".to_string(), "Suite::gone".to_string()];
        assert!(run_benchmarks(&cli, &config, &registry, &names).is_err());
    }

    #[test]
    fn test_table_flag_loads_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(
            &path,
            r#"{"types":[{"name":"Suite","methods":[
                {"name":"run_a","mode":"loop","returns":"RunResult","params":["&mut Loop"]}
            ]}]}"#,
        )
        .unwrap();

        let cli = Cli::parse_from(["markbench", "--table", path.to_str().unwrap(), "list"]);
        let registry = load_registry(&cli, &MarkbenchConfig::default()).unwrap();
        assert_eq!(marked_benchmarks(&registry), vec!["Suite::run_a".to_string()]);
    }

    #[test]
    fn test_check_reports_failures() {
        let mut registry = TypeRegistry::new();
        registry.add_type(markbench_resolve::TypeInfo::new("Suite"));
        let cli = Cli::parse_from(["markbench", "check", "Suite::missing"]);
        let config = MarkbenchConfig::default();

        let Some(Commands::Check { names }) = &cli.command else {
            panic!("expected check");
        };
        assert!(check_benchmarks(&cli, &config, &registry, names).is_err());
        assert!(check_benchmarks(&cli, &config, &registry, &[]).is_ok());
    }
}
