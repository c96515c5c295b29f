//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use shelf_core::{Config, QualityReport};
use shelf_db::{DbError, DuckDbBackend};
use shelf_test::{star_schema_tests, TestResult, TestRunner, TestSummary};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Exit code for pipeline and data failures
pub(crate) const EXIT_DATA: i32 = 1;
/// Exit code for warehouse test failures
pub(crate) const EXIT_TESTS: i32 = 2;
/// Exit code for database failures
pub(crate) const EXIT_DATABASE: i32 = 4;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main never prints it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Map an error chain to the process exit code
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
        return *code;
    }
    if err.chain().any(|cause| cause.downcast_ref::<DbError>().is_some()) {
        return EXIT_DATABASE;
    }
    EXIT_DATA
}

/// A loaded project: its root directory and configuration
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Load `shelf.yml` from `--config` or the project directory
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let config = match &global.config {
            Some(path) => Config::load(Path::new(path)),
            None => Config::load_or_default(&root),
        }
        .context("Failed to load configuration")?;

        log::debug!("Loaded project '{}' from {}", config.name, root.display());
        Ok(Self { root, config })
    }

    /// `--input` when given, otherwise the configured feed under the project root
    pub fn input_path(&self, input: Option<&str>) -> PathBuf {
        input
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.input_path_absolute(&self.root))
    }

    /// Open the configured warehouse, creating its parent directory if needed
    pub fn open_database(&self) -> Result<DuckDbBackend> {
        let path = self.config.database_path_absolute(&self.root);
        if path != ":memory:" {
            if let Some(parent) = Path::new(&path).parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        DuckDbBackend::new(&path).context("Failed to connect to database")
    }

    pub fn schema(&self) -> Option<&str> {
        self.config.database.schema.as_deref()
    }
}

/// Print every check of a quality report, with samples for failures
pub(crate) fn print_quality_report(report: &QualityReport) {
    println!(
        "Quality checks over {} rows ({} category levels):",
        report.rows_checked, report.level_width
    );
    for result in &report.results {
        if result.passed() {
            println!("  ✓ {}", result.check);
            continue;
        }
        println!("  ✗ {} ({} failing rows)", result.check, result.failing_rows);
        for (i, sample) in result.samples.iter().enumerate() {
            println!("      {}. {}", i + 1, sample);
        }
        if result.failing_rows > result.samples.len() {
            println!(
                "      ... and {} more",
                result.failing_rows - result.samples.len()
            );
        }
    }
}

/// Print the outcome of one warehouse test
fn print_test_result(result: &TestResult) {
    if result.passed {
        println!("  ✓ {} [{}ms]", result.name, result.duration.as_millis());
    } else if let Some(error) = &result.error {
        println!(
            "  ✗ {} - {} [{}ms]",
            result.name,
            error,
            result.duration.as_millis()
        );
    } else {
        println!(
            "  ✗ {} ({} failures) [{}ms]",
            result.name,
            result.failure_count,
            result.duration.as_millis()
        );

        if !result.sample_failures.is_empty() {
            println!("    Sample failing rows:");
            for (i, row) in result.sample_failures.iter().enumerate() {
                println!("      {}. {}", i + 1, row);
            }
            if result.failure_count > result.sample_failures.len() {
                println!(
                    "      ... and {} more",
                    result.failure_count - result.sample_failures.len()
                );
            }
        }
    }
}

/// Generate and run the warehouse suite, printing each result as it completes
pub(crate) async fn run_warehouse_tests(
    project: &ProjectContext,
    db: &DuckDbBackend,
    fail_fast: bool,
) -> Result<TestSummary> {
    let tests = star_schema_tests(project.schema(), &project.config.quality)
        .context("Failed to generate warehouse tests")?;

    println!("Running {} warehouse tests...\n", tests.len());

    let runner = TestRunner::new(db);
    let start = std::time::Instant::now();
    let mut results = Vec::with_capacity(tests.len());
    for test in &tests {
        let result = runner.run_test(test).await;
        print_test_result(&result);
        let stop = fail_fast && !result.passed;
        results.push(result);
        if stop {
            break;
        }
    }

    let summary = TestSummary::from_results(&results, start.elapsed());
    println!();
    println!(
        "Passed: {}, Failed: {}",
        summary.passed,
        summary.failed + summary.errors
    );
    Ok(summary)
}
