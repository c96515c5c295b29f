//! Test execution

use crate::generator::{GeneratedTest, TestKind};
use shelf_db::Database;
use std::time::{Duration, Instant};

/// Number of failing rows kept per failed test
pub const SAMPLE_LIMIT: usize = 5;

/// Result of a single test execution
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test name
    pub name: String,

    /// Table tested
    pub table: String,

    /// Column tested
    pub column: String,

    pub kind: TestKind,

    /// Whether the test passed
    pub passed: bool,

    /// Number of failing rows (0 if passed)
    pub failure_count: usize,

    /// Sample failing rows (up to 5 rows as formatted strings)
    pub sample_failures: Vec<String>,

    /// Execution time
    pub duration: Duration,

    /// Error message if execution failed
    pub error: Option<String>,
}

impl TestResult {
    fn from_test(test: &GeneratedTest, duration: Duration) -> Self {
        Self {
            name: test.name.clone(),
            table: test.table.clone(),
            column: test.column.clone(),
            kind: test.kind.clone(),
            passed: true,
            failure_count: 0,
            sample_failures: Vec::new(),
            duration,
            error: None,
        }
    }

    /// Create a passed test result
    pub fn pass(test: &GeneratedTest, duration: Duration) -> Self {
        Self::from_test(test, duration)
    }

    /// Create a failed test result
    pub fn fail(
        test: &GeneratedTest,
        failure_count: usize,
        sample_failures: Vec<String>,
        duration: Duration,
    ) -> Self {
        Self {
            passed: false,
            failure_count,
            sample_failures,
            ..Self::from_test(test, duration)
        }
    }

    /// Create an error test result
    pub fn error(test: &GeneratedTest, error: String, duration: Duration) -> Self {
        Self {
            passed: false,
            error: Some(error),
            ..Self::from_test(test, duration)
        }
    }
}

/// Summary of test run
#[derive(Debug, Clone)]
pub struct TestSummary {
    /// Total tests run
    pub total: usize,

    /// Tests passed
    pub passed: usize,

    /// Tests failed
    pub failed: usize,

    /// Tests with errors
    pub errors: usize,

    /// Total execution time
    pub duration: Duration,
}

impl TestSummary {
    /// Create a summary from test results
    pub fn from_results(results: &[TestResult], duration: Duration) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let errors = results.iter().filter(|r| r.error.is_some()).count();
        let failed = results
            .iter()
            .filter(|r| !r.passed && r.error.is_none())
            .count();

        Self {
            total,
            passed,
            failed,
            errors,
            duration,
        }
    }

    /// Check if all tests passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Test runner for executing warehouse tests
pub struct TestRunner<'a> {
    db: &'a dyn Database,
}

impl<'a> TestRunner<'a> {
    /// Create a new test runner
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Run a single generated test
    pub async fn run_test(&self, test: &GeneratedTest) -> TestResult {
        let start = Instant::now();

        match self.db.query_count(&test.sql).await {
            Ok(0) => TestResult::pass(test, start.elapsed()),
            Ok(count) => {
                let duration = start.elapsed();
                let sample_failures = match self.db.query_sample_rows(&test.sql, SAMPLE_LIMIT).await
                {
                    Ok(rows) => rows,
                    Err(e) => {
                        log::warn!("Could not sample failing rows of {}: {}", test.name, e);
                        Vec::new()
                    }
                };
                log::debug!("{} failed with {} rows", test.name, count);
                TestResult::fail(test, count, sample_failures, duration)
            }
            Err(e) => TestResult::error(test, e.to_string(), start.elapsed()),
        }
    }

    /// Run multiple tests
    pub async fn run_tests(&self, tests: &[GeneratedTest]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(tests.len());

        for test in tests {
            let result = self.run_test(test).await;
            results.push(result);
        }

        results
    }

    /// Run all tests and return summary
    pub async fn run_all(&self, tests: &[GeneratedTest]) -> (Vec<TestResult>, TestSummary) {
        let start = Instant::now();
        let results = self.run_tests(tests).await;
        let duration = start.elapsed();
        let summary = TestSummary::from_results(&results, duration);

        (results, summary)
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
