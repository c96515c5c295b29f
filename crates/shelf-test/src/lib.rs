//! shelf-test - Warehouse tests for Shelfstar
//!
//! This crate generates SQL data tests (unique, not_null, relationships,
//! range, expression, dense key) for the persisted star schema and runs them
//! through a `Database`. A test passes when its query returns no rows.

pub mod generator;
pub mod runner;

pub use generator::{star_schema_tests, GeneratedTest, TestGenError, TestKind};
pub use runner::{TestResult, TestRunner, TestSummary};
