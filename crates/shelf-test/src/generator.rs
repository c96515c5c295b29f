//! Test SQL generation

use shelf_core::star::{BRIDGE_PRODUCT_CATEGORY, DIM_CATEGORY, DIM_PRODUCT, FACT_PRODUCT_SNAPSHOT};
use shelf_core::QualityConfig;
use shelf_db::sql::{quote_ident, quote_qualified};
use std::fmt;
use thiserror::Error;

/// Error type for test SQL generation
#[derive(Error, Debug)]
pub enum TestGenError {
    /// Invalid threshold value (NaN or Infinity)
    #[error("invalid threshold value: {0}")]
    InvalidThreshold(String),
}

/// Result type alias for test generation
pub type TestGenResult<T> = Result<T, TestGenError>;

/// Kind of assertion a generated test makes
#[derive(Debug, Clone, PartialEq)]
pub enum TestKind {
    Unique,
    NotNull,
    /// Every non-null value exists in `to.field`
    Relationship { to: String, field: String },
    /// Values lie in the closed interval `[min, max]`
    Range { min: f64, max: f64 },
    /// A boolean SQL expression holds for every row
    Expression { expression: String },
    /// Integer keys are exactly `1..=row_count`
    DenseKey,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::Unique => "unique",
            TestKind::NotNull => "not_null",
            TestKind::Relationship { .. } => "relationships",
            TestKind::Range { .. } => "range",
            TestKind::Expression { .. } => "expression",
            TestKind::DenseKey => "dense_key",
        };
        write!(f, "{}", name)
    }
}

/// Generate SQL for a unique test
///
/// Returns rows that violate the unique constraint (duplicates).
pub fn generate_unique_test(table: &str, column: &str) -> String {
    let qc = quote_ident(column);
    format!("SELECT {qc}, COUNT(*) as cnt\nFROM {table}\nGROUP BY {qc}\nHAVING COUNT(*) > 1")
}

/// Generate SQL for a not_null test
///
/// Returns rows where the column is NULL.
pub fn generate_not_null_test(table: &str, column: &str) -> String {
    format!("SELECT * FROM {} WHERE {} IS NULL", table, quote_ident(column))
}

/// Generate SQL for a relationship test (foreign key validation)
///
/// Returns rows whose `column` value does not exist in `ref_table.ref_column`.
pub fn generate_relationship_test(
    table: &str,
    column: &str,
    ref_table: &str,
    ref_column: &str,
) -> String {
    let qc = quote_ident(column);
    let qrc = quote_ident(ref_column);
    format!(
        "SELECT src.{qc}\n\
         FROM {table} AS src\n\
         WHERE src.{qc} IS NOT NULL\n\
         \x20 AND NOT EXISTS (\n\
         \x20   SELECT 1 FROM {ref_table} AS ref_tbl\n\
         \x20   WHERE ref_tbl.{qrc} = src.{qc}\n\
         \x20 )"
    )
}

/// Generate SQL for a range test
///
/// Returns rows where the value falls outside `[min, max]`.
/// Returns `Err` if either bound is NaN or Infinity.
pub fn generate_range_test(table: &str, column: &str, min: f64, max: f64) -> TestGenResult<String> {
    if !min.is_finite() || !max.is_finite() {
        return Err(TestGenError::InvalidThreshold(format!(
            "range bounds must be finite, got [{}, {}]",
            min, max
        )));
    }
    let qc = quote_ident(column);
    Ok(format!(
        "SELECT * FROM {table} WHERE {qc} < {min} OR {qc} > {max}"
    ))
}

/// Generate SQL for an expression test
///
/// Returns rows where the expression is false or NULL.
pub fn generate_expression_test(table: &str, expression: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE NOT COALESCE(({}), FALSE)",
        table, expression
    )
}

/// Generate SQL for a dense key test
///
/// Returns rows whose key lies outside `1..=COUNT(*)`. Together with a
/// unique test this proves the keys are exactly `1..=n`.
pub fn generate_dense_key_test(table: &str, column: &str) -> String {
    let qc = quote_ident(column);
    format!(
        "SELECT {qc} FROM {table}\n\
         WHERE {qc} < 1 OR {qc} > (SELECT COUNT(*) FROM {table})"
    )
}

/// Test SQL with metadata
#[derive(Debug, Clone)]
pub struct GeneratedTest {
    /// Table being tested (unqualified)
    pub table: String,

    /// Column being tested
    pub column: String,

    pub kind: TestKind,

    /// Generated SQL
    pub sql: String,

    /// Human-readable test name
    pub name: String,
}

impl GeneratedTest {
    fn new(table: &str, column: &str, kind: TestKind, sql: String) -> Self {
        let name = match &kind {
            TestKind::Relationship { to, .. } => format!("{}_{}__{}__{}", kind, table, column, to),
            _ => format!("{}_{}__{}", kind, table, column),
        };
        Self {
            name,
            table: table.to_string(),
            column: column.to_string(),
            kind,
            sql,
        }
    }
}

/// Builds tests against tables in an optional schema
struct SuiteBuilder<'a> {
    schema: Option<&'a str>,
    tests: Vec<GeneratedTest>,
}

impl<'a> SuiteBuilder<'a> {
    fn table(&self, name: &str) -> String {
        quote_qualified(self.schema, name)
    }

    fn unique(&mut self, table: &str, column: &str) {
        let sql = generate_unique_test(&self.table(table), column);
        self.tests
            .push(GeneratedTest::new(table, column, TestKind::Unique, sql));
    }

    fn not_null(&mut self, table: &str, column: &str) {
        let sql = generate_not_null_test(&self.table(table), column);
        self.tests
            .push(GeneratedTest::new(table, column, TestKind::NotNull, sql));
    }

    fn key(&mut self, table: &str, column: &str) {
        self.unique(table, column);
        self.not_null(table, column);
    }

    fn relationship(&mut self, table: &str, column: &str, to: &str) {
        let sql = generate_relationship_test(&self.table(table), column, &self.table(to), column);
        let kind = TestKind::Relationship {
            to: to.to_string(),
            field: column.to_string(),
        };
        self.tests.push(GeneratedTest::new(table, column, kind, sql));
    }
}

/// The standard warehouse suite for the four star-schema tables.
///
/// Covers key uniqueness and presence, referential integrity between the
/// bridge, fact and both dimensions, price ordering, the rating range and
/// dense category keys.
pub fn star_schema_tests(
    schema: Option<&str>,
    quality: &QualityConfig,
) -> TestGenResult<Vec<GeneratedTest>> {
    let mut suite = SuiteBuilder {
        schema,
        tests: Vec::new(),
    };

    suite.key(DIM_CATEGORY, "category_key");
    suite.key(DIM_CATEGORY, "path");
    let dense = generate_dense_key_test(&suite.table(DIM_CATEGORY), "category_key");
    suite.tests.push(GeneratedTest::new(
        DIM_CATEGORY,
        "category_key",
        TestKind::DenseKey,
        dense,
    ));

    suite.key(DIM_PRODUCT, "product_id");
    // Every product resolves through the bridge and has a snapshot
    suite.relationship(DIM_PRODUCT, "product_id", BRIDGE_PRODUCT_CATEGORY);
    suite.relationship(DIM_PRODUCT, "product_id", FACT_PRODUCT_SNAPSHOT);

    suite.key(BRIDGE_PRODUCT_CATEGORY, "product_id");
    suite.not_null(BRIDGE_PRODUCT_CATEGORY, "category_key");
    suite.relationship(BRIDGE_PRODUCT_CATEGORY, "product_id", DIM_PRODUCT);
    suite.relationship(BRIDGE_PRODUCT_CATEGORY, "category_key", DIM_CATEGORY);

    suite.key(FACT_PRODUCT_SNAPSHOT, "product_id");
    suite.not_null(FACT_PRODUCT_SNAPSHOT, "category_key");
    suite.not_null(FACT_PRODUCT_SNAPSHOT, "ingestion_date");
    suite.relationship(FACT_PRODUCT_SNAPSHOT, "product_id", DIM_PRODUCT);
    suite.relationship(FACT_PRODUCT_SNAPSHOT, "category_key", DIM_CATEGORY);

    let fact = suite.table(FACT_PRODUCT_SNAPSHOT);
    let expression = format!(
        "{} <= {}",
        quote_ident("discounted_price"),
        quote_ident("actual_price")
    );
    let price_sql = generate_expression_test(&fact, &expression);
    suite.tests.push(GeneratedTest::new(
        FACT_PRODUCT_SNAPSHOT,
        "discounted_price",
        TestKind::Expression { expression },
        price_sql,
    ));

    let range_sql =
        generate_range_test(&fact, "rating", quality.rating_min, quality.rating_max)?;
    suite.tests.push(GeneratedTest::new(
        FACT_PRODUCT_SNAPSHOT,
        "rating",
        TestKind::Range {
            min: quality.rating_min,
            max: quality.rating_max,
        },
        range_sql,
    ));

    Ok(suite.tests)
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
