//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use shelf_core::{RawRecord, StarSchema};
use std::path::Path;

/// Warehouse abstraction for Shelfstar
///
/// Implementations must be Send + Sync for async operation. Relation names
/// passed as `&str` may be schema-qualified as `schema.table`.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute query returning row count (for tests)
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Query and return sample rows as formatted strings
    /// Returns up to `limit` rows, each as a comma-separated string
    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Read the raw listing feed with every column as text
    async fn load_raw_listings(&self, path: &Path) -> DbResult<Vec<RawRecord>>;

    /// Replace the four star-schema tables in a single transaction
    async fn write_star_schema(&self, schema: Option<&str>, star: &StarSchema) -> DbResult<()>;

    /// Export a table to a CSV file with a header row
    async fn export_csv(&self, table: &str, path: &Path) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
