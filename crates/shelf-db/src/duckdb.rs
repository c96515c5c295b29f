//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::sql::{escape_sql_string, quote_ident, quote_qualified, split_qualified};
use crate::traits::Database;
use async_trait::async_trait;
use chrono::NaiveDate;
use duckdb::types::Value;
use duckdb::{params, params_from_iter, Connection};
use shelf_core::{Cell, ColumnType, RawRecord, StarSchema, TableView, RAW_COLUMNS};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
            row.get(0)
        })?;
        usize::try_from(count).map_err(|e| DbError::Internal(e.to_string()))
    }

    /// Fetch up to `limit` rows rendered as comma-separated text
    fn query_sample_rows_sync(&self, sql: &str, limit: usize) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM ({}) LIMIT {}", sql, limit))?;
        let rows = stmt.query_map([], |row| {
            let width = row.as_ref().column_count();
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                let value: Value = row.get(idx)?;
                cells.push(render_value(&value));
            }
            Ok(cells.join(", "))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let (schema, table) = split_qualified(name);
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            params![schema.unwrap_or("main"), table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn load_raw_listings_sync(&self, path: &Path) -> DbResult<Vec<RawRecord>> {
        if !path.is_file() {
            return Err(DbError::CsvError(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let source = format!(
            "read_csv('{}', header = true, all_varchar = true, delim = ',', quote = '\"')",
            escape_sql_string(&path.display().to_string())
        );
        let csv_error = |e: duckdb::Error| DbError::CsvError(format!("{}: {}", path.display(), e));

        let conn = self.lock()?;
        let header: Vec<String> = {
            let mut stmt = conn
                .prepare(&format!("DESCRIBE SELECT * FROM {}", source))
                .map_err(csv_error)?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(csv_error)?;
            names.collect::<Result<_, _>>().map_err(csv_error)?
        };

        let missing: Vec<&str> = RAW_COLUMNS
            .iter()
            .copied()
            .filter(|column| !header.iter().any(|h| h == column))
            .collect();
        if !missing.is_empty() {
            return Err(DbError::CsvError(format!(
                "{}: missing required column(s): {}",
                path.display(),
                missing.join(", ")
            )));
        }

        // Empty cells come back as NULL; the pipeline expects empty strings
        let select = RAW_COLUMNS
            .iter()
            .map(|column| format!("COALESCE({}, '')", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM {}", select, source))
            .map_err(csv_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRecord {
                    product_id: row.get(0)?,
                    product_name: row.get(1)?,
                    category: row.get(2)?,
                    img_link: row.get(3)?,
                    product_link: row.get(4)?,
                    actual_price: row.get(5)?,
                    discounted_price: row.get(6)?,
                    discount_percentage: row.get(7)?,
                    rating: row.get(8)?,
                    rating_count: row.get(9)?,
                })
            })
            .map_err(csv_error)?;
        let records = rows.collect::<Result<Vec<_>, _>>().map_err(csv_error)?;

        log::info!("Loaded {} raw listings from {}", records.len(), path.display());
        Ok(records)
    }

    fn write_star_schema_sync(&self, schema: Option<&str>, star: &StarSchema) -> DbResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(schema) = schema {
            tx.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        }

        for view in star.tables() {
            let table = quote_qualified(schema, view.name);
            tx.execute_batch(&create_table_sql(&table, &view))?;

            let mut insert = tx.prepare(&insert_sql(&table, &view))?;
            for row in &view.rows {
                insert.execute(params_from_iter(row.iter().map(cell_value)))?;
            }
            log::debug!("Wrote {} rows to {}", view.rows.len(), table);
        }

        tx.commit()?;
        log::info!(
            "Persisted star schema ({} products, {} categories)",
            star.dim_product.len(),
            star.dim_category.len()
        );
        Ok(())
    }

    fn export_csv_sync(&self, table: &str, path: &Path) -> DbResult<()> {
        let (schema, name) = split_qualified(table);
        let sql = format!(
            "COPY (SELECT * FROM {}) TO '{}' (HEADER, DELIMITER ',')",
            quote_qualified(schema, name),
            escape_sql_string(&path.display().to_string())
        );
        let conn = self.lock()?;
        conn.execute_batch(&sql).map_err(|e| match DbError::from(e) {
            DbError::TableNotFound(msg) => DbError::TableNotFound(msg),
            other => DbError::ExportError {
                table: table.to_string(),
                path: path.display().to_string(),
                message: other.to_string(),
            },
        })
    }
}

/// `CREATE OR REPLACE TABLE` statement for a materialized view of a table
fn create_table_sql(table: &str, view: &TableView) -> String {
    let columns = view
        .columns
        .iter()
        .map(|column| {
            let null = if column.nullable { "" } else { " NOT NULL" };
            format!(
                "{} {}{}",
                quote_ident(&column.name),
                column.column_type.sql_type(),
                null
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE OR REPLACE TABLE {} ({})", table, columns)
}

/// Parameterized insert; dates are bound as ISO text and cast in SQL
fn insert_sql(table: &str, view: &TableView) -> String {
    let placeholders = view
        .columns
        .iter()
        .map(|column| match column.column_type {
            ColumnType::Date => "CAST(? AS DATE)",
            _ => "?",
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES ({})", table, placeholders)
}

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Text(text) => Value::Text(text.clone()),
        Cell::Integer(n) => Value::BigInt(*n),
        Cell::Float(x) => Value::Double(*x),
        Cell::Date(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(n) => n.to_string(),
        Value::SmallInt(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::HugeInt(n) => n.to_string(),
        Value::UTinyInt(n) => n.to_string(),
        Value::USmallInt(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::UBigInt(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Double(x) => x.to_string(),
        Value::Text(s) => s.clone(),
        Value::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| days.to_string()),
        other => format!("{:?}", other),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>> {
        self.query_sample_rows_sync(sql, limit)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn load_raw_listings(&self, path: &Path) -> DbResult<Vec<RawRecord>> {
        self.load_raw_listings_sync(path)
    }

    async fn write_star_schema(&self, schema: Option<&str>, star: &StarSchema) -> DbResult<()> {
        self.write_star_schema_sync(schema, star)
    }

    async fn export_csv(&self, table: &str, path: &Path) -> DbResult<()> {
        self.export_csv_sync(table, path)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
