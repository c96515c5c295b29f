//! shelf-db - Warehouse layer for Shelfstar
//!
//! This crate provides the `Database` trait and its DuckDB implementation:
//! loading the raw listing feed, persisting the star schema, and exporting
//! tables to CSV.

pub mod duckdb;
pub mod error;
pub mod sql;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
