//! shelf-core - Core library for Shelfstar
//!
//! Turns a flat feed of retail product listings into a validated,
//! deduplicated star schema: a category dimension, a product dimension, a
//! product to category bridge, and a point-in-time fact snapshot. The crate
//! works on in-memory tables only; reading the feed and persisting the output
//! belong to `shelf-db`.

pub mod bridge;
pub mod config;
pub mod dedup;
pub mod dimension;
pub mod error;
pub mod fact;
pub mod hierarchy;
pub mod normalize;
pub mod pipeline;
pub mod product_id;
pub mod quality;
pub mod record;
pub mod star;
pub mod summary;
pub mod table;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Config, KeyOrder, ParsingConfig, QualityConfig};
pub use dedup::CanonicalTable;
pub use error::{CoreError, CoreResult};
pub use hierarchy::{CategoryHierarchy, LevelSchema, ProductRecord, ProductTable};
pub use pipeline::{run_pipeline, validate_only, PipelineOptions, PipelineOutput, PipelineStats};
pub use product_id::ProductId;
pub use quality::{QualityCheck, QualityCheckResult, QualityReport, ValidatedTable};
pub use record::{NormalizedRecord, RawRecord, RAW_COLUMNS};
pub use star::{BridgeRow, CategoryKey, DimCategoryRow, DimProductRow, FactRow, StarSchema};
pub use summary::RunSummary;
pub use table::{Cell, Column, ColumnType, TableShape, TableView};
