//! Pipeline driver
//!
//! Chains the stages as pure functions, each consuming the previous stage's
//! table and producing a new one:
//!
//! ```text
//! raw -> normalize -> extract hierarchies -> validate -> deduplicate
//!     -> dim_category -> dim_product -> bridge -> fact
//! ```
//!
//! The first error aborts the run and no output tables are returned.

use crate::bridge::build_bridge;
use crate::config::{KeyOrder, ParsingConfig, QualityConfig};
use crate::dedup::deduplicate;
use crate::dimension::{build_dim_category, build_dim_product};
use crate::error::CoreResult;
use crate::fact::build_fact;
use crate::hierarchy::{extract_hierarchies, ProductTable};
use crate::normalize::normalize_records;
use crate::quality::{check_quality, validate, QualityReport};
use crate::record::RawRecord;
use crate::star::StarSchema;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub parsing: ParsingConfig,
    pub quality: QualityConfig,
    pub key_order: KeyOrder,
    /// Stamped on every fact row
    pub ingestion_date: NaiveDate,
}

impl PipelineOptions {
    /// Default parsing and quality settings with the given ingestion date
    pub fn new(ingestion_date: NaiveDate) -> Self {
        Self {
            parsing: ParsingConfig::default(),
            quality: QualityConfig::default(),
            key_order: KeyOrder::default(),
            ingestion_date,
        }
    }
}

/// Row counts observed at each stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub raw_rows: usize,
    pub normalized_rows: usize,
    pub coerced_ratings: usize,
    pub validated_rows: usize,
    pub canonical_rows: usize,
    pub duplicates_removed: usize,
    pub category_levels: usize,
    pub categories: usize,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub star: StarSchema,
    pub quality: QualityReport,
    pub stats: PipelineStats,
}

/// Run every stage and assemble the star schema.
pub fn run_pipeline(raw: &[RawRecord], options: &PipelineOptions) -> CoreResult<PipelineOutput> {
    log::info!("Starting pipeline over {} raw listings", raw.len());

    let (table, coerced_ratings) = prepare(raw, options)?;
    let normalized_rows = table.len();
    let validated = validate(table, &options.quality)?;
    let validated_rows = validated.len();
    let quality = validated.report().clone();

    let canonical = deduplicate(validated)?;
    let dim_category = build_dim_category(&canonical, options.key_order)?;
    let dim_product = build_dim_product(&canonical);
    let bridge = build_bridge(&canonical, &dim_category)?;
    let fact = build_fact(&canonical, &bridge, options.ingestion_date)?;

    let stats = PipelineStats {
        raw_rows: raw.len(),
        normalized_rows,
        coerced_ratings,
        validated_rows,
        canonical_rows: canonical.len(),
        duplicates_removed: canonical.duplicates_removed(),
        category_levels: canonical.schema().width(),
        categories: dim_category.len(),
    };

    let star = StarSchema {
        levels: canonical.schema(),
        dim_category,
        dim_product,
        bridge,
        fact,
    };
    log::info!(
        "Pipeline finished: {} products in {} categories",
        stats.canonical_rows,
        stats.categories
    );

    Ok(PipelineOutput {
        star,
        quality,
        stats,
    })
}

/// Run normalization, hierarchy extraction and the quality checks only.
///
/// Malformed fields still abort; quality failures are returned in the report
/// instead of as an error.
pub fn validate_only(raw: &[RawRecord], options: &PipelineOptions) -> CoreResult<QualityReport> {
    let (table, _) = prepare(raw, options)?;
    Ok(check_quality(&table, &options.quality))
}

/// Normalize and extract hierarchies. Also returns the number of coerced ratings.
fn prepare(raw: &[RawRecord], options: &PipelineOptions) -> CoreResult<(ProductTable, usize)> {
    let batch = normalize_records(raw, &options.parsing)?;
    let table = extract_hierarchies(batch.records, &options.parsing);
    Ok((table, batch.coerced_ratings))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
