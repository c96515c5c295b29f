//! Whole-batch quality validation
//!
//! Every check runs over the entire table and all failures are collected into
//! a [`QualityReport`]. Any failure aborts the run; rows are never dropped or
//! corrected here.

use crate::config::QualityConfig;
use crate::error::{CoreError, CoreResult};
use crate::hierarchy::{
    count_present, join_present, path_segment_count, LevelSchema, ProductRecord, ProductTable,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of sample rows kept per failed check
const MAX_SAMPLES: usize = 5;

/// The invariants asserted over a hierarchy-extracted table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheck {
    /// `discounted_price <= actual_price`
    PriceOrdering,
    /// rating within the configured inclusive range
    RatingRange,
    /// level i+1 is present only if level i is present
    HierarchyContiguity,
    /// stored depth equals the number of present levels
    DepthConsistency,
    /// stored path matches the present levels and has `depth` segments
    PathConsistency,
    /// no record deeper than `quality.max_category_depth`
    DepthLimit,
}

impl QualityCheck {
    /// All checks, in the order they are evaluated and reported
    pub const ALL: [QualityCheck; 6] = [
        QualityCheck::PriceOrdering,
        QualityCheck::RatingRange,
        QualityCheck::HierarchyContiguity,
        QualityCheck::DepthConsistency,
        QualityCheck::PathConsistency,
        QualityCheck::DepthLimit,
    ];

    /// Stable snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            QualityCheck::PriceOrdering => "price_ordering",
            QualityCheck::RatingRange => "rating_range",
            QualityCheck::HierarchyContiguity => "hierarchy_contiguity",
            QualityCheck::DepthConsistency => "depth_consistency",
            QualityCheck::PathConsistency => "path_consistency",
            QualityCheck::DepthLimit => "depth_limit",
        }
    }
}

impl fmt::Display for QualityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single check over the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheckResult {
    pub check: QualityCheck,
    /// Number of rows violating the check (0 if passed)
    pub failing_rows: usize,
    /// Up to 5 descriptions of failing rows
    pub samples: Vec<String>,
}

impl QualityCheckResult {
    fn new(check: QualityCheck) -> Self {
        Self {
            check,
            failing_rows: 0,
            samples: Vec::new(),
        }
    }

    fn record(&mut self, sample: impl FnOnce() -> String) {
        self.failing_rows += 1;
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(sample());
        }
    }

    pub fn passed(&self) -> bool {
        self.failing_rows == 0
    }
}

/// All check results for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows_checked: usize,
    pub level_width: usize,
    pub results: Vec<QualityCheckResult>,
}

impl QualityReport {
    /// True when no check failed
    pub fn passed(&self) -> bool {
        self.results.iter().all(QualityCheckResult::passed)
    }

    /// Checks with at least one failing row
    pub fn failures(&self) -> impl Iterator<Item = &QualityCheckResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    /// Result of a specific check
    pub fn result(&self, check: QualityCheck) -> Option<&QualityCheckResult> {
        self.results.iter().find(|r| r.check == check)
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(
                f,
                "All {} quality checks passed over {} rows",
                self.results.len(),
                self.rows_checked
            );
        }

        let failed: Vec<String> = self
            .failures()
            .map(|r| {
                let noun = if r.failing_rows == 1 { "row" } else { "rows" };
                match r.samples.first() {
                    Some(sample) => {
                        format!("{} ({} {}, e.g. {})", r.check, r.failing_rows, noun, sample)
                    }
                    None => format!("{} ({} {})", r.check, r.failing_rows, noun),
                }
            })
            .collect();
        write!(
            f,
            "Quality checks failed over {} rows: {}",
            self.rows_checked,
            failed.join("; ")
        )
    }
}

/// A table that passed every quality check.
///
/// Only [`validate`] can construct one, so later stages can rely on the invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    table: ProductTable,
    report: QualityReport,
}

impl ValidatedTable {
    pub fn schema(&self) -> LevelSchema {
        self.table.schema
    }

    pub fn rows(&self) -> &[ProductRecord] {
        &self.table.rows
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }

    /// The (all passing) report the table was admitted with
    pub fn report(&self) -> &QualityReport {
        &self.report
    }

    pub fn into_inner(self) -> ProductTable {
        self.table
    }
}

/// Run every check over the table and collect the results.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn check_quality(table: &ProductTable, quality: &QualityConfig) -> QualityReport {
    let mut price = QualityCheckResult::new(QualityCheck::PriceOrdering);
    let mut rating = QualityCheckResult::new(QualityCheck::RatingRange);
    let mut contiguity = QualityCheckResult::new(QualityCheck::HierarchyContiguity);
    let mut depth_check = QualityCheckResult::new(QualityCheck::DepthConsistency);
    let mut path_check = QualityCheckResult::new(QualityCheck::PathConsistency);
    let mut limit = QualityCheckResult::new(QualityCheck::DepthLimit);
    let delimiter = table.schema.delimiter();

    for (row, record) in table.rows.iter().enumerate() {
        let id = &record.listing.product_id;
        let listing = &record.listing;
        let hierarchy = &record.hierarchy;

        if !(listing.discounted_price <= listing.actual_price) {
            price.record(|| {
                format!(
                    "row {} ({}): discounted_price {} > actual_price {}",
                    row, id, listing.discounted_price, listing.actual_price
                )
            });
        }

        if !(listing.rating >= quality.rating_min && listing.rating <= quality.rating_max) {
            rating.record(|| {
                format!(
                    "row {} ({}): rating {} outside [{}, {}]",
                    row, id, listing.rating, quality.rating_min, quality.rating_max
                )
            });
        }

        if let Some(gap) = first_gap(&hierarchy.levels) {
            contiguity.record(|| {
                format!(
                    "row {} ({}): level_{} present without level_{}",
                    row,
                    id,
                    gap + 2,
                    gap + 1
                )
            });
        }

        // Re-derive from the slots rather than trusting the stored values
        let depth = count_present(&hierarchy.levels);
        if depth != hierarchy.depth {
            depth_check.record(|| {
                format!(
                    "row {} ({}): depth {} but {} levels present",
                    row, id, hierarchy.depth, depth
                )
            });
        }

        let path = join_present(&hierarchy.levels, delimiter);
        if path != hierarchy.path || path_segment_count(&path, delimiter) != hierarchy.depth {
            path_check.record(|| {
                format!(
                    "row {} ({}): path '{}' does not match levels '{}' at depth {}",
                    row, id, hierarchy.path, path, hierarchy.depth
                )
            });
        }

        if let Some(max) = quality.max_category_depth {
            if depth > max {
                limit.record(|| {
                    format!("row {} ({}): {} levels exceed limit {}", row, id, depth, max)
                });
            }
        }
    }

    QualityReport {
        rows_checked: table.rows.len(),
        level_width: table.schema.width(),
        results: vec![price, rating, contiguity, depth_check, path_check, limit],
    }
}

/// Validate the whole table, aborting with the full report on any failure.
pub fn validate(table: ProductTable, quality: &QualityConfig) -> CoreResult<ValidatedTable> {
    let report = check_quality(&table, quality);
    if !report.passed() {
        log::error!("{}", report);
        return Err(CoreError::QualityCheckFailed {
            report: Box::new(report),
        });
    }
    log::info!("{}", report);
    Ok(ValidatedTable { table, report })
}

/// Index `i` of the first absent slot followed by a present slot at `i + 1`
fn first_gap(levels: &[Option<String>]) -> Option<usize> {
    levels
        .windows(2)
        .position(|pair| pair[0].is_none() && pair[1].is_some())
}

#[cfg(test)]
#[path = "quality_test.rs"]
mod tests;
