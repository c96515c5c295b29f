//! Deduplication to one canonical row per product

use crate::error::{CoreError, CoreResult};
use crate::hierarchy::{LevelSchema, ProductRecord};
use crate::quality::ValidatedTable;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One row per `product_id`, in ascending `product_id` order
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    schema: LevelSchema,
    rows: Vec<ProductRecord>,
    duplicates_removed: usize,
}

impl CanonicalTable {
    pub fn schema(&self) -> LevelSchema {
        self.schema
    }

    pub fn rows(&self) -> &[ProductRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of input rows dropped as duplicates
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    /// Wrap rows without ranking or checking them
    #[cfg(test)]
    pub(crate) fn from_rows_unchecked(schema: LevelSchema, rows: Vec<ProductRecord>) -> Self {
        Self {
            schema,
            rows,
            duplicates_removed: 0,
        }
    }
}

/// Ranking within a product group: most reviews first, then best rating.
fn rank(a: &ProductRecord, b: &ProductRecord) -> Ordering {
    a.listing
        .product_id
        .cmp(&b.listing.product_id)
        .then_with(|| b.listing.rating_count.cmp(&a.listing.rating_count))
        .then_with(|| b.listing.rating.total_cmp(&a.listing.rating))
}

/// Keep the best ranked row of each product.
///
/// The sort is stable, so rows tied on count and rating keep the one that
/// appeared first in the input.
pub fn deduplicate(table: ValidatedTable) -> CoreResult<CanonicalTable> {
    let schema = table.schema();
    let mut rows = table.into_inner().rows;
    let input_rows = rows.len();

    rows.sort_by(rank);
    rows.dedup_by(|later, kept| later.listing.product_id == kept.listing.product_id);

    ensure_unique(&rows)?;

    let duplicates_removed = input_rows - rows.len();
    log::info!(
        "Deduplicated {} rows to {} products ({} duplicates removed)",
        input_rows,
        rows.len(),
        duplicates_removed
    );

    Ok(CanonicalTable {
        schema,
        rows,
        duplicates_removed,
    })
}

/// Post-condition of deduplication: product ids are unique.
fn ensure_unique(rows: &[ProductRecord]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.listing.product_id.as_str()) {
            return Err(CoreError::DuplicateAfterDedup {
                product_id: row.listing.product_id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "dedup_test.rs"]
mod tests;
