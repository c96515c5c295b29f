//! Product to category bridge

use crate::dedup::CanonicalTable;
use crate::error::{CoreError, CoreResult};
use crate::star::{BridgeRow, CategoryKey, DimCategoryRow};
use std::collections::HashMap;

/// Resolve every canonical product's path to its category key.
///
/// A path missing from the dimension is an internal consistency error: the
/// dimension was built from the same canonical table.
pub fn build_bridge(
    canonical: &CanonicalTable,
    dim_category: &[DimCategoryRow],
) -> CoreResult<Vec<BridgeRow>> {
    let keys: HashMap<&str, CategoryKey> = dim_category
        .iter()
        .map(|row| (row.path.as_str(), row.category_key))
        .collect();

    canonical
        .rows()
        .iter()
        .map(|row| {
            let path = row.hierarchy.path.as_str();
            keys.get(path)
                .map(|&category_key| BridgeRow {
                    product_id: row.listing.product_id.clone(),
                    category_key,
                })
                .ok_or_else(|| CoreError::UnresolvedCategoryKey {
                    product_id: row.listing.product_id.to_string(),
                    path: path.to_string(),
                })
        })
        .collect()
}
