//! Dimension builders: category and product

use crate::config::KeyOrder;
use crate::dedup::CanonicalTable;
use crate::error::{CoreError, CoreResult};
use crate::hierarchy::CategoryHierarchy;
use crate::star::{CategoryKey, DimCategoryRow, DimProductRow};
use std::collections::HashMap;

/// Build the category dimension: one row per distinct path.
///
/// Paths are collected in first-appearance order of the canonical table and
/// then keyed densely from 1, either in that order or in lexicographic path
/// order. Two rows sharing a path but not levels, leaf or depth are an
/// internal consistency error.
pub fn build_dim_category(
    canonical: &CanonicalTable,
    order: KeyOrder,
) -> CoreResult<Vec<DimCategoryRow>> {
    let mut distinct: Vec<&CategoryHierarchy> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in canonical.rows() {
        let hierarchy = &row.hierarchy;
        match index.get(hierarchy.path.as_str()) {
            Some(&i) => {
                if distinct[i] != hierarchy {
                    return Err(CoreError::InconsistentCategory {
                        path: hierarchy.path.clone(),
                    });
                }
            }
            None => {
                index.insert(hierarchy.path.as_str(), distinct.len());
                distinct.push(hierarchy);
            }
        }
    }

    if order == KeyOrder::Path {
        distinct.sort_by(|a, b| a.path.cmp(&b.path));
    }

    let rows = distinct
        .into_iter()
        .zip(1u32..)
        .map(|(hierarchy, key)| DimCategoryRow {
            category_key: CategoryKey::new(key),
            levels: hierarchy.levels.clone(),
            leaf: hierarchy.leaf.clone(),
            depth: hierarchy.depth,
            path: hierarchy.path.clone(),
        })
        .collect::<Vec<_>>();

    log::info!("Built {} with {} categories", crate::star::DIM_CATEGORY, rows.len());
    Ok(rows)
}

/// Build the product dimension: a projection of the canonical table.
pub fn build_dim_product(canonical: &CanonicalTable) -> Vec<DimProductRow> {
    canonical
        .rows()
        .iter()
        .map(|row| DimProductRow {
            product_id: row.listing.product_id.clone(),
            product_name: row.listing.product_name.clone(),
            img_link: row.listing.img_link.clone(),
            product_link: row.listing.product_link.clone(),
            leaf: row.hierarchy.leaf.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "dimension_test.rs"]
mod tests;
