//! Product snapshot fact

use crate::dedup::CanonicalTable;
use crate::error::{CoreError, CoreResult};
use crate::star::{BridgeRow, CategoryKey, FactRow};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Project the measures of every canonical product, keyed through the bridge.
///
/// Every row carries the same `ingestion_date`: this is a snapshot of the run,
/// not an event timestamp.
pub fn build_fact(
    canonical: &CanonicalTable,
    bridge: &[BridgeRow],
    ingestion_date: NaiveDate,
) -> CoreResult<Vec<FactRow>> {
    let keys: HashMap<&str, CategoryKey> = bridge
        .iter()
        .map(|row| (row.product_id.as_str(), row.category_key))
        .collect();

    canonical
        .rows()
        .iter()
        .map(|row| {
            let listing = &row.listing;
            let category_key = keys.get(listing.product_id.as_str()).copied().ok_or_else(|| {
                CoreError::MissingBridgeRow {
                    product_id: listing.product_id.to_string(),
                }
            })?;
            Ok(FactRow {
                product_id: listing.product_id.clone(),
                category_key,
                discounted_price: listing.discounted_price,
                actual_price: listing.actual_price,
                discount_percentage: listing.discount_percentage,
                rating: listing.rating,
                rating_count: listing.rating_count,
                ingestion_date,
            })
        })
        .collect()
}
