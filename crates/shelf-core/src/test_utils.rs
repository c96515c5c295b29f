//! Shared fixtures for unit tests

use crate::record::RawRecord;

/// Build a raw listing with the fields the pipeline actually reads.
pub(crate) fn raw(
    product_id: &str,
    category: &str,
    actual_price: &str,
    discounted_price: &str,
    rating: &str,
    rating_count: &str,
) -> RawRecord {
    RawRecord {
        product_id: product_id.to_string(),
        product_name: format!("{} name", product_id),
        category: category.to_string(),
        img_link: format!("https://img.example.com/{}.jpg", product_id),
        product_link: format!("https://shop.example.com/dp/{}", product_id),
        actual_price: actual_price.to_string(),
        discounted_price: discounted_price.to_string(),
        discount_percentage: "10%".to_string(),
        rating: rating.to_string(),
        rating_count: rating_count.to_string(),
    }
}

/// A valid listing in the given category.
pub(crate) fn listing(product_id: &str, category: &str) -> RawRecord {
    raw(product_id, category, "₹1,000", "₹900", "4.0", "100")
}

/// Run the stages up to deduplication with default settings.
pub(crate) fn canonical(raw: &[RawRecord]) -> crate::dedup::CanonicalTable {
    let parsing = crate::config::ParsingConfig::default();
    let batch = crate::normalize::normalize_records(raw, &parsing).unwrap();
    let table = crate::hierarchy::extract_hierarchies(batch.records, &parsing);
    let validated =
        crate::quality::validate(table, &crate::config::QualityConfig::default()).unwrap();
    crate::dedup::deduplicate(validated).unwrap()
}
