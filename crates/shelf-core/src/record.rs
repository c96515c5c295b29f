//! Listing records before and after field normalization

use crate::product_id::ProductId;
use serde::{Deserialize, Serialize};

/// Input column names, in feed order
pub const RAW_COLUMNS: [&str; 10] = [
    "product_id",
    "product_name",
    "category",
    "img_link",
    "product_link",
    "actual_price",
    "discounted_price",
    "discount_percentage",
    "rating",
    "rating_count",
];

/// One listing exactly as ingested.
///
/// All fields are text; an absent cell is the empty string. `product_id` is
/// not unique across the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    /// Delimited category taxonomy, e.g. `Electronics|Phones|Smartphones`
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub img_link: String,
    #[serde(default)]
    pub product_link: String,
    /// Currency encoded, e.g. `₹1,999`
    #[serde(default)]
    pub actual_price: String,
    /// Currency encoded, e.g. `₹1,499`
    #[serde(default)]
    pub discounted_price: String,
    /// Percent encoded, e.g. `25%`
    #[serde(default)]
    pub discount_percentage: String,
    #[serde(default)]
    pub rating: String,
    /// Possibly comma grouped, possibly missing
    #[serde(default)]
    pub rating_count: String,
}

/// A listing with its numeric fields parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub product_id: ProductId,
    pub product_name: String,
    /// Raw category string, decomposed later by the hierarchy extractor
    pub category: String,
    pub img_link: String,
    pub product_link: String,
    pub actual_price: f64,
    pub discounted_price: f64,
    /// Numeric percentage (25.0 for `25%`)
    pub discount_percentage: f64,
    /// 0.0 when the source value was not a number
    pub rating: f64,
    pub rating_count: i64,
}
