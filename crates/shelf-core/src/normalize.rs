//! Field normalization: currency, percentage, rating and count text to numbers
//!
//! Prices, percentages and review counts are strict: anything that is not a
//! currency symbol, digit, thousands separator or single decimal point is a
//! malformed field and aborts the run. Ratings are lenient and fall back to
//! `0.0`, since they come from free text.

use crate::config::ParsingConfig;
use crate::error::{CoreError, CoreResult};
use crate::product_id::ProductId;
use crate::record::{NormalizedRecord, RawRecord};
use thiserror::Error;

/// Why a single field failed to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("is empty")]
    Empty,

    #[error("contains unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("has more than one decimal point")]
    MultipleDecimalPoints,

    #[error("has no digits")]
    NoDigits,

    #[error("is not a whole number")]
    NotAnInteger,

    #[error("is too large")]
    OutOfRange,
}

/// Output of the normalization stage
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    /// One record per input row, in input order
    pub records: Vec<NormalizedRecord>,
    /// Number of ratings that were not numeric and were replaced by 0
    pub coerced_ratings: usize,
}

/// Normalize every raw listing, preserving row count and order.
///
/// Fails on the first row with a missing product id or a malformed strict field.
pub fn normalize_records(raw: &[RawRecord], parsing: &ParsingConfig) -> CoreResult<NormalizedBatch> {
    let mut coerced_ratings = 0;
    let mut records = Vec::with_capacity(raw.len());

    for (row, record) in raw.iter().enumerate() {
        let (normalized, coerced) = normalize_record(row, record, parsing)?;
        if coerced {
            coerced_ratings += 1;
        }
        records.push(normalized);
    }

    if coerced_ratings > 0 {
        log::warn!(
            "{} of {} ratings were not numeric and were set to 0",
            coerced_ratings,
            raw.len()
        );
    }
    log::info!("Normalized {} listings", records.len());

    Ok(NormalizedBatch {
        records,
        coerced_ratings,
    })
}

/// Normalize one listing. The flag is true when the rating was coerced to 0.
fn normalize_record(
    row: usize,
    raw: &RawRecord,
    parsing: &ParsingConfig,
) -> CoreResult<(NormalizedRecord, bool)> {
    let product_id =
        ProductId::parse(&raw.product_id).ok_or(CoreError::MissingProductId { row })?;

    let malformed = |field: &'static str, value: &str, err: FieldError| CoreError::MalformedField {
        row,
        product_id: product_id.to_string(),
        field,
        value: value.to_string(),
        reason: err.to_string(),
    };

    let actual_price = parse_price(&raw.actual_price, parsing)
        .map_err(|e| malformed("actual_price", &raw.actual_price, e))?;
    let discounted_price = parse_price(&raw.discounted_price, parsing)
        .map_err(|e| malformed("discounted_price", &raw.discounted_price, e))?;
    let discount_percentage = parse_percentage(&raw.discount_percentage, parsing)
        .map_err(|e| malformed("discount_percentage", &raw.discount_percentage, e))?;
    let rating_count = parse_rating_count(&raw.rating_count, parsing)
        .map_err(|e| malformed("rating_count", &raw.rating_count, e))?;

    let (rating, coerced) = match parse_rating(&raw.rating) {
        Some(rating) => (rating, false),
        None => {
            log::debug!(
                "Row {} ({}): rating '{}' is not numeric, using 0",
                row,
                product_id,
                raw.rating
            );
            (0.0, true)
        }
    };

    Ok((
        NormalizedRecord {
            product_id,
            product_name: raw.product_name.clone(),
            category: raw.category.clone(),
            img_link: raw.img_link.clone(),
            product_link: raw.product_link.clone(),
            actual_price,
            discounted_price,
            discount_percentage,
            rating,
            rating_count,
        },
        coerced,
    ))
}

/// Parse a currency encoded price such as `₹1,999.50`.
pub fn parse_price(value: &str, parsing: &ParsingConfig) -> Result<f64, FieldError> {
    let mut cleaned = value.trim().to_string();
    for symbol in &parsing.currency_symbols {
        cleaned = cleaned.replace(symbol.as_str(), "");
    }
    parse_decimal(&strip_separator(&cleaned, parsing.thousands_separator))
}

/// Parse a percentage such as `25%` into `25.0` (not divided by 100).
pub fn parse_percentage(value: &str, parsing: &ParsingConfig) -> Result<f64, FieldError> {
    let trimmed = value.trim();
    let without_sign = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_decimal(&strip_separator(without_sign, parsing.thousands_separator))
}

/// Parse a rating, returning `None` for anything that is not a finite number.
pub fn parse_rating(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
        // -0 and 0 must tie during dedup
        .map(|rating| if rating == 0.0 { 0.0 } else { rating })
}

/// Parse a review count such as `1,234`. Missing tokens count as zero reviews.
pub fn parse_rating_count(value: &str, parsing: &ParsingConfig) -> Result<i64, FieldError> {
    let cleaned = strip_separator(value, parsing.thousands_separator);
    let cleaned = cleaned.trim();
    if parsing.is_missing_token(cleaned) {
        return Ok(0);
    }
    if let Some(c) = cleaned.chars().find(|c| !c.is_ascii_digit() && *c != '.') {
        return Err(FieldError::UnexpectedChar(c));
    }
    if cleaned.contains('.') {
        return Err(FieldError::NotAnInteger);
    }
    cleaned.parse::<i64>().map_err(|_| FieldError::OutOfRange)
}

fn strip_separator(value: &str, separator: char) -> String {
    value.chars().filter(|c| *c != separator).collect()
}

/// Parse digits with at most one decimal point.
fn parse_decimal(cleaned: &str) -> Result<f64, FieldError> {
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(FieldError::Empty);
    }

    let mut seen_point = false;
    let mut seen_digit = false;
    for c in cleaned.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if seen_point => return Err(FieldError::MultipleDecimalPoints),
            '.' => seen_point = true,
            other => return Err(FieldError::UnexpectedChar(other)),
        }
    }
    if !seen_digit {
        return Err(FieldError::NoDigits);
    }

    cleaned.parse::<f64>().map_err(|_| FieldError::NoDigits)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
