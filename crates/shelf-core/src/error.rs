//! Error types for shelf-core

use crate::quality::QualityReport;
use thiserror::Error;

/// Core error type for Shelfstar
///
/// Every variant aborts the run. Codes are grouped by family:
/// `E` configuration and IO, `N` malformed input fields, `Q` quality
/// invariants, `I` internal consistency (a logic defect rather than bad data).
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// N001: A field could not be parsed into its numeric type
    #[error("[N001] Malformed {field} in row {row} (product '{product_id}'): '{value}' {reason}")]
    MalformedField {
        row: usize,
        product_id: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// N002: A listing without a product identifier
    #[error("[N002] Row {row} has an empty product_id")]
    MissingProductId { row: usize },

    /// Q001: One or more quality invariants failed over the batch
    #[error("[Q001] {report}")]
    QualityCheckFailed { report: Box<QualityReport> },

    /// I001: Deduplication left more than one row for a product
    #[error("[I001] Duplicate product_id survived deduplication: {product_id}")]
    DuplicateAfterDedup { product_id: String },

    /// I002: A category path could not be resolved to a surrogate key
    #[error("[I002] Category path '{path}' of product '{product_id}' has no category_key")]
    UnresolvedCategoryKey { product_id: String, path: String },

    /// I003: Two rows share a path but disagree on levels, leaf or depth
    #[error("[I003] Inconsistent hierarchy for category path '{path}'")]
    InconsistentCategory { path: String },

    /// I004: A canonical product has no bridge row
    #[error("[I004] Product '{product_id}' is missing from the category bridge")]
    MissingBridgeRow { product_id: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// True for errors caused by the input data rather than by configuration or a logic defect
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedField { .. }
                | CoreError::MissingProductId { .. }
                | CoreError::QualityCheckFailed { .. }
        )
    }

    /// True for errors that signal a defect in the pipeline itself
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateAfterDedup { .. }
                | CoreError::UnresolvedCategoryKey { .. }
                | CoreError::InconsistentCategory { .. }
                | CoreError::MissingBridgeRow { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
