//! Configuration types and parsing for shelf.yml

use crate::error::{CoreError, CoreResult};
use crate::pipeline::PipelineOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "shelf.yml";

/// Project configuration from shelf.yml
///
/// Every field has a default, so a project without a config file runs with
/// `Config::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name, recorded in the run summary
    #[serde(default = "default_name")]
    pub name: String,

    /// Raw listings CSV, relative to the project directory
    #[serde(default = "default_input")]
    pub input: String,

    /// Directory the output tables are exported to as CSV
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Warehouse connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Text encodings of the raw feed
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Quality invariant thresholds
    #[serde(default)]
    pub quality: QualityConfig,

    /// Surrogate key assignment
    #[serde(default)]
    pub keys: KeysConfig,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Schema the output tables are created in (default: main)
    #[serde(default)]
    pub schema: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            schema: None,
        }
    }
}

/// How currency, percentage, count and category fields are encoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParsingConfig {
    /// Symbols stripped from price fields
    #[serde(default = "default_currency_symbols")]
    pub currency_symbols: Vec<String>,

    /// Thousands separator stripped from numeric fields
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,

    /// Separator between category levels
    #[serde(default = "default_category_delimiter")]
    pub category_delimiter: char,

    /// rating_count spellings that mean "no reviews" (case-insensitive, trimmed)
    #[serde(default = "default_missing_tokens")]
    pub missing_tokens: Vec<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            currency_symbols: default_currency_symbols(),
            thousands_separator: default_thousands_separator(),
            category_delimiter: default_category_delimiter(),
            missing_tokens: default_missing_tokens(),
        }
    }
}

impl ParsingConfig {
    /// Check whether a trimmed rating_count value means "no reviews"
    pub fn is_missing_token(&self, value: &str) -> bool {
        self.missing_tokens
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(value))
    }
}

/// Thresholds for the batch quality checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityConfig {
    /// Lowest accepted rating (inclusive)
    #[serde(default = "default_rating_min")]
    pub rating_min: f64,

    /// Highest accepted rating (inclusive)
    #[serde(default = "default_rating_max")]
    pub rating_max: f64,

    /// Optional ceiling on the number of category levels in the dataset
    #[serde(default)]
    pub max_category_depth: Option<usize>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            rating_min: default_rating_min(),
            rating_max: default_rating_max(),
            max_category_depth: None,
        }
    }
}

/// Surrogate key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeysConfig {
    /// Order in which category keys are handed out
    #[serde(default)]
    pub category_order: KeyOrder,
}

/// Deterministic order for dense category_key assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Order of first appearance in the canonical table
    #[default]
    FirstAppearance,
    /// Lexicographic order of the category path
    Path,
}

impl std::fmt::Display for KeyOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyOrder::FirstAppearance => write!(f, "first_appearance"),
            KeyOrder::Path => write!(f, "path"),
        }
    }
}

fn default_name() -> String {
    "shelfstar".to_string()
}

fn default_input() -> String {
    "data/raw/amazon.csv".to_string()
}

fn default_output_dir() -> String {
    "data/processed".to_string()
}

fn default_db_path() -> String {
    "target/warehouse.duckdb".to_string()
}

fn default_currency_symbols() -> Vec<String> {
    vec!["₹".to_string()]
}

fn default_thousands_separator() -> char {
    ','
}

fn default_category_delimiter() -> char {
    '|'
}

fn default_missing_tokens() -> Vec<String> {
    vec![String::new(), "nan".to_string(), "missing".to_string()]
}

fn default_rating_min() -> f64 {
    0.0
}

fn default_rating_max() -> f64 {
    5.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            input: default_input(),
            output_dir: default_output_dir(),
            database: DatabaseConfig::default(),
            parsing: ParsingConfig::default(),
            quality: QualityConfig::default(),
            keys: KeysConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load shelf.yml from a project directory, falling back to defaults when absent
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!(
                "No {} in {}, using default configuration",
                CONFIG_FILE_NAME,
                dir.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if !self.quality.rating_min.is_finite()
            || !self.quality.rating_max.is_finite()
            || self.quality.rating_min > self.quality.rating_max
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "quality.rating_min ({}) must be finite and not above quality.rating_max ({})",
                    self.quality.rating_min, self.quality.rating_max
                ),
            });
        }

        if self.quality.max_category_depth == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "quality.max_category_depth must be at least 1".to_string(),
            });
        }

        let separator = self.parsing.thousands_separator;
        if separator == '.' || separator == '%' || separator.is_ascii_digit() {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "parsing.thousands_separator '{}' clashes with the decimal point, digits or '%'",
                    separator
                ),
            });
        }

        if self.parsing.category_delimiter == self.parsing.thousands_separator {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "parsing.category_delimiter and parsing.thousands_separator are both '{}'",
                    self.parsing.category_delimiter
                ),
            });
        }

        if let Some(symbol) = self
            .parsing
            .currency_symbols
            .iter()
            .find(|s| s.is_empty() || s.chars().any(|c| c.is_ascii_digit() || c == '.'))
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "parsing.currency_symbols entry '{}' is empty or contains digits",
                    symbol
                ),
            });
        }

        Ok(())
    }

    /// Input CSV path resolved against the project root
    pub fn input_path_absolute(&self, root: &Path) -> PathBuf {
        resolve(root, &self.input)
    }

    /// Output directory resolved against the project root
    pub fn output_dir_absolute(&self, root: &Path) -> PathBuf {
        resolve(root, &self.output_dir)
    }

    /// Database path resolved against the project root (`:memory:` is kept as-is)
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            self.database.path.clone()
        } else {
            resolve(root, &self.database.path).display().to_string()
        }
    }

    /// Build the pipeline options for one run
    pub fn pipeline_options(&self, ingestion_date: NaiveDate) -> PipelineOptions {
        PipelineOptions {
            parsing: self.parsing.clone(),
            quality: self.quality.clone(),
            key_order: self.keys.category_order,
            ingestion_date,
        }
    }
}

fn resolve(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
