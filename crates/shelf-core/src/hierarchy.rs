//! Category hierarchy extraction
//!
//! The level schema is dataset wide: its width is the deepest taxonomy seen in
//! the whole batch, so extraction runs as two passes. The first splits every
//! category string and measures the global maximum depth, the second
//! materializes a fixed number of level slots per record.

use crate::config::ParsingConfig;
use crate::record::NormalizedRecord;
use serde::{Deserialize, Serialize};

/// Fixed width of the category level columns for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSchema {
    width: usize,
    delimiter: char,
}

impl LevelSchema {
    /// Create a schema with `width` level slots joined by `delimiter`
    pub fn new(width: usize, delimiter: char) -> Self {
        Self { width, delimiter }
    }

    /// Number of level slots every record carries
    pub fn width(&self) -> usize {
        self.width
    }

    /// Separator used in canonical paths
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Column names `level_1..level_D`
    pub fn level_columns(&self) -> Vec<String> {
        (1..=self.width).map(|i| format!("level_{}", i)).collect()
    }
}

/// Decomposed category taxonomy of a single listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryHierarchy {
    /// Exactly `LevelSchema::width` slots; `None` marks an absent level
    pub levels: Vec<Option<String>>,
    /// Deepest present level
    pub leaf: Option<String>,
    /// Number of present levels
    pub depth: usize,
    /// Present levels joined by the delimiter; empty when depth is 0
    pub path: String,
}

impl CategoryHierarchy {
    /// Materialize a hierarchy from a record's own levels, padded to `schema` width.
    ///
    /// Levels beyond the schema width are never passed in, since the width is
    /// the maximum over all records.
    pub fn from_levels(levels: &[String], schema: &LevelSchema) -> Self {
        let slots: Vec<Option<String>> = (0..schema.width())
            .map(|i| levels.get(i).cloned())
            .collect();
        Self::from_slots(slots, schema.delimiter())
    }

    /// Derive leaf, depth and path from already materialized slots.
    pub fn from_slots(levels: Vec<Option<String>>, delimiter: char) -> Self {
        // Scan from the deepest slot back, so trailing absent slots are skipped
        let leaf = levels.iter().rev().flatten().next().cloned();
        let depth = count_present(&levels);
        let path = join_present(&levels, delimiter);
        Self {
            levels,
            leaf,
            depth,
            path,
        }
    }

    /// Level at 1-based position `level`, if present
    pub fn level(&self, level: usize) -> Option<&str> {
        level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .and_then(|slot| slot.as_deref())
    }
}

/// Number of present slots
pub fn count_present(levels: &[Option<String>]) -> usize {
    levels.iter().filter(|slot| slot.is_some()).count()
}

/// Present slots joined with `delimiter`
pub fn join_present(levels: &[Option<String>], delimiter: char) -> String {
    let mut buf = [0u8; 4];
    let sep: &str = delimiter.encode_utf8(&mut buf);
    levels
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Number of segments in a canonical path; the empty path has none
pub fn path_segment_count(path: &str, delimiter: char) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split(delimiter).count()
    }
}

/// Split a category string into trimmed, non-empty levels
pub fn split_levels(category: &str, delimiter: char) -> Vec<String> {
    category
        .split(delimiter)
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .map(str::to_string)
        .collect()
}

/// A normalized listing together with its category hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub listing: NormalizedRecord,
    pub hierarchy: CategoryHierarchy,
}

/// The working table after hierarchy extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTable {
    pub schema: LevelSchema,
    pub rows: Vec<ProductRecord>,
}

impl ProductTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Extract the category hierarchy of every record.
///
/// Row count and order are preserved.
pub fn extract_hierarchies(records: Vec<NormalizedRecord>, parsing: &ParsingConfig) -> ProductTable {
    let delimiter = parsing.category_delimiter;
    let split: Vec<Vec<String>> = records
        .iter()
        .map(|r| split_levels(&r.category, delimiter))
        .collect();

    let width = split.iter().map(Vec::len).max().unwrap_or(0);
    let schema = LevelSchema::new(width, delimiter);
    log::debug!("Category level schema has {} levels", width);

    let rows = records
        .into_iter()
        .zip(split)
        .map(|(listing, levels)| ProductRecord {
            listing,
            hierarchy: CategoryHierarchy::from_levels(&levels, &schema),
        })
        .collect();

    ProductTable { schema, rows }
}

#[cfg(test)]
#[path = "hierarchy_test.rs"]
mod tests;
