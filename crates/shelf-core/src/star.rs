//! Star-schema output tables

use crate::hierarchy::LevelSchema;
use crate::product_id::ProductId;
use crate::table::{Cell, Column, ColumnType, TableShape, TableView};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DIM_CATEGORY: &str = "dim_category";
pub const DIM_PRODUCT: &str = "dim_product";
pub const BRIDGE_PRODUCT_CATEGORY: &str = "bridge_product_category";
pub const FACT_PRODUCT_SNAPSHOT: &str = "fact_product_snapshot";

/// Surrogate key of a category dimension row, dense from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(u32);

impl CategoryKey {
    pub fn new(key: u32) -> Self {
        Self(key)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One distinct category path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimCategoryRow {
    pub category_key: CategoryKey,
    pub levels: Vec<Option<String>>,
    pub leaf: Option<String>,
    pub depth: usize,
    pub path: String,
}

/// Descriptive attributes of one canonical product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimProductRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub img_link: String,
    pub product_link: String,
    /// Denormalized leaf category
    pub leaf: Option<String>,
}

/// Resolves a product to its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRow {
    pub product_id: ProductId,
    pub category_key: CategoryKey,
}

/// Point-in-time measures of one canonical product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub product_id: ProductId,
    pub category_key: CategoryKey,
    pub discounted_price: f64,
    pub actual_price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub rating_count: i64,
    pub ingestion_date: NaiveDate,
}

/// The four output tables of a run
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub levels: LevelSchema,
    pub dim_category: Vec<DimCategoryRow>,
    pub dim_product: Vec<DimProductRow>,
    pub bridge: Vec<BridgeRow>,
    pub fact: Vec<FactRow>,
}

impl StarSchema {
    /// Materialize all four tables in output order
    pub fn tables(&self) -> Vec<TableView> {
        vec![
            self.dim_category_view(),
            self.dim_product_view(),
            self.bridge_view(),
            self.fact_view(),
        ]
    }

    /// Shapes of all four tables
    pub fn shapes(&self) -> Vec<TableShape> {
        self.tables().iter().map(TableView::shape).collect()
    }

    pub fn dim_category_view(&self) -> TableView {
        let mut columns = vec![Column::new("category_key", ColumnType::Integer)];
        columns.extend(
            self.levels
                .level_columns()
                .into_iter()
                .map(|name| Column::nullable(name, ColumnType::Text)),
        );
        columns.push(Column::nullable("leaf", ColumnType::Text));
        columns.push(Column::new("depth", ColumnType::Integer));
        columns.push(Column::new("path", ColumnType::Text));

        let rows = self
            .dim_category
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::Integer(i64::from(row.category_key.get()))];
                cells.extend(row.levels.iter().map(|l| Cell::text(l.as_deref())));
                cells.push(Cell::text(row.leaf.as_deref()));
                cells.push(Cell::count(row.depth));
                cells.push(Cell::Text(row.path.clone()));
                cells
            })
            .collect();

        TableView {
            name: DIM_CATEGORY,
            columns,
            rows,
        }
    }

    pub fn dim_product_view(&self) -> TableView {
        let columns = vec![
            Column::new("product_id", ColumnType::Text),
            Column::new("product_name", ColumnType::Text),
            Column::new("img_link", ColumnType::Text),
            Column::new("product_link", ColumnType::Text),
            Column::nullable("leaf", ColumnType::Text),
        ];
        let rows = self
            .dim_product
            .iter()
            .map(|row| {
                vec![
                    Cell::Text(row.product_id.to_string()),
                    Cell::Text(row.product_name.clone()),
                    Cell::Text(row.img_link.clone()),
                    Cell::Text(row.product_link.clone()),
                    Cell::text(row.leaf.as_deref()),
                ]
            })
            .collect();

        TableView {
            name: DIM_PRODUCT,
            columns,
            rows,
        }
    }

    pub fn bridge_view(&self) -> TableView {
        let columns = vec![
            Column::new("product_id", ColumnType::Text),
            Column::new("category_key", ColumnType::Integer),
        ];
        let rows = self
            .bridge
            .iter()
            .map(|row| {
                vec![
                    Cell::Text(row.product_id.to_string()),
                    Cell::Integer(i64::from(row.category_key.get())),
                ]
            })
            .collect();

        TableView {
            name: BRIDGE_PRODUCT_CATEGORY,
            columns,
            rows,
        }
    }

    pub fn fact_view(&self) -> TableView {
        let columns = vec![
            Column::new("product_id", ColumnType::Text),
            Column::new("category_key", ColumnType::Integer),
            Column::new("discounted_price", ColumnType::Float),
            Column::new("actual_price", ColumnType::Float),
            Column::new("discount_percentage", ColumnType::Float),
            Column::new("rating", ColumnType::Float),
            Column::new("rating_count", ColumnType::Integer),
            Column::new("ingestion_date", ColumnType::Date),
        ];
        let rows = self
            .fact
            .iter()
            .map(|row| {
                vec![
                    Cell::Text(row.product_id.to_string()),
                    Cell::Integer(i64::from(row.category_key.get())),
                    Cell::Float(row.discounted_price),
                    Cell::Float(row.actual_price),
                    Cell::Float(row.discount_percentage),
                    Cell::Float(row.rating),
                    Cell::Integer(row.rating_count),
                    Cell::Date(row.ingestion_date),
                ]
            })
            .collect();

        TableView {
            name: FACT_PRODUCT_SNAPSHOT,
            columns,
            rows,
        }
    }
}

#[cfg(test)]
#[path = "star_test.rs"]
mod tests;
