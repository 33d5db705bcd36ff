use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One untyped row as produced by a spreadsheet reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawRecord {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

/// A row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub code: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub code: String,
    pub quantity: i64,
}

impl From<ProductRow> for NewProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            code: row.code,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub code: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProcessingRequest {
    pub product_id: u64,
    pub product_code: String,
    pub requested_at: DateTime<Utc>,
}

impl ImageProcessingRequest {
    pub fn for_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            product_code: product.code.clone(),
            requested_at: Utc::now(),
        }
    }

    pub fn references(&self, product: &Product) -> bool {
        self.product_id == product.id && self.product_code == product.code
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub created: Vec<Product>,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}

impl ImportReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped_invalid + self.skipped_duplicate
    }
}
