//! Product Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product ID type
pub type ProductId = RecordId;

/// Status string for products that can currently be ordered
pub const STATUS_AVAILABLE: &str = "available";

/// Product model matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    /// Unique product name (natural key for bulk import)
    pub name: String,
    pub category: String,
    /// Non-negative unit price
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Non-negative stock quantity
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_status")]
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn default_status() -> String {
    STATUS_AVAILABLE.to_string()
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.status == STATUS_AVAILABLE
    }
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub status: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
    pub status: Option<String>,
}
