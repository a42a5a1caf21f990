//! Order Model
//!
//! An order references its table and serving staff member by record link and
//! carries item lines plus song-request lines. `total` is recomputed from the
//! item lines before every persist (see [`crate::billing`]).

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// Overall order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Song-request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SongRequestStatus {
    Pending,
    Played,
    Cancelled,
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// One item line: product reference, quantity and unit price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    /// Line amount: `price × quantity`
    pub fn amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// One queued song request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRequest {
    #[serde(with = "serde_helpers::record_id")]
    pub song: RecordId,
    pub status: SongRequestStatus,
    pub requested_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub played_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Payment-state snapshot written when the order's account is settled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayment {
    pub paid: bool,
    pub paid_at: chrono::DateTime<chrono::Utc>,
    pub method: PaymentMethod,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub table: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub served_by: RecordId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub song_requests: Vec<SongRequest>,
    pub status: OrderStatus,
    /// Always `Σ price×quantity` over `items` after a persist with a
    /// non-empty item list; left untouched when the list is empty
    pub total: Decimal,
    pub start_time: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub payment: Option<OrderPayment>,
    /// Optimistic concurrency counter; bumped on every conditional write
    #[serde(default)]
    pub revision: u64,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment.as_ref().is_some_and(|p| p.paid)
    }
}

/// Create order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    /// Table id in `venue_table:id` form
    pub table: String,
    #[serde(default)]
    pub items: Vec<OrderItemCreate>,
    #[serde(default)]
    pub song_requests: Vec<SongRequestCreate>,
}

/// Item line payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemCreate {
    /// Product id in `product:id` form
    pub product: String,
    pub quantity: u32,
    /// Unit price; when omitted the product's current price is snapshotted
    pub price: Option<Decimal>,
}

/// Song request payload
#[derive(Debug, Clone, Deserialize)]
pub struct SongRequestCreate {
    /// Song id in `song:id` form
    pub song: String,
}

/// Replace-items payload (`PUT /api/orders/{id}/items`)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemsUpdate {
    pub items: Vec<OrderItemCreate>,
}

/// Status transition payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Song-request status transition payload
#[derive(Debug, Clone, Deserialize)]
pub struct SongRequestStatusUpdate {
    pub status: SongRequestStatus,
}

/// Close-order payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCloseRequest {
    pub method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub comment: Option<String>,
}
