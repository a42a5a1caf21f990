//! Closing History Model
//!
//! Immutable record of a till-closing event. Created once per closing,
//! never mutated afterwards.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Closing record ID type
pub type ClosingId = RecordId;

/// Identity snapshot of the staff member who performed the closing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedBy {
    pub user_id: String,
    pub user_name: String,
}

/// Till-closing event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ClosingId>,
    pub closed_at: chrono::DateTime<chrono::Utc>,
    pub grand_total: Decimal,
    #[serde(default)]
    pub comment: Option<String>,
    pub user: ClosedBy,
}

/// Create closing payload (till closing initiated by staff)
#[derive(Debug, Clone, Deserialize)]
pub struct ClosingCreate {
    pub grand_total: Decimal,
    pub comment: Option<String>,
}
