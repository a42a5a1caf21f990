//! Venue Table Model
//!
//! A table owns its song queue, its order lines, and a running bill. Song,
//! product, and server identities are embedded as value snapshots taken at
//! write time, so historical entries stay accurate even when the referenced
//! catalog record is edited later.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Table ID type
pub type TableId = RecordId;

/// Embedded table-state descriptor `{state_id, state_name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub state_id: u32,
    pub state_name: String,
}

impl TableState {
    pub fn available() -> Self {
        Self {
            state_id: 1,
            state_name: "available".to_string(),
        }
    }

    pub fn occupied() -> Self {
        Self {
            state_id: 2,
            state_name: "occupied".to_string(),
        }
    }

    pub fn reserved() -> Self {
        Self {
            state_id: 3,
            state_name: "reserved".to_string(),
        }
    }
}

/// Embedded song-queue-entry state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongState {
    pub state_id: u32,
    pub state_name: String,
}

impl SongState {
    pub fn queued() -> Self {
        Self {
            state_id: 1,
            state_name: "queued".to_string(),
        }
    }

    pub fn playing() -> Self {
        Self {
            state_id: 2,
            state_name: "playing".to_string(),
        }
    }

    pub fn played() -> Self {
        Self {
            state_id: 3,
            state_name: "played".to_string(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            state_id: 4,
            state_name: "cancelled".to_string(),
        }
    }
}

/// Embedded order-line state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineState {
    pub state_id: u32,
    pub state_name: String,
}

impl LineState {
    pub fn pending() -> Self {
        Self {
            state_id: 1,
            state_name: "pending".to_string(),
        }
    }

    pub fn delivered() -> Self {
        Self {
            state_id: 2,
            state_name: "delivered".to_string(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            state_id: 3,
            state_name: "cancelled".to_string(),
        }
    }
}

/// Song queue entry on a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSongEntry {
    /// Song title (value snapshot, not a record link)
    pub title: String,
    pub state: SongState,
    pub registered_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub special: bool,
}

/// Product snapshot embedded in an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Identity snapshot of the staff member who recorded the line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRef {
    pub user_id: String,
    pub name: String,
}

/// One product request recorded against the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub state: LineState,
    pub server: ServerRef,
    #[serde(default)]
    pub note: Option<String>,
    pub at: chrono::DateTime<chrono::Utc>,
    pub code: String,
}

impl OrderLine {
    /// Line amount: `price × quantity`
    pub fn amount(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Eagerly maintained running bill `{total, as_of}`
///
/// Updated on every order-line append; never derived lazily at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedTotal {
    pub total: Decimal,
    pub as_of: chrono::DateTime<chrono::Utc>,
}

impl AccumulatedTotal {
    pub fn zero() -> Self {
        Self {
            total: Decimal::ZERO,
            as_of: chrono::Utc::now(),
        }
    }
}

/// Immutable snapshot written when the table's account is closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountClosing {
    pub paid: bool,
    pub paid_at: chrono::DateTime<chrono::Utc>,
    pub method: super::order::PaymentMethod,
    pub total_amount: Decimal,
}

/// Venue table model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueTable {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<TableId>,
    /// Unique table number
    pub table_number: u32,
    pub capacity: u32,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub special_status: bool,
    pub state: TableState,
    /// Credential string for guest/table-scoped access
    pub credential: String,
    #[serde(default)]
    pub songs: Vec<TableSongEntry>,
    #[serde(default)]
    pub order_lines: Vec<OrderLine>,
    pub accumulated_total: AccumulatedTotal,
    #[serde(default)]
    pub closing: Option<AccountClosing>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Optimistic concurrency counter; bumped on every conditional write
    #[serde(default)]
    pub revision: u64,
}

impl VenueTable {
    /// A table with a closing snapshot is terminal for its billing cycle
    pub fn is_closed(&self) -> bool {
        self.closing.as_ref().is_some_and(|c| c.paid)
    }
}

/// Create table payload
#[derive(Debug, Clone, Deserialize)]
pub struct TableCreate {
    pub table_number: u32,
    pub capacity: u32,
    #[serde(default)]
    pub special_status: bool,
    pub state: Option<TableState>,
    pub credential: Option<String>,
}

/// Update table payload
#[derive(Debug, Clone, Deserialize)]
pub struct TableUpdate {
    pub capacity: Option<u32>,
    pub special_status: Option<bool>,
    pub state: Option<TableState>,
    pub credential: Option<String>,
}

/// Append-order-line payload (the product snapshot is taken server-side)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineCreate {
    /// Product id in `product:id` form
    pub product: String,
    pub quantity: u32,
    pub note: Option<String>,
}

/// Append-song payload
#[derive(Debug, Clone, Deserialize)]
pub struct TableSongCreate {
    /// Song id in `song:id` form; the title snapshot is taken server-side
    pub song: String,
    #[serde(default)]
    pub special: bool,
}
