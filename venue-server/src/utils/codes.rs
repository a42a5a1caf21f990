//! Order code generation
//!
//! Order-line codes are short opaque identifiers printed on tickets and
//! referenced by staff when serving. Uniqueness within a venue is all that
//! matters, so a truncated v4 UUID is enough.

use uuid::Uuid;

/// Generate a new order-line code, e.g. `P-9F3A21C4`
pub fn new_order_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("P-{}", id[..8].to_uppercase())
}
