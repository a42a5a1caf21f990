//! Role Definitions
//!
//! Role identity is the pair `(numeric id, name)` embedded on each user.
//! The numbering is a fixed convention the authorization checks depend on.

/// Administrator: catalog, users and settings management
pub const ROLE_ADMIN: u32 = 1;

/// Staff: tables, orders and the song-request queue
pub const ROLE_STAFF: u32 = 2;

/// Customer: browse catalog, place song/drink requests
pub const ROLE_CUSTOMER: u32 = 3;

/// All roles that count as venue personnel
pub const STAFF_ROLES: &[u32] = &[ROLE_ADMIN, ROLE_STAFF];

/// Canonical display name for a role id
pub fn role_name(role_id: u32) -> &'static str {
    match role_id {
        ROLE_ADMIN => "admin",
        ROLE_STAFF => "staff",
        ROLE_CUSTOMER => "customer",
        _ => "unknown",
    }
}
