//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// User ID type
pub type UserId = RecordId;

/// Embedded role snapshot `{role_id, role_name}`
///
/// Numeric role convention used by the authorization checks:
/// 1 = administrator, 2 = staff, 3 = customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub role_id: u32,
    pub role_name: String,
}

impl RoleRef {
    /// Snapshot for a known role id, with the canonical display name
    pub fn from_id(role_id: u32) -> Self {
        Self {
            role_id,
            role_name: crate::auth::roles::role_name(role_id).to_string(),
        }
    }

    pub fn admin() -> Self {
        Self::from_id(crate::auth::roles::ROLE_ADMIN)
    }

    pub fn staff() -> Self {
        Self::from_id(crate::auth::roles::ROLE_STAFF)
    }

    pub fn customer() -> Self {
        Self::from_id(crate::auth::roles::ROLE_CUSTOMER)
    }
}

/// User model matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<UserId>,
    pub name: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never exposed through the API (see [`UserPublic`])
    pub password_hash: String,
    /// Embedded role snapshot, denormalized by design
    pub role: RoleRef,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Verify a candidate password against the stored argon2 hash
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password with argon2 and a fresh salt
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// API-safe projection of a [`User`] (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: RoleRef,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            name: u.name,
            username: u.username,
            email: u.email,
            role: u.role,
            phone: u.phone,
            address: u.address,
            created_at: u.created_at,
        }
    }
}

/// Create user payload (registration and admin creation)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    /// Only honored for admin-initiated creation; registration forces customer
    pub role: Option<RoleRef>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// Re-hashed only when present, mirroring "hash on modify" semantics
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub role: Option<RoleRef>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
