//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{RoleRef, User};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY name")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = parse_id(TABLE, id)?;
        let user: Option<User> = self.base.db().select(rid).await?;
        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user (the password must already be hashed)
    pub async fn create(&self, user: User) -> RepoResult<User> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "username '{}' is already taken",
                user.username
            )));
        }
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Partial update; only provided fields are written
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: &str,
        name: Option<String>,
        email: Option<String>,
        password_hash: Option<String>,
        role: Option<RoleRef>,
        phone: Option<String>,
        address: Option<String>,
    ) -> RepoResult<User> {
        let rid = parse_id(TABLE, id)?;

        if let Some(ref new_email) = email
            && let Some(existing) = self.find_by_email(new_email).await?
            && existing.id.as_ref() != Some(&rid)
        {
            return Err(RepoError::Duplicate(format!(
                "email '{}' is already registered",
                new_email
            )));
        }

        let mut set_parts: Vec<&str> = Vec::new();
        if name.is_some() {
            set_parts.push("name = $name");
        }
        if email.is_some() {
            set_parts.push("email = $email");
        }
        if password_hash.is_some() {
            set_parts.push("password_hash = $password_hash");
        }
        if role.is_some() {
            set_parts.push("role = $role");
        }
        if phone.is_some() {
            set_parts.push("phone = $phone");
        }
        if address.is_some() {
            set_parts.push("address = $address");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)));
        }

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", rid));

        if let Some(v) = name {
            query = query.bind(("name", v));
        }
        if let Some(v) = email {
            query = query.bind(("email", v));
        }
        if let Some(v) = password_hash {
            query = query.bind(("password_hash", v));
        }
        if let Some(v) = role {
            query = query.bind(("role", v));
        }
        if let Some(v) = phone {
            query = query.bind(("phone", v));
        }
        if let Some(v) = address {
            query = query.bind(("address", v));
        }

        let mut result = query.await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
