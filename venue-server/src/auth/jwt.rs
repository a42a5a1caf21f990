//! JWT token service
//!
//! Generates, validates and parses the bearer tokens carried by every
//! authenticated API request.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "venue-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "venue-clients".to_string()),
        }
    }
}

/// Load the signing secret from the environment.
///
/// Production refuses to start without `JWT_SECRET`; debug builds fall back
/// to a generated per-process secret so development works out of the box.
fn load_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            panic!("JWT_SECRET must be at least 32 characters long");
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set; generating a temporary development secret");
                format!(
                    "{}{}",
                    uuid::Uuid::new_v4().simple(),
                    uuid::Uuid::new_v4().simple()
                )
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject)
    pub sub: String,
    pub username: String,
    /// Numeric role id (1 admin, 2 staff, 3 customer)
    pub role_id: u32,
    pub role_name: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create the service with default (env-driven) configuration
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create the service with an explicit configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a new access token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        role_id: u32,
        role_name: &str,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role_id,
            role_name: role_name.to_string(),
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context parsed from the JWT claims
///
/// Created by the authentication middleware and injected into request
/// extensions for handlers and the [`crate::auth::extractor`] to pick up.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role_id: u32,
    pub role_name: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role_id: claims.role_id,
            role_name: claims.role_name,
        }
    }
}

impl CurrentUser {
    /// Administrators pass every role gate
    pub fn is_admin(&self) -> bool {
        self.role_id == super::roles::ROLE_ADMIN
    }

    /// Admin or staff
    pub fn is_staff(&self) -> bool {
        super::roles::STAFF_ROLES.contains(&self.role_id)
    }

    /// Check membership in an allowed-role set (admin always passes)
    pub fn has_role(&self, allowed: &[u32]) -> bool {
        self.is_admin() || allowed.contains(&self.role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_minutes: 30,
            issuer: "venue-server".to_string(),
            audience: "venue-clients".to_string(),
        })
    }

    #[test]
    fn token_round_trip() {
        let service = test_service();

        let token = service
            .generate_token("user:abc", "maria", roles::ROLE_STAFF, "staff")
            .expect("generate");
        let claims = service.validate_token(&token).expect("validate");

        assert_eq!(claims.sub, "user:abc");
        assert_eq!(claims.username, "maria");
        assert_eq!(claims.role_id, roles::ROLE_STAFF);
        assert_eq!(claims.role_name, "staff");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let token = service
            .generate_token("user:abc", "maria", roles::ROLE_STAFF, "staff")
            .expect("generate");

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
    }

    #[test]
    fn role_checks_follow_numeric_convention() {
        let admin = CurrentUser {
            id: "user:1".into(),
            username: "root".into(),
            role_id: roles::ROLE_ADMIN,
            role_name: "admin".into(),
        };
        let customer = CurrentUser {
            id: "user:2".into(),
            username: "guest".into(),
            role_id: roles::ROLE_CUSTOMER,
            role_name: "customer".into(),
        };

        assert!(admin.is_admin());
        assert!(admin.has_role(&[roles::ROLE_STAFF]));
        assert!(!customer.is_staff());
        assert!(customer.has_role(&[roles::ROLE_CUSTOMER]));
        assert!(!customer.has_role(&[roles::ROLE_STAFF]));
    }
}
