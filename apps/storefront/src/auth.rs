//! # Authentication
//!
//! Session tokens (JWT, HS256) and password hashing (argon2).
//!
//! ## Token Lifecycle
//! ```text
//!   register / login ──► JwtManager::issue(account) ──► token (7 days)
//!                                                        │
//!   every authenticated command ◄── validate(token) ◄────┘
//!        │
//!        └──► account reloaded from the store; inactive accounts refused
//! ```
//!
//! Tokens are not stored server-side. Logging out simply drops the token.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use vitrine_core::{Account, Role};

/// Authentication and authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately the same error.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired session: {0}")]
    InvalidToken(String),

    #[error("This account is disabled")]
    AccountDisabled,

    #[error("You need to log in first")]
    LoginRequired,

    #[error("Administrator access required")]
    AdminOnly,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,

    /// Role at the time the token was issued
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Issues a session token for `account`.
    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: account.id.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(format!("failed to sign token: {}", e)))
    }

    /// Verifies the signature and expiry of a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

/// Hashes a password for storage (argon2id, random salt, PHC string).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC hash. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role) -> Account {
        Account {
            id: "acc-1".to_string(),
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            role,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);
        let token = manager.issue(&account(Role::Admin)).unwrap();

        let claims = manager.validate(&token).unwrap();
        assert_eq!(claims.sub, "acc-1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_is_refused() {
        let token = JwtManager::new("secret-a", 3600)
            .issue(&account(Role::Customer))
            .unwrap();

        let result = JwtManager::new("secret-b", 3600).validate(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_refused() {
        // Well past the default 60s leeway
        let manager = JwtManager::new("test-secret", -600);
        let token = manager.issue(&account(Role::Customer)).unwrap();
        assert!(matches!(manager.validate(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }
}
