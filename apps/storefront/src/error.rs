//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vitrine                                │
//! │                                                                         │
//! │  Command Function  ──►  Result<T, ApiError>                             │
//! │         │                                                               │
//! │         ├── ValidationError / CoreError ───► VALIDATION_ERROR           │
//! │         ├── CouponError::MinimumNotMet ────► MINIMUM_NOT_MET            │
//! │         ├── CouponError::NotFound ─────────► NOT_FOUND                  │
//! │         ├── DbError (store unreachable) ───► UPSTREAM_UNAVAILABLE       │
//! │         ├── AuthError ─────────────────────► UNAUTHORIZED / FORBIDDEN   │
//! │         └── anything else ─────────────────► INTERNAL                   │
//! │                                                                         │
//! │  Shell prints: { "ok": false, "error": { "code": ..., "message": ... } }│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::state::BackendError;
use vitrine_core::{CoreError, CouponError, ValidationError};
use vitrine_db::DbError;

/// Message shown whenever the store cannot be reached. Retrying is left to
/// the shopper.
pub const UNAVAILABLE_MESSAGE: &str = "The store is unavailable right now, please try again later";

/// API error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "MINIMUM_NOT_MET",
///   "message": "Minimum purchase for this coupon is 200.00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found, or coupon unknown/expired
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Coupon minimum spend not reached
    MinimumNotMet,

    /// Backing store could not be reached
    UpstreamUnavailable,

    /// Missing, invalid or expired session
    Unauthorized,

    /// Authenticated but not allowed
    Forbidden,

    /// Unique value already taken (email, coupon code, slug)
    Conflict,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unavailable() -> Self {
        ApiError::new(ErrorCode::UpstreamUnavailable, UNAVAILABLE_MESSAGE)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            error!(error = %err, "Store unavailable");
            return ApiError::unavailable();
        }

        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                error!("Check constraint violation: {}", message);
                ApiError::validation("Value out of range")
            }
            other => {
                // Log the actual error but return a generic message
                error!("Database operation failed: {}", other);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::Validation(e) => ApiError::from(e),
            other @ (CoreError::SizeUnavailable { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::EmptyCart) => ApiError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts coupon refusals to API errors.
impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        let code = match err {
            CouponError::EmptyCode | CouponError::EmptyCart => ErrorCode::ValidationError,
            CouponError::NotFound => ErrorCode::NotFound,
            CouponError::MinimumNotMet { .. } => ErrorCode::MinimumNotMet,
            CouponError::Unavailable => ErrorCode::UpstreamUnavailable,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AdminOnly => ApiError::new(ErrorCode::Forbidden, err.to_string()),
            AuthError::Hashing(e) => {
                error!("Password hashing failed: {}", e);
                ApiError::internal("Could not process the password")
            }
            other => ApiError::new(ErrorCode::Unauthorized, other.to_string()),
        }
    }
}

/// Converts cart persistence failures to API errors.
///
/// Account cart writes that fail surface as `UPSTREAM_UNAVAILABLE`; the
/// session has already rolled the change back.
impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Storage(e) => {
                error!("Guest cart storage failed: {}", e);
                ApiError::internal("Could not save your cart")
            }
            BackendError::Upstream(e) => {
                error!("Cart store failed: {}", e);
                ApiError::unavailable()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for storefront commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Money;

    #[test]
    fn test_minimum_not_met_carries_minimum() {
        let err = ApiError::from(CouponError::MinimumNotMet {
            minimum: Money::from_cents(20_000),
        });
        assert_eq!(err.code, ErrorCode::MinimumNotMet);
        assert!(err.message.contains("200.00"));
    }

    #[test]
    fn test_coupon_error_codes() {
        assert_eq!(ApiError::from(CouponError::NotFound).code, ErrorCode::NotFound);
        assert_eq!(
            ApiError::from(CouponError::EmptyCode).code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            ApiError::from(CouponError::Unavailable).code,
            ErrorCode::UpstreamUnavailable
        );
    }

    #[test]
    fn test_unreachable_store_is_generic() {
        let err = ApiError::from(DbError::ConnectionFailed("socket closed".to_string()));
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert_eq!(err.message, UNAVAILABLE_MESSAGE);
        assert_eq!(ApiError::from(DbError::PoolExhausted).code, ErrorCode::UpstreamUnavailable);
    }

    #[test]
    fn test_db_error_mapping() {
        assert_eq!(
            ApiError::from(DbError::duplicate("email", "a@b.c")).code,
            ErrorCode::Conflict
        );
        assert_eq!(
            ApiError::from(DbError::not_found("Product", "p-1")).code,
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(DbError::QueryFailed("syntax".to_string())).code,
            ErrorCode::Internal
        );
    }

    #[test]
    fn test_cart_store_failure_is_unavailable() {
        let err = ApiError::from(BackendError::Upstream(DbError::not_found("CartLine", "l-1")));
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        let err = ApiError::from(BackendError::Storage("disk full".to_string()));
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(ApiError::from(AuthError::AdminOnly).code, ErrorCode::Forbidden);
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).code,
            ErrorCode::Unauthorized
        );
    }

    #[test]
    fn test_serializes_screaming_snake_code() {
        let json = serde_json::to_value(ApiError::from(CouponError::NotFound)).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Invalid or expired coupon");
    }
}
