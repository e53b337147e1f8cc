//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                       │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  ├── CouponError      - Why a coupon could not be applied              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vitrine-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  storefront errors (in app)                                            │
//! │  └── ApiError         - What the shopper sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! │        CouponError ─────────────────► ApiError → Frontend              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (or is inactive).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The chosen size has no stock or is not offered for the product.
    ///
    /// ## When This Occurs
    /// ```text
    /// Size picker: [P] [M] [G✗] [GG]     (G has quantity 0)
    ///                        │
    ///                        ▼
    /// add_to_cart(size = G) → SizeUnavailable { size: "G" }
    /// ```
    #[error("Size {size} is not available for {product}")]
    SizeUnavailable { product: String, size: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout was attempted on an empty cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Coupon Error
// =============================================================================

/// Reasons a coupon code is refused.
///
/// A failed validation never touches the cart or the currently applied
/// coupon; the caller only replaces the slot on `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// Code was blank after trimming.
    #[error("Enter a coupon code")]
    EmptyCode,

    /// Coupons only apply to a cart with at least one line.
    #[error("Add products to your cart first")]
    EmptyCart,

    /// Unknown, inactive and expired codes all end up here.
    #[error("Invalid or expired coupon")]
    NotFound,

    /// The cart subtotal is below the coupon's minimum spend.
    #[error("Minimum purchase for this coupon is {minimum}")]
    MinimumNotMet { minimum: Money },

    /// The coupon store could not be reached.
    #[error("Coupons are unavailable right now, please try again later")]
    Unavailable,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs; each maps to a field-level
/// message in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_not_met_carries_amount() {
        let err = CouponError::MinimumNotMet {
            minimum: Money::from_cents(10_000),
        };
        assert_eq!(err.to_string(), "Minimum purchase for this coupon is 100.00");
    }

    #[test]
    fn test_size_unavailable_message() {
        let err = CoreError::SizeUnavailable {
            product: "Linen Shirt".to_string(),
            size: "G".to_string(),
        };
        assert_eq!(err.to_string(), "Size G is not available for Linen Shirt");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
