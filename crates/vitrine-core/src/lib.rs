//! # vitrine-core: Pure Cart & Pricing Logic
//!
//! This crate holds the storefront's domain model as pure functions and
//! plain data. Nothing in here touches a database, a file or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront session (apps/storefront)            │   │
//! │  │   add_to_cart, update_cart_item, apply_coupon, checkout ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ vitrine-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │   cart   │  │  coupon  │  │ pricing  │  │  validation  │   │   │
//! │  │   │ CartItem │  │  rules   │  │ totals   │  │    rules     │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  vitrine-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Size, Coupon, Account, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart store: lines, quantities, the applied coupon slot
//! - [`coupon`] - Coupon code normalization and applicability rules
//! - [`pricing`] - Subtotal, discount and total computation
//! - [`order`] - Placed orders, their status and dashboard figures
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::cart::{Cart, NewCartItem};
//! use vitrine_core::money::Money;
//!
//! let mut cart = Cart::new();
//! cart.add_item(NewCartItem {
//!     product_id: "p-1".to_string(),
//!     product_name: "Linen Shirt".to_string(),
//!     unit_price_cents: 10_000,
//!     size_id: "s-m".to_string(),
//!     size_name: "M".to_string(),
//!     quantity: 2,
//! })
//! .unwrap();
//!
//! let totals = cart.totals();
//! assert_eq!(totals.subtotal(), Money::from_cents(20_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartState, NewCartItem, QuantityChange};
pub use error::{CoreError, CouponError, ValidationError};
pub use money::Money;
pub use order::{Order, OrderItem, OrderStats, OrderStatus};
pub use pricing::CartTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Keeps a fat-fingered "1000" from reaching checkout.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted, in cents (1,000,000.00).
///
/// A full cart at this price still sums well inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;
