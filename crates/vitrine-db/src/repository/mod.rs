//! # Repository Module
//!
//! One repository per aggregate, each holding a clone of the pool.
//!
//! ```text
//!   Storefront session
//!        │  db.coupons().find_by_code("PROMO10")
//!        ▼
//!   CouponRepository ──► SQL ──► SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`account::AccountRepository`] - Registration, credentials, roles
//! - [`catalog::CatalogRepository`] - Categories and sizes
//! - [`product::ProductRepository`] - Products, filters, per-size stock
//! - [`coupon::CouponRepository`] - Coupon lookup and back-office CRUD
//! - [`cart::CartRepository`] - Server-side cart lines
//! - [`order::OrderRepository`] - Placed orders and their status

pub mod account;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod order;
pub mod product;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
