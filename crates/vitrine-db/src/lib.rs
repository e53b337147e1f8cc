//! # vitrine-db: Database Layer for the Storefront
//!
//! SQLite storage for the catalog, accounts, coupons, placed orders and the
//! server-side carts of authenticated shoppers. Guest carts never reach this
//! crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Data Flow                                │
//! │                                                                         │
//! │  Storefront session (apply_coupon, add_to_cart, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vitrine-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ AccountRepo    │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo    │    │              │  │   │
//! │  │   │               │    │ ProductRepo    │    │              │  │   │
//! │  │   │               │    │ CouponRepo     │    │              │  │   │
//! │  │   │               │    │ CartRepo       │    │ 002_orders   │  │   │
//! │  │   │               │    │ OrderRepo      │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or :memory: in tests)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("vitrine.db")).await?;
//! let coupon = db.coupons().find_by_code("PROMO10").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::account::{AccountRepository, NewAccount};
pub use repository::cart::CartRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::{NewOrder, OrderRepository};
pub use repository::product::ProductRepository;
