//! # State Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │          AppState            │   │           Session            │   │
//! │  │  (shared, read-only)         │   │  (one per shopper, &mut)     │   │
//! │  │                              │   │                              │   │
//! │  │  Database (SQLite pool)      │   │  Cart + coupon slot          │   │
//! │  │  StorefrontConfig            │   │  AuthState                   │   │
//! │  │  JwtManager                  │   │  Box<dyn CartBackend>        │   │
//! │  └──────────────────────────────┘   └──────────────┬───────────────┘   │
//! │                                                    │                    │
//! │                               ┌────────────────────┴────────┐          │
//! │                               ▼                             ▼          │
//! │                       LocalCart (guest file)     RemoteCart (account)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session is driven by one task at a time through `&mut Session`, so it
//! needs no lock.

mod app;
mod backend;
mod guest;
mod remote;
mod session;

pub use app::AppState;
pub use backend::{backend_kind, BackendError, BackendKind, CartBackend, CartChange};
pub use guest::{GuestStorage, LocalCart};
pub use remote::RemoteCart;
pub use session::{AuthState, CheckoutSummary, Session};
