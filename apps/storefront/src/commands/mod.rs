//! # Storefront Commands
//!
//! Every shopper and back-office action, as plain async functions taking
//! the shared [`AppState`](crate::state::AppState) and, where the action
//! belongs to a shopper, their [`Session`](crate::state::Session).
//!
//! ## Command Categories
//! - `catalog` - categories, sizes, product listing and product page
//! - `cart` - cart lines, coupon slot, checkout summary
//! - `account` - register, login, logout, current account
//! - `admin` - coupon, category, size, product and stock management
//! - `orders` - placing orders, order history, order status and dashboard
//!
//! All commands return `ApiResult<T>`; the shell turns that into one JSON
//! line per command.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
