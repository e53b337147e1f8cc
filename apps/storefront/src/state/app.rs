//! # Application State
//!
//! Everything that outlives a single shopper session: the database handle,
//! the configuration and the token manager.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is cheap to clone and safe to
//! share. Configuration is read-only after startup.

use std::sync::Arc;

use vitrine_db::Database;

use super::guest::GuestStorage;
use super::remote::RemoteCart;
use super::session::Session;
use crate::auth::JwtManager;
use crate::config::StorefrontConfig;
use crate::coupon::CouponValidator;
use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    config: StorefrontConfig,
    jwt: JwtManager,
}

impl AppState {
    pub fn new(db: Database, config: StorefrontConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.token_lifetime_secs);
        AppState { db, config, jwt }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// A coupon validator reading from the coupon table.
    pub fn coupon_validator(&self) -> CouponValidator {
        CouponValidator::new(Arc::new(self.db.coupons()))
    }

    pub fn guest_storage(&self) -> GuestStorage {
        GuestStorage::new(self.config.guest_cart_path.clone())
    }

    /// Opens a guest session over the configured guest cart file.
    pub async fn guest_session(&self) -> ApiResult<Session> {
        Session::guest(self.guest_storage(), self.coupon_validator()).await
    }

    /// The account cart backend for `account_id`.
    pub fn remote_cart(&self, account_id: &str) -> RemoteCart {
        RemoteCart::new(self.db.carts(), account_id)
    }
}
