//! # Shopper Session
//!
//! One shopper's view of the store: the cart, its coupon slot, who is
//! logged in, and the backend the cart is persisted to.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Session::guest ──► Guest + LocalCart (lines loaded from guest file)    │
//! │        │                                                                │
//! │      login ───────► Authenticated + RemoteCart (account lines loaded,   │
//! │        │            guest lines abandoned, coupon slot cleared)         │
//! │        │                                                                │
//! │      logout ──────► Guest + LocalCart, empty cart                       │
//! │                     (the guest file is left as it was)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutations
//! Every cart mutation is applied in memory first, then persisted. When the
//! backend refuses, the cart (and its coupon slot) is restored to exactly
//! what it was before the call and the error is returned.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use vitrine_core::coupon::AppliedCoupon;
use vitrine_core::{Account, Cart, CartItem, CartTotals, CoreError, NewCartItem, QuantityChange};

use super::backend::{backend_kind, BackendKind, CartBackend, CartChange};
use super::guest::{GuestStorage, LocalCart};
use crate::auth::AuthError;
use crate::coupon::CouponValidator;
use crate::error::{ApiError, ApiResult};

/// Who the session belongs to.
#[derive(Debug, Clone)]
pub enum AuthState {
    Guest,
    Authenticated { account: Account, token: String },
}

/// What checkout would charge right now.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub account_email: String,
    pub line_count: usize,
    pub totals: CartTotals,
    pub coupon_code: Option<String>,
}

pub struct Session {
    cart: Cart,
    auth: AuthState,
    backend: Box<dyn CartBackend>,
    guest_storage: GuestStorage,
    coupons: CouponValidator,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cart", &self.cart)
            .field("auth", &self.auth)
            .field("backend", &self.backend.kind())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a guest session with whatever the guest file holds.
    pub async fn guest(guest_storage: GuestStorage, coupons: CouponValidator) -> ApiResult<Self> {
        let backend = LocalCart::new(guest_storage.clone());
        let items = backend.load().await?;
        info!(lines = items.len(), "Guest session started");

        Ok(Session {
            cart: Cart::from_items(items),
            auth: AuthState::Guest,
            backend: Box::new(backend),
            guest_storage,
            coupons,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn account(&self) -> Option<&Account> {
        match &self.auth {
            AuthState::Authenticated { account, .. } => Some(account),
            AuthState::Guest => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.auth {
            AuthState::Authenticated { token, .. } => Some(token),
            AuthState::Guest => None,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    // =========================================================================
    // Login state
    // =========================================================================

    /// Switches the session to `account`, with `backend` holding its lines.
    ///
    /// The guest cart is not merged: the cart is replaced by the account's
    /// stored lines and the coupon slot starts empty. On failure the session
    /// is left untouched.
    pub async fn login(
        &mut self,
        account: Account,
        token: String,
        backend: Box<dyn CartBackend>,
    ) -> ApiResult<()> {
        let auth = AuthState::Authenticated { account, token };
        if backend.kind() != backend_kind(&auth) {
            return Err(ApiError::internal("Account sessions need an account cart backend"));
        }

        let items = backend.load().await?;
        if !self.cart.is_empty() {
            debug!(abandoned = self.cart.item_count(), "Guest lines not carried into account cart");
        }

        self.cart = Cart::from_items(items);
        self.backend = backend;
        self.auth = auth;

        if let Some(account) = self.account() {
            info!(account_id = %account.id, lines = self.cart.item_count(), "Session logged in");
        }
        Ok(())
    }

    /// Back to a guest session with an empty cart.
    pub fn logout(&mut self) {
        if let Some(account) = self.account() {
            info!(account_id = %account.id, "Session logged out");
        }
        self.auth = AuthState::Guest;
        self.backend = Box::new(LocalCart::new(self.guest_storage.clone()));
        self.cart = Cart::new();
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product+size, merging into an existing line.
    ///
    /// ## Returns
    /// The line as stored, carrying the backend's line id when it assigns
    /// one.
    pub async fn add_item(&mut self, new: NewCartItem) -> ApiResult<CartItem> {
        let before = self.cart.clone();
        let mut item = self.cart.add_item(new)?;

        if let Some(assigned) = self.persist(before, CartChange::Upserted(&item)).await? {
            if assigned != item.line_id {
                self.cart.relabel_line(&item.line_id, &assigned);
                item.line_id = assigned;
            }
        }

        debug!(line_id = %item.line_id, quantity = item.quantity, "Line added");
        Ok(item)
    }

    /// Adds `delta` to a line; reaching zero removes it.
    pub async fn update_quantity(&mut self, line_id: &str, delta: i64) -> ApiResult<QuantityChange> {
        let before = self.cart.clone();
        let change = self.cart.update_quantity(line_id, delta)?;

        match &change {
            QuantityChange::Updated(item) => {
                self.persist(before, CartChange::Upserted(item)).await?;
            }
            QuantityChange::Removed(item) => {
                self.persist(before, CartChange::Removed(item)).await?;
            }
            QuantityChange::NotInCart => {
                debug!(line_id = %line_id, "Quantity change for unknown line ignored");
            }
        }

        Ok(change)
    }

    /// Removes a line. Unknown ids are a no-op.
    pub async fn remove_item(&mut self, line_id: &str) -> ApiResult<Option<CartItem>> {
        let before = self.cart.clone();
        let Some(removed) = self.cart.remove_item(line_id) else {
            return Ok(None);
        };

        self.persist(before, CartChange::Removed(&removed)).await?;
        Ok(Some(removed))
    }

    /// Empties the cart and its coupon slot, here and in the backend.
    pub async fn clear_cart(&mut self) -> ApiResult<()> {
        if self.cart.is_empty() {
            return Ok(());
        }

        let before = self.cart.clone();
        self.cart.clear();
        self.persist(before, CartChange::Cleared).await?;

        debug!("Cart cleared");
        Ok(())
    }

    async fn persist(&mut self, before: Cart, change: CartChange<'_>) -> ApiResult<Option<String>> {
        match self.backend.persist(change, self.cart.snapshot()).await {
            Ok(assigned) => Ok(assigned),
            Err(e) => {
                warn!(backend = ?self.backend.kind(), error = %e, "Cart change not persisted, rolled back");
                self.cart = before;
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Coupon slot
    // =========================================================================

    /// Validates `code` and, only if it passes, installs it in the coupon
    /// slot, replacing whatever was there.
    pub async fn apply_coupon(&mut self, code: &str, today: NaiveDate) -> ApiResult<AppliedCoupon> {
        let applied = self.coupons.validate(code, &self.cart, today).await?;
        let replaced = self.cart.apply_coupon(applied.clone())?;

        info!(
            code = %applied.code,
            replaced = replaced.as_ref().map(|c| c.code.as_str()).unwrap_or("-"),
            "Coupon applied"
        );
        Ok(applied)
    }

    /// Empties the coupon slot.
    pub fn remove_coupon(&mut self) -> Option<AppliedCoupon> {
        let removed = self.cart.remove_coupon();
        if let Some(coupon) = &removed {
            info!(code = %coupon.code, "Coupon removed");
        }
        removed
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// The amounts checkout would charge.
    ///
    /// Requires a non-empty cart and a logged-in shopper. An applied coupon
    /// is checked again against today's store; if it no longer holds, the
    /// refusal is returned and the slot keeps the coupon.
    pub async fn checkout_summary(&self, today: NaiveDate) -> ApiResult<CheckoutSummary> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let Some(account) = self.account() else {
            return Err(AuthError::LoginRequired.into());
        };

        if let Some(applied) = self.cart.applied_coupon() {
            self.coupons.validate(&applied.code, &self.cart, today).await?;
        }

        Ok(CheckoutSummary {
            account_email: account.email.clone(),
            line_count: self.cart.item_count(),
            totals: self.cart.totals(),
            coupon_code: self.cart.applied_coupon().map(|c| c.code.clone()),
        })
    }
}
