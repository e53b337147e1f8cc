//! # Cart Commands
//!
//! Lines, the coupon slot and the checkout summary of the current session.
//!
//! ## Cart Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_to_cart(product, size) ──► size in stock? ──► session.add_item     │
//! │                                      │                                  │
//! │                                      └── no ──► VALIDATION_ERROR        │
//! │                                                                         │
//! │  apply_coupon(code) ──► validator ──► slot replaced, or error and       │
//! │                                       nothing changes                   │
//! │                                                                         │
//! │  checkout ──► logged in + non-empty + coupon still valid ──► summary    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::{AppState, CheckoutSummary, Session};
use vitrine_core::coupon::AppliedCoupon;
use vitrine_core::{
    CartItem, CartState, CartTotals, CoreError, CouponKind, NewCartItem, MAX_ITEM_QUANTITY,
};

/// Formatted amounts for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsLabels {
    pub subtotal: String,
    pub discount: String,
    pub total: String,
}

/// Cart response with items and calculated totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub coupon: Option<AppliedCoupon>,
    pub state: CartState,
    pub labels: TotalsLabels,
}

impl CartResponse {
    fn from_session(app: &AppState, session: &Session) -> Self {
        let cart = session.cart();
        let totals = cart.totals();
        let config = app.config();

        CartResponse {
            items: cart.snapshot().to_vec(),
            totals,
            coupon: cart.applied_coupon().cloned(),
            state: cart.state(),
            labels: TotalsLabels {
                subtotal: config.format_currency(totals.subtotal_cents),
                discount: config.format_currency(totals.discount_cents),
                total: config.format_currency(totals.total_cents),
            },
        }
    }
}

/// A product in a size, as the shopper picks it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: String,
    /// Size id or size name ("M", "gg").
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Outcome of a successful coupon application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub coupon: AppliedCoupon,
    pub message: String,
    pub cart: CartResponse,
}

pub fn get_cart(app: &AppState, session: &Session) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from_session(app, session)
}

/// Adds a product in a size to the cart.
///
/// The product must be listed and the size must have stock right now. Stock
/// is only checked here; nothing is reserved.
pub async fn add_to_cart(
    app: &AppState,
    session: &mut Session,
    request: AddToCart,
) -> ApiResult<CartResponse> {
    debug!(product_id = %request.product_id, size = %request.size, qty = request.quantity, "add_to_cart command");

    let product = app
        .db()
        .products()
        .get_by_id(&request.product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| CoreError::ProductNotFound(request.product_id.clone()))?;

    let wanted = request.size.trim();
    let stock = app.db().products().stock_for(&product.id).await?;
    let entry = stock
        .into_iter()
        .find(|s| s.size_id == wanted || s.size_name.eq_ignore_ascii_case(wanted))
        .filter(|s| s.is_available())
        .ok_or_else(|| CoreError::SizeUnavailable {
            product: product.name.clone(),
            size: wanted.to_string(),
        })?;

    let line = session
        .add_item(NewCartItem {
            product_id: product.id,
            product_name: product.name,
            unit_price_cents: product.price_cents,
            size_id: entry.size_id,
            size_name: entry.size_name,
            quantity: request.quantity,
        })
        .await?;

    info!(line_id = %line.line_id, quantity = line.quantity, "Added to cart");
    Ok(CartResponse::from_session(app, session))
}

/// Changes a line's quantity by `delta`; at zero the line is removed.
///
/// No single step moves more than MAX_ITEM_QUANTITY in either direction.
pub async fn update_cart_item(
    app: &AppState,
    session: &mut Session,
    line_id: &str,
    delta: i64,
) -> ApiResult<CartResponse> {
    let delta = delta.clamp(-MAX_ITEM_QUANTITY, MAX_ITEM_QUANTITY);
    debug!(line_id = %line_id, delta, "update_cart_item command");
    session.update_quantity(line_id, delta).await?;
    Ok(CartResponse::from_session(app, session))
}

pub async fn remove_from_cart(
    app: &AppState,
    session: &mut Session,
    line_id: &str,
) -> ApiResult<CartResponse> {
    debug!(line_id = %line_id, "remove_from_cart command");
    session.remove_item(line_id).await?;
    Ok(CartResponse::from_session(app, session))
}

/// Validates `code` and puts it in the coupon slot.
///
/// ## Returns
/// * `Ok(CouponResponse)` - with a message like "Coupon applied! 10% off"
/// * `Err(ApiError)` - `VALIDATION_ERROR`, `NOT_FOUND`, `MINIMUM_NOT_MET` or
///   `UPSTREAM_UNAVAILABLE`; the slot keeps what it had
pub async fn apply_coupon(
    app: &AppState,
    session: &mut Session,
    code: &str,
) -> ApiResult<CouponResponse> {
    apply_coupon_on(app, session, code, Utc::now().date_naive()).await
}

pub(crate) async fn apply_coupon_on(
    app: &AppState,
    session: &mut Session,
    code: &str,
    today: NaiveDate,
) -> ApiResult<CouponResponse> {
    debug!(code = %code, "apply_coupon command");

    let coupon = session.apply_coupon(code, today).await?;
    let amount = match coupon.kind {
        CouponKind::Percentage => coupon.describe(),
        CouponKind::Fixed => app.config().format_currency(coupon.value),
    };

    Ok(CouponResponse {
        message: format!("Coupon applied! {} off", amount),
        coupon,
        cart: CartResponse::from_session(app, session),
    })
}

pub fn remove_coupon(app: &AppState, session: &mut Session) -> CartResponse {
    debug!("remove_coupon command");
    session.remove_coupon();
    CartResponse::from_session(app, session)
}

/// What the order would cost, for a logged-in shopper.
pub async fn checkout(session: &Session) -> ApiResult<CheckoutSummary> {
    debug!("checkout command");
    session.checkout_summary(Utc::now().date_naive()).await
}
