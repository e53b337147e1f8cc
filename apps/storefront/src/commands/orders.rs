//! # Order Commands
//!
//! Placing an order from the current cart, the shopper's order history, and
//! the back office's order list, status changes and dashboard.
//!
//! ```text
//!   place_order ──► checkout_summary (login, lines, coupon re-checked)
//!                        │
//!                        ▼
//!                   orders + order_items written ──► cart cleared
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::account::me;
use crate::commands::admin::require_admin;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Session};
use vitrine_core::order::order_stats;
use vitrine_core::{Order, OrderItem, OrderStats, OrderStatus};
use vitrine_db::NewOrder;

/// Orders shown on the dashboard.
const RECENT_ORDERS: usize = 5;

/// An order with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_label: String,
}

/// Back-office overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub product_count: i64,
    #[serde(flatten)]
    pub stats: OrderStats,
    pub month_total_label: String,
    pub recent: Vec<Order>,
}

async fn detail(app: &AppState, order: Order) -> ApiResult<OrderDetail> {
    let items = app.db().orders().items(&order.id).await?;
    Ok(OrderDetail {
        total_label: app.config().format_currency(order.total_cents),
        order,
        items,
    })
}

/// Turns the cart into an order and empties the cart.
///
/// Fails exactly where the checkout summary fails: guest session, empty
/// cart, or an applied coupon that no longer holds.
pub async fn place_order(app: &AppState, session: &mut Session) -> ApiResult<OrderDetail> {
    place_order_on(app, session, Utc::now().date_naive()).await
}

pub(crate) async fn place_order_on(
    app: &AppState,
    session: &mut Session,
    today: NaiveDate,
) -> ApiResult<OrderDetail> {
    debug!("place_order command");

    let summary = session.checkout_summary(today).await?;
    let account = me(app, session).await?;

    let order = app
        .db()
        .orders()
        .create(NewOrder {
            account_id: &account.id,
            customer_name: &account.name,
            items: session.cart().snapshot(),
            totals: &summary.totals,
            coupon_code: summary.coupon_code.as_deref(),
        })
        .await?;

    // The order stands even if the cart cannot be emptied
    if let Err(e) = session.clear_cart().await {
        warn!(order_id = %order.id, error = %e, "Order placed but cart not cleared");
    }

    detail(app, order).await
}

/// The logged-in shopper's orders, newest first.
pub async fn my_orders(app: &AppState, session: &Session) -> ApiResult<Vec<Order>> {
    let account = me(app, session).await?;
    Ok(app.db().orders().list_for_account(&account.id).await?)
}

/// One order with its lines. Shoppers only see their own orders.
pub async fn get_order(app: &AppState, session: &Session, id: &str) -> ApiResult<OrderDetail> {
    let account = me(app, session).await?;
    let order = app
        .db()
        .orders()
        .get(id)
        .await?
        .filter(|o| o.account_id == account.id || account.is_admin())
        .ok_or_else(|| ApiError::not_found("Order", id))?;

    detail(app, order).await
}

// =============================================================================
// Back office
// =============================================================================

/// Every order, newest first.
pub async fn list_orders(app: &AppState, session: &Session) -> ApiResult<Vec<Order>> {
    require_admin(app, session).await?;
    Ok(app.db().orders().list().await?)
}

pub async fn update_order_status(
    app: &AppState,
    session: &Session,
    id: &str,
    status: OrderStatus,
) -> ApiResult<Order> {
    let admin = require_admin(app, session).await?;
    let order = app.db().orders().update_status(id, status).await?;
    info!(admin = %admin.id, order_id = %order.id, status = %status, "Order status changed");
    Ok(order)
}

pub async fn dashboard(app: &AppState, session: &Session) -> ApiResult<Dashboard> {
    require_admin(app, session).await?;

    let orders = app.db().orders().list().await?;
    let stats = order_stats(&orders, Utc::now());

    Ok(Dashboard {
        product_count: app.db().products().count().await?,
        month_total_label: app.config().format_currency(stats.month_total_cents),
        stats,
        recent: orders.into_iter().take(RECENT_ORDERS).collect(),
    })
}
