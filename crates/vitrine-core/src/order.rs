//! # Orders
//!
//! A placed order is a frozen copy of a checkout: the lines, the totals and
//! the coupon code as they were when the shopper confirmed.
//!
//! ## Status Flow
//! ```text
//!   pending ──► paid ──► shipped ──► delivered
//!      │          │         │
//!      └──────────┴─────────┴──────► cancelled
//! ```
//!
//! The back office may set any status at any time; the flow above is how a
//! normal order moves, not a constraint.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Where an order stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Cancelled orders do not count towards sales.
    pub fn counts_as_sale(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Accepts the English names and the Portuguese ones the back office uses
/// (`pendente`, `pago`, `enviado`, `entregue`, `cancelado`).
impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Ok(OrderStatus::Pending),
            "paid" | "pago" => Ok(OrderStatus::Paid),
            "shipped" | "enviado" => Ok(OrderStatus::Shipped),
            "delivered" | "entregue" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" | "cancelado" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: "must be pending, paid, shipped, delivered or cancelled".to_string(),
            }),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub account_id: String,
    /// The account's name when the order was placed.
    pub customer_name: String,
    pub line_count: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// First eight characters of the id, as shown in order lists.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

/// One line of a placed order.
///
/// `product_id` goes to `None` if the product is later deleted; the name
/// and price stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub size_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Back-office dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderStats {
    pub order_count: usize,
    /// Orders still waiting on payment.
    pub pending: usize,
    /// Sales placed this calendar month (UTC), cancelled orders excluded.
    pub month_total_cents: i64,
    /// Orders placed today (UTC), cancelled orders excluded.
    pub today_count: usize,
}

/// Summarizes `orders` as of `now`.
pub fn order_stats(orders: &[Order], now: DateTime<Utc>) -> OrderStats {
    let today = now.date_naive();
    let mut stats = OrderStats {
        order_count: orders.len(),
        ..OrderStats::default()
    };

    for order in orders {
        if order.status == OrderStatus::Pending {
            stats.pending += 1;
        }
        if !order.status.counts_as_sale() {
            continue;
        }

        let placed = order.created_at.date_naive();
        if placed.year() == today.year() && placed.month() == today.month() {
            stats.month_total_cents = stats.month_total_cents.saturating_add(order.total_cents);
        }
        if placed == today {
            stats.today_count += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order(total_cents: i64, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: "0f3a9c2e-5d1b-4a8e-9f00-000000000001".to_string(),
            account_id: "acc-1".to_string(),
            customer_name: "Ana Souza".to_string(),
            line_count: 1,
            subtotal_cents: total_cents,
            discount_cents: 0,
            total_cents,
            coupon_code: None,
            status,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_status_parse_accepts_both_languages() {
        assert_eq!("pago".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!("cancelado".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Delivered.to_string(), "delivered");
    }

    #[test]
    fn test_stats_skip_cancelled_and_other_months() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        let earlier_today = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let this_month = Utc.with_ymd_and_hms(2026, 10, 2, 12, 0, 0).unwrap();
        let last_year = Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap();

        let orders = [
            order(10_000, OrderStatus::Pending, earlier_today),
            order(5_000, OrderStatus::Paid, this_month),
            order(7_000, OrderStatus::Cancelled, earlier_today),
            order(9_900, OrderStatus::Delivered, last_year),
        ];

        let stats = order_stats(&orders, now);
        assert_eq!(stats.order_count, 4);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.month_total_cents, 15_000);
        assert_eq!(stats.today_count, 1);
    }

    #[test]
    fn test_stats_of_nothing() {
        assert_eq!(order_stats(&[], Utc::now()), OrderStats::default());
    }

    #[test]
    fn test_short_id() {
        let placed = order(100, OrderStatus::Pending, Utc::now());
        assert_eq!(placed.short_id(), "0f3a9c2e");
        assert_eq!(placed.total(), Money::from_cents(100));
    }
}
