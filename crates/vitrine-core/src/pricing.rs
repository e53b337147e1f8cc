//! # Pricing
//!
//! Derives subtotal, discount and total from the cart lines and the applied
//! coupon. Stateless: totals are recomputed on every read and never stored.
//!
//! ```text
//!   subtotal = Σ unit_price × quantity
//!   discount = subtotal × pct        (percentage, rounded half-up)
//!            | value                 (fixed, not clamped)
//!            | 0                     (no coupon)
//!   total    = max(0, subtotal − discount)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartItem;
use crate::coupon::AppliedCoupon;
use crate::money::Money;

/// Computed totals for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Distinct lines.
    pub item_count: usize,
    /// Sum of line quantities.
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// Never negative.
    pub total_cents: i64,
}

impl CartTotals {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Computes the totals for `items` under `applied`.
pub fn compute_totals(items: &[CartItem], applied: Option<&AppliedCoupon>) -> CartTotals {
    let subtotal: Money = items.iter().map(CartItem::line_total).sum();
    let total_quantity = items
        .iter()
        .fold(0i64, |acc, i| acc.saturating_add(i.quantity));

    let discount = applied
        .map(|coupon| coupon.discount_for(subtotal))
        .unwrap_or_default();
    let total = subtotal.saturating_sub_floor(discount);

    CartTotals {
        item_count: items.len(),
        total_quantity,
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        total_cents: total.cents(),
    }
}
