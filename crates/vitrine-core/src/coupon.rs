//! # Coupon Rules
//!
//! The pure half of coupon validation: code normalization, the
//! applicability check, and the discount a coupon grants on a subtotal.
//!
//! Looking the code up is I/O and lives in the storefront; everything that
//! decides *whether* the found coupon applies lives here.
//!
//! ## Validation Order
//! ```text
//!   raw code ──► normalize_code ──► "" ? ──────────────► EmptyCode
//!                     │
//!                     ▼
//!               lookup (storefront) ──► none / inactive / expired ─► NotFound
//!                     │
//!                     ▼
//!               minimum > subtotal ? ────────────────────► MinimumNotMet
//!                     │
//!                     ▼
//!               AppliedCoupon ✓
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponError;
use crate::money::Money;
use crate::types::{Coupon, CouponKind, Percentage};

/// The coupon slot's content: a snapshot of the coupon taken when it was
/// validated.
///
/// Later edits to the stored coupon do not reach an already applied one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedCoupon {
    pub code: String,
    pub kind: CouponKind,
    /// Basis points when `kind` is percentage, cents when fixed.
    pub value: i64,
    pub minimum_spend_cents: i64,
}

impl AppliedCoupon {
    /// Discount granted on `subtotal`.
    ///
    /// - Percentage: `subtotal × value`, rounded half-up to the cent
    /// - Fixed: `value` as is, even when it exceeds the subtotal
    ///
    /// A fixed discount larger than the subtotal is reported in full; only
    /// the payable total is floored at zero.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        match self.kind {
            CouponKind::Percentage => {
                let bps = u32::try_from(self.value.max(0)).unwrap_or(u32::MAX);
                subtotal.percentage_of(Percentage::from_bps(bps))
            }
            CouponKind::Fixed => Money::from_cents(self.value),
        }
    }

    pub fn minimum_spend(&self) -> Money {
        Money::from_cents(self.minimum_spend_cents)
    }

    /// Human label: "10%" or "50.00".
    pub fn describe(&self) -> String {
        match self.kind {
            CouponKind::Percentage => {
                let bps = u32::try_from(self.value.max(0)).unwrap_or(u32::MAX);
                Percentage::from_bps(bps).to_string()
            }
            CouponKind::Fixed => Money::from_cents(self.value).to_string(),
        }
    }
}

impl From<&Coupon> for AppliedCoupon {
    fn from(coupon: &Coupon) -> Self {
        AppliedCoupon {
            code: coupon.code.clone(),
            kind: coupon.kind,
            value: coupon.value,
            minimum_spend_cents: coupon.minimum_spend_cents,
        }
    }
}

/// Trims and upper-cases a shopper-entered code.
///
/// ```rust
/// use vitrine_core::coupon::normalize_code;
///
/// assert_eq!(normalize_code("  promo10 "), "PROMO10");
/// ```
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Decides whether a looked-up coupon applies to a cart with `subtotal`.
///
/// `coupon` is whatever the store returned for the normalized code; `None`
/// means no such code. Inactive and expired coupons are refused here too so
/// callers can pass a raw lookup result.
pub fn check_applicability(
    coupon: Option<&Coupon>,
    subtotal: Money,
    today: NaiveDate,
) -> Result<AppliedCoupon, CouponError> {
    let coupon = match coupon {
        Some(c) if c.is_valid_on(today) => c,
        _ => return Err(CouponError::NotFound),
    };

    // Equal to the minimum is enough
    if coupon.minimum_spend() > subtotal {
        return Err(CouponError::MinimumNotMet {
            minimum: coupon.minimum_spend(),
        });
    }

    Ok(AppliedCoupon::from(coupon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn coupon(kind: CouponKind, value: i64, minimum: i64, expires_on: NaiveDate) -> Coupon {
        Coupon {
            id: "c-1".to_string(),
            code: "PROMO".to_string(),
            kind,
            value,
            minimum_spend_cents: minimum,
            expires_on,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("promo10"), "PROMO10");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(CouponKind::Percentage, 1000, 0, day(2030, 1, 1));
        let applied = AppliedCoupon::from(&c);
        assert_eq!(applied.discount_for(Money::from_cents(20_000)).cents(), 2_000);
        assert_eq!(applied.describe(), "10%");
    }

    #[test]
    fn test_fixed_discount_is_not_clamped() {
        let c = coupon(CouponKind::Fixed, 5_000, 0, day(2030, 1, 1));
        let applied = AppliedCoupon::from(&c);
        assert_eq!(applied.discount_for(Money::from_cents(1_500)).cents(), 5_000);
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let today = day(2026, 3, 10);
        let c = coupon(CouponKind::Fixed, 500, 0, today);
        assert!(check_applicability(Some(&c), Money::from_cents(1000), today).is_ok());

        let tomorrow = day(2026, 3, 11);
        assert_eq!(
            check_applicability(Some(&c), Money::from_cents(1000), tomorrow),
            Err(CouponError::NotFound)
        );
    }

    #[test]
    fn test_inactive_and_missing_are_not_found() {
        let today = day(2026, 3, 10);
        let mut c = coupon(CouponKind::Fixed, 500, 0, day(2030, 1, 1));
        c.active = false;

        assert_eq!(
            check_applicability(Some(&c), Money::from_cents(1000), today),
            Err(CouponError::NotFound)
        );
        assert_eq!(
            check_applicability(None, Money::from_cents(1000), today),
            Err(CouponError::NotFound)
        );
    }

    #[test]
    fn test_minimum_spend_boundary() {
        let today = day(2026, 3, 10);
        let c = coupon(CouponKind::Percentage, 1000, 10_000, day(2030, 1, 1));

        let err = check_applicability(Some(&c), Money::from_cents(9_999), today).unwrap_err();
        assert_eq!(
            err,
            CouponError::MinimumNotMet {
                minimum: Money::from_cents(10_000)
            }
        );
        assert!(check_applicability(Some(&c), Money::from_cents(10_000), today).is_ok());
    }
}
