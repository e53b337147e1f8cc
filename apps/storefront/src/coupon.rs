//! # Coupon Validator
//!
//! Turns a shopper-entered code into an [`AppliedCoupon`], or says why not.
//!
//! The pure rules live in `vitrine_core::coupon`; this module adds the
//! lookup against the coupon store behind the [`CouponLookup`] seam.
//!
//! ## Order of Checks
//! ```text
//!   1. normalize, blank         → EmptyCode
//!   2. cart empty               → EmptyCart     (store never consulted)
//!   3. lookup fails             → Unavailable
//!   4. none / inactive / expired→ NotFound
//!   5. minimum > subtotal       → MinimumNotMet { minimum }
//!   6. ✓ AppliedCoupon
//! ```
//!
//! Validation never mutates anything. Installing the result in the cart's
//! coupon slot is the caller's job, and only happens on success.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use vitrine_core::coupon::{check_applicability, normalize_code, AppliedCoupon};
use vitrine_core::{Cart, Coupon, CouponError};
use vitrine_db::{CouponRepository, DbResult};

/// Read access to valid coupons by code.
#[async_trait]
pub trait CouponLookup: Send + Sync {
    /// The coupon named `code` if it is active and not expired on `today`.
    async fn find_valid(&self, code: &str, today: NaiveDate) -> DbResult<Option<Coupon>>;
}

#[async_trait]
impl CouponLookup for CouponRepository {
    async fn find_valid(&self, code: &str, today: NaiveDate) -> DbResult<Option<Coupon>> {
        CouponRepository::find_valid(self, code, today).await
    }
}

/// Validates coupon codes against a cart.
#[derive(Clone)]
pub struct CouponValidator {
    lookup: Arc<dyn CouponLookup>,
}

impl CouponValidator {
    pub fn new(lookup: Arc<dyn CouponLookup>) -> Self {
        CouponValidator { lookup }
    }

    /// Checks `raw_code` against `cart` as of `today`.
    pub async fn validate(
        &self,
        raw_code: &str,
        cart: &Cart,
        today: NaiveDate,
    ) -> Result<AppliedCoupon, CouponError> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        if cart.is_empty() {
            return Err(CouponError::EmptyCart);
        }

        let coupon = self.lookup.find_valid(&code, today).await.map_err(|e| {
            warn!(code = %code, error = %e, "Coupon lookup failed");
            CouponError::Unavailable
        })?;

        let subtotal = cart.subtotal();
        let result = check_applicability(coupon.as_ref(), subtotal, today);
        debug!(code = %code, subtotal = %subtotal, accepted = result.is_ok(), "Coupon validated");
        result
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::sync::RwLock;
    use vitrine_core::{CouponKind, Money, NewCartItem};
    use vitrine_db::DbError;

    /// In-memory coupon store that can be switched into a failing state.
    #[derive(Default)]
    pub(crate) struct MemoryCoupons {
        coupons: RwLock<Vec<Coupon>>,
        fail: RwLock<bool>,
        lookups: RwLock<usize>,
    }

    impl MemoryCoupons {
        pub(crate) async fn insert(&self, code: &str, kind: CouponKind, value: i64, minimum: i64) {
            self.coupons.write().await.push(Coupon {
                id: format!("c-{}", code),
                code: code.to_string(),
                kind,
                value,
                minimum_spend_cents: minimum,
                expires_on: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
                active: true,
                created_at: Utc::now(),
            });
        }

        pub(crate) async fn set_fail(&self, fail: bool) {
            *self.fail.write().await = fail;
        }

        pub(crate) async fn lookups(&self) -> usize {
            *self.lookups.read().await
        }
    }

    #[async_trait]
    impl CouponLookup for MemoryCoupons {
        async fn find_valid(&self, code: &str, today: NaiveDate) -> DbResult<Option<Coupon>> {
            *self.lookups.write().await += 1;
            if *self.fail.read().await {
                return Err(DbError::ConnectionFailed("coupon store offline".to_string()));
            }
            Ok(self
                .coupons
                .read()
                .await
                .iter()
                .find(|c| c.code == code && c.is_valid_on(today))
                .cloned())
        }
    }

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn cart_with(price_cents: i64, quantity: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add_item(NewCartItem {
            product_id: "p-1".to_string(),
            product_name: "Vestido".to_string(),
            unit_price_cents: price_cents,
            size_id: "s-m".to_string(),
            size_name: "M".to_string(),
            quantity,
        })
        .unwrap();
        cart
    }

    async fn validator() -> (Arc<MemoryCoupons>, CouponValidator) {
        let store = Arc::new(MemoryCoupons::default());
        store.insert("PROMO10", CouponKind::Percentage, 1_000, 0).await;
        store.insert("FIFTY", CouponKind::Fixed, 5_000, 20_000).await;
        let validator = CouponValidator::new(store.clone());
        (store, validator)
    }

    #[tokio::test]
    async fn test_code_is_normalized() {
        let (_, validator) = validator().await;
        let applied = validator
            .validate("  promo10 ", &cart_with(10_000, 1), today())
            .await
            .unwrap();
        assert_eq!(applied.code, "PROMO10");
        assert_eq!(applied.discount_for(Money::from_cents(10_000)), Money::from_cents(1_000));
    }

    #[tokio::test]
    async fn test_blank_code() {
        let (store, validator) = validator().await;
        let err = validator
            .validate("   ", &cart_with(10_000, 1), today())
            .await
            .unwrap_err();
        assert_eq!(err, CouponError::EmptyCode);
        assert_eq!(store.lookups().await, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_checked_before_lookup() {
        let (store, validator) = validator().await;
        let err = validator.validate("PROMO10", &Cart::new(), today()).await.unwrap_err();
        assert_eq!(err, CouponError::EmptyCart);
        assert_eq!(store.lookups().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let (_, validator) = validator().await;
        let err = validator
            .validate("NOPE", &cart_with(10_000, 1), today())
            .await
            .unwrap_err();
        assert_eq!(err, CouponError::NotFound);
    }

    #[tokio::test]
    async fn test_minimum_spend() {
        let (_, validator) = validator().await;

        let err = validator
            .validate("FIFTY", &cart_with(19_999, 1), today())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CouponError::MinimumNotMet {
                minimum: Money::from_cents(20_000)
            }
        );

        // Exactly the minimum is enough
        assert!(validator
            .validate("FIFTY", &cart_with(10_000, 2), today())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let (store, validator) = validator().await;
        store.set_fail(true).await;
        let err = validator
            .validate("PROMO10", &cart_with(10_000, 1), today())
            .await
            .unwrap_err();
        assert_eq!(err, CouponError::Unavailable);
    }
}
