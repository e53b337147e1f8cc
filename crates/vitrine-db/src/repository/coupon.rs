//! # Coupon Repository
//!
//! Coupon lookup for the storefront and CRUD for the back office.
//!
//! Codes are stored upper-case and looked up upper-case, so `promo10`,
//! `PROMO10` and ` Promo10 ` all name the same coupon.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::coupon::normalize_code;
use vitrine_core::{Coupon, CouponDraft};

const COUPON_COLUMNS: &str =
    "id, code, kind, value, minimum_spend_cents, expires_on, active, created_at";

#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Finds a coupon by code regardless of state.
    ///
    /// Active/expiry rules are applied by the caller, which lets the
    /// back office see expired codes too.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let code = normalize_code(code);
        debug!(code = %code, "Looking up coupon");

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons WHERE code = ?1",
            COUPON_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Finds a coupon by code that is active and not expired on `today`.
    pub async fn find_valid(&self, code: &str, today: NaiveDate) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons WHERE code = ?1 AND active = 1 AND expires_on >= ?2",
            COUPON_COLUMNS
        ))
        .bind(normalize_code(code))
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Every coupon, newest first.
    pub async fn list(&self) -> DbResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC, code",
            COUPON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    pub async fn create(&self, draft: &CouponDraft) -> DbResult<Coupon> {
        let coupon = Coupon {
            id: generate_id(),
            code: normalize_code(&draft.code),
            kind: draft.kind,
            value: draft.value,
            minimum_spend_cents: draft.minimum_spend_cents,
            expires_on: draft.expires_on,
            active: draft.active,
            created_at: Utc::now(),
        };

        debug!(code = %coupon.code, kind = ?coupon.kind, "Creating coupon");

        sqlx::query(&format!(
            "INSERT INTO coupons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            COUPON_COLUMNS
        ))
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.kind)
        .bind(coupon.value)
        .bind(coupon.minimum_spend_cents)
        .bind(coupon.expires_on)
        .bind(coupon.active)
        .bind(coupon.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &coupon.code),
            other => other,
        })?;

        Ok(coupon)
    }

    /// Replaces every editable field of a coupon.
    ///
    /// Carts that already applied the coupon keep their snapshot.
    pub async fn update(&self, id: &str, draft: &CouponDraft) -> DbResult<Coupon> {
        let code = normalize_code(&draft.code);
        debug!(id = %id, code = %code, "Updating coupon");

        let result = sqlx::query(
            "UPDATE coupons SET code = ?2, kind = ?3, value = ?4, minimum_spend_cents = ?5, \
                expires_on = ?6, active = ?7 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&code)
        .bind(draft.kind)
        .bind(draft.value)
        .bind(draft.minimum_spend_cents)
        .bind(draft.expires_on)
        .bind(draft.active)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &code),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        self.find_by_code(&code)
            .await?
            .ok_or_else(|| DbError::not_found("Coupon", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }
        Ok(())
    }
}
