//! # Back-office Commands
//!
//! Coupon, category, size, product and stock management. Every command
//! first checks that the session belongs to an active administrator; the
//! role is re-read from the store so a demotion takes effect immediately.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{hash_password, AuthError};
use crate::commands::account::authenticate;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Session};
use vitrine_core::validation::{
    validate_coupon_draft, validate_email, validate_label, validate_password,
    validate_product_draft, validate_stock_quantity,
};
use vitrine_core::{
    Account, Category, Coupon, CouponDraft, Product, ProductDraft, Role, Size, StockEntry,
};
use vitrine_db::NewAccount;

/// One size's stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub size_id: String,
    pub quantity: i64,
}

/// The session's account, if it is an active administrator.
pub async fn require_admin(app: &AppState, session: &Session) -> ApiResult<Account> {
    let token = session.token().ok_or(AuthError::LoginRequired)?;
    let account = authenticate(app, token).await?;
    if !account.is_admin() {
        warn!(account_id = %account.id, "Back-office access refused");
        return Err(AuthError::AdminOnly.into());
    }
    Ok(account)
}

// =============================================================================
// Coupons
// =============================================================================

pub async fn list_coupons(app: &AppState, session: &Session) -> ApiResult<Vec<Coupon>> {
    require_admin(app, session).await?;
    Ok(app.db().coupons().list().await?)
}

/// Creates a coupon. The code is stored upper-case and must be unique.
pub async fn create_coupon(
    app: &AppState,
    session: &Session,
    draft: CouponDraft,
) -> ApiResult<Coupon> {
    let admin = require_admin(app, session).await?;
    validate_coupon_draft(&draft)?;

    let coupon = app.db().coupons().create(&draft).await?;
    info!(admin = %admin.id, code = %coupon.code, "Coupon created");
    Ok(coupon)
}

/// Replaces a coupon's fields. Carts that already applied it are unaffected.
pub async fn update_coupon(
    app: &AppState,
    session: &Session,
    id: &str,
    draft: CouponDraft,
) -> ApiResult<Coupon> {
    let admin = require_admin(app, session).await?;
    validate_coupon_draft(&draft)?;

    let coupon = app.db().coupons().update(id, &draft).await?;
    info!(admin = %admin.id, code = %coupon.code, "Coupon updated");
    Ok(coupon)
}

pub async fn delete_coupon(app: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let admin = require_admin(app, session).await?;
    app.db().coupons().delete(id).await?;
    info!(admin = %admin.id, id = %id, "Coupon deleted");
    Ok(())
}

// =============================================================================
// Categories and sizes
// =============================================================================

pub async fn create_category(app: &AppState, session: &Session, name: &str) -> ApiResult<Category> {
    require_admin(app, session).await?;
    validate_label("category", name)?;
    Ok(app.db().catalog().create_category(name.trim()).await?)
}

/// Deletes a category; its products stay listed without a category.
pub async fn delete_category(app: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    require_admin(app, session).await?;
    app.db().catalog().delete_category(id).await?;
    Ok(())
}

pub async fn create_size(
    app: &AppState,
    session: &Session,
    name: &str,
    sort_order: i64,
) -> ApiResult<Size> {
    require_admin(app, session).await?;
    validate_label("size", name)?;
    Ok(app.db().catalog().create_size(name.trim(), sort_order).await?)
}

// =============================================================================
// Products and stock
// =============================================================================

pub async fn create_product(
    app: &AppState,
    session: &Session,
    draft: ProductDraft,
) -> ApiResult<Product> {
    let admin = require_admin(app, session).await?;
    validate_product_draft(&draft)?;

    let product = app.db().products().create(&draft).await?;
    info!(admin = %admin.id, product_id = %product.id, "Product created");
    Ok(product)
}

/// Replaces a product's fields. Lines already in carts keep their price.
pub async fn update_product(
    app: &AppState,
    session: &Session,
    id: &str,
    draft: ProductDraft,
) -> ApiResult<Product> {
    require_admin(app, session).await?;
    validate_product_draft(&draft)?;
    Ok(app.db().products().update(id, &draft).await?)
}

/// Hides a product from listings without deleting it.
pub async fn deactivate_product(app: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    require_admin(app, session).await?;
    app.db().products().deactivate(id).await?;
    Ok(())
}

/// Deletes a product with its stock and every cart line holding it.
pub async fn delete_product(app: &AppState, session: &Session, id: &str) -> ApiResult<()> {
    let admin = require_admin(app, session).await?;
    app.db().products().delete(id).await?;
    info!(admin = %admin.id, product_id = %id, "Product deleted");
    Ok(())
}

/// Sets absolute stock levels; all or nothing.
pub async fn set_stock(
    app: &AppState,
    session: &Session,
    product_id: &str,
    levels: Vec<StockLevel>,
) -> ApiResult<Vec<StockEntry>> {
    require_admin(app, session).await?;
    if levels.is_empty() {
        return Err(ApiError::validation("No stock levels given"));
    }
    for level in &levels {
        validate_stock_quantity(level.quantity)?;
    }

    let products = app.db().products();
    if products.get_by_id(product_id).await?.is_none() {
        return Err(ApiError::not_found("Product", product_id));
    }

    let levels: Vec<(String, i64)> = levels.into_iter().map(|l| (l.size_id, l.quantity)).collect();
    products.set_stock(product_id, &levels).await?;
    Ok(products.stock_for(product_id).await?)
}

/// Stops offering a size for a product.
pub async fn delete_stock(
    app: &AppState,
    session: &Session,
    product_id: &str,
    size_id: &str,
) -> ApiResult<()> {
    require_admin(app, session).await?;
    app.db().products().delete_stock(product_id, size_id).await?;
    Ok(())
}

// =============================================================================
// Startup
// =============================================================================

/// Makes sure the configured back-office account exists and is an admin.
///
/// Does nothing when no admin email is configured. An existing account
/// with that email is promoted; its password is left alone.
pub async fn bootstrap_admin(app: &AppState) -> ApiResult<Option<Account>> {
    let config = app.config();
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(None);
    };

    let accounts = app.db().accounts();
    if let Some(existing) = accounts.get_by_email(email).await? {
        if !existing.is_admin() {
            accounts.set_role(&existing.id, Role::Admin).await?;
            info!(account_id = %existing.id, "Promoted configured account to admin");
        }
        return Ok(accounts.get_by_id(&existing.id).await?);
    }

    validate_email(email)?;
    validate_password(password)?;
    debug!(email = %email, "Creating configured admin account");

    let account = accounts
        .create(&NewAccount {
            name: "Administrator".to_string(),
            email: email.clone(),
            phone: None,
            password_hash: hash_password(password)?,
            role: Role::Admin,
        })
        .await?;

    info!(account_id = %account.id, "Admin account created");
    Ok(Some(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::commands::account::{register, RegisterRequest};
    use crate::commands::catalog::{get_product, list_products, ProductQuery};
    use crate::commands::testing::{admin_app, admin_session};
    use crate::error::ErrorCode;
    use vitrine_core::CouponKind;

    fn coupon(code: &str) -> CouponDraft {
        CouponDraft {
            code: code.to_string(),
            kind: CouponKind::Percentage,
            value: 2_000,
            minimum_spend_cents: 0,
            expires_on: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let (_dir, app) = admin_app().await;
        let again = bootstrap_admin(&app).await.unwrap().unwrap();
        assert_eq!(again.role, Role::Admin);
        assert_eq!(app.db().accounts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_customers_and_guests_are_refused() {
        let (_dir, app) = admin_app().await;
        let mut session = app.guest_session().await.unwrap();

        let err = list_coupons(&app, &session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        register(
            &app,
            &mut session,
            RegisterRequest {
                name: "Bia".to_string(),
                email: "bia@example.com".to_string(),
                password: "bia-pass-123".to_string(),
                phone: None,
            },
        )
        .await
        .unwrap();
        let err = create_coupon(&app, &session, coupon("HACK")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_demoted_admin_loses_access() {
        let (_dir, app) = admin_app().await;
        let session = admin_session(&app).await;
        let admin = require_admin(&app, &session).await.unwrap();

        app.db().accounts().set_role(&admin.id, Role::Customer).await.unwrap();
        let err = list_coupons(&app, &session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_coupon_management() {
        let (_dir, app) = admin_app().await;
        let session = admin_session(&app).await;

        let created = create_coupon(&app, &session, coupon("natal20")).await.unwrap();
        assert_eq!(created.code, "NATAL20");

        let err = create_coupon(&app, &session, coupon("NATAL20")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        let mut bad = coupon("ZERO");
        bad.value = 0;
        let err = create_coupon(&app, &session, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut changed = coupon("NATAL20");
        changed.kind = CouponKind::Fixed;
        changed.value = 3_000;
        let updated = update_coupon(&app, &session, &created.id, changed).await.unwrap();
        assert_eq!(updated.kind, CouponKind::Fixed);

        delete_coupon(&app, &session, &created.id).await.unwrap();
        let err = delete_coupon(&app, &session, &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(list_coupons(&app, &session).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_product_and_stock_management() {
        let (_dir, app) = admin_app().await;
        let session = admin_session(&app).await;

        let category = create_category(&app, &session, "Moda Praia").await.unwrap();
        assert_eq!(category.slug, "moda-praia");
        let size = create_size(&app, &session, "XG", 6).await.unwrap();

        let err = create_product(
            &app,
            &session,
            ProductDraft {
                name: "Vestido de Ouro".to_string(),
                price_cents: i64::MAX,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let product = create_product(
            &app,
            &session,
            ProductDraft {
                category_id: Some(category.id.clone()),
                name: "Biquíni Listrado".to_string(),
                price_cents: 8_990,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stock = set_stock(
            &app,
            &session,
            &product.id,
            vec![StockLevel {
                size_id: size.id.clone(),
                quantity: 4,
            }],
        )
        .await
        .unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].quantity, 4);

        let err = set_stock(
            &app,
            &session,
            &product.id,
            vec![StockLevel {
                size_id: size.id.clone(),
                quantity: -1,
            }],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let detail = get_product(&app, &product.id).await.unwrap();
        assert!(detail.sizes[0].available);

        delete_stock(&app, &session, &product.id, &size.id).await.unwrap();
        assert!(get_product(&app, &product.id).await.unwrap().sizes.is_empty());

        delete_category(&app, &session, &category.id).await.unwrap();
        let orphan = app.db().products().get_by_id(&product.id).await.unwrap().unwrap();
        assert!(orphan.category_id.is_none());

        deactivate_product(&app, &session, &product.id).await.unwrap();
        let listed = list_products(&app, ProductQuery::default()).await.unwrap();
        assert!(listed.iter().all(|p| p.product.id != product.id));

        delete_product(&app, &session, &product.id).await.unwrap();
        let err = delete_product(&app, &session, &product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
