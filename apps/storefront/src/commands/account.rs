//! # Account Commands
//!
//! Registration, login and logout for the current session.
//!
//! Logging in swaps the session onto the account's stored cart; whatever
//! the guest had in their cart stays in the guest file and is not carried
//! over.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{hash_password, verify_password, AuthError};
use crate::error::ApiResult;
use crate::state::{AppState, Session};
use vitrine_core::validation::{validate_email, validate_name, validate_password};
use vitrine_core::{Account, Role};
use vitrine_db::NewAccount;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub account: Account,
    pub token: String,
    /// Lines in the account's stored cart.
    pub cart_lines: usize,
}

/// Creates a customer account and logs the session into it.
///
/// ## Returns
/// * `Err(VALIDATION_ERROR)` - bad name, email or password
/// * `Err(CONFLICT)` - email already registered
pub async fn register(
    app: &AppState,
    session: &mut Session,
    request: RegisterRequest,
) -> ApiResult<AuthResponse> {
    debug!(email = %request.email, "register command");

    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let password_hash = hash_password(&request.password)?;
    let account = app
        .db()
        .accounts()
        .create(&NewAccount {
            name: request.name,
            email: request.email,
            phone: request.phone.filter(|p| !p.trim().is_empty()),
            password_hash,
            role: Role::Customer,
        })
        .await?;

    info!(account_id = %account.id, "Account registered");
    start_session(app, session, account).await
}

/// Logs the session into an existing account.
///
/// Unknown email and wrong password give the same error.
pub async fn login(
    app: &AppState,
    session: &mut Session,
    email: &str,
    password: &str,
) -> ApiResult<AuthResponse> {
    debug!(email = %email, "login command");

    let credentials = app
        .db()
        .accounts()
        .find_credentials(email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &credentials.password_hash) {
        warn!(email = %email, "Login refused");
        return Err(AuthError::InvalidCredentials.into());
    }
    if !credentials.account.active {
        return Err(AuthError::AccountDisabled.into());
    }

    start_session(app, session, credentials.account).await
}

async fn start_session(
    app: &AppState,
    session: &mut Session,
    account: Account,
) -> ApiResult<AuthResponse> {
    let token = app.jwt().issue(&account)?;
    let backend = app.remote_cart(&account.id);
    session
        .login(account.clone(), token.clone(), Box::new(backend))
        .await?;

    Ok(AuthResponse {
        account,
        token,
        cart_lines: session.cart().item_count(),
    })
}

/// Resolves a session token to its account.
///
/// The token must verify and the account must still exist and be active.
pub async fn authenticate(app: &AppState, token: &str) -> ApiResult<Account> {
    let claims = app.jwt().validate(token)?;
    let account = app
        .db()
        .accounts()
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AuthError::InvalidToken("account no longer exists".to_string()))?;

    if !account.active {
        return Err(AuthError::AccountDisabled.into());
    }
    Ok(account)
}

/// The logged-in account, re-checked against its token.
pub async fn me(app: &AppState, session: &Session) -> ApiResult<Account> {
    let token = session.token().ok_or(AuthError::LoginRequired)?;
    authenticate(app, token).await
}

pub fn logout(session: &mut Session) {
    debug!("logout command");
    session.logout();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, AddToCart};
    use crate::commands::catalog::{list_products, ProductQuery};
    use crate::commands::testing::seeded_app;
    use crate::error::ErrorCode;
    use crate::state::BackendKind;

    fn ana() -> RegisterRequest {
        RegisterRequest {
            name: "Ana Souza".to_string(),
            email: "Ana@Example.com".to_string(),
            password: "s3nha-forte".to_string(),
            phone: None,
        }
    }

    async fn add_any(app: &AppState, session: &mut Session) {
        for p in list_products(app, ProductQuery::default()).await.unwrap() {
            let stock = app.db().products().stock_for(&p.product.id).await.unwrap();
            if let Some(s) = stock.iter().find(|s| s.is_available()) {
                add_to_cart(
                    app,
                    session,
                    AddToCart {
                        product_id: p.product.id.clone(),
                        size: s.size_id.clone(),
                        quantity: 1,
                    },
                )
                .await
                .unwrap();
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_register_logs_in() {
        let (_dir, app) = seeded_app().await;
        let mut session = app.guest_session().await.unwrap();

        let response = register(&app, &mut session, ana()).await.unwrap();
        assert_eq!(response.account.email, "ana@example.com");
        assert_eq!(response.account.role, Role::Customer);
        assert_eq!(session.backend_kind(), BackendKind::Remote);
        assert_eq!(me(&app, &session).await.unwrap().id, response.account.id);

        let err = register(&app, &mut session, ana()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (_dir, app) = seeded_app().await;
        let mut session = app.guest_session().await.unwrap();

        let mut bad = ana();
        bad.email = "not-an-email".to_string();
        let err = register(&app, &mut session, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(session.account().is_none());
    }

    #[tokio::test]
    async fn test_login_keeps_account_cart_and_drops_guest_lines() {
        let (_dir, app) = seeded_app().await;
        let mut session = app.guest_session().await.unwrap();

        register(&app, &mut session, ana()).await.unwrap();
        add_any(&app, &mut session).await;
        logout(&mut session);
        assert!(session.cart().is_empty());

        // Guest shops, then logs in: the account's line comes back instead
        add_any(&app, &mut session).await;
        add_any(&app, &mut session).await;
        let response = login(&app, &mut session, "ana@example.com", "s3nha-forte")
            .await
            .unwrap();
        assert_eq!(response.cart_lines, 1);
        assert_eq!(session.cart().snapshot()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_login_refusals() {
        let (_dir, app) = seeded_app().await;
        let mut session = app.guest_session().await.unwrap();
        let account = register(&app, &mut session, ana()).await.unwrap().account;
        logout(&mut session);

        let err = login(&app, &mut session, "ana@example.com", "wrong-pass")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        let err = login(&app, &mut session, "nobody@example.com", "s3nha-forte")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        app.db().accounts().set_active(&account.id, false).await.unwrap();
        let err = login(&app, &mut session, "ana@example.com", "s3nha-forte")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert!(session.account().is_none());
    }

    #[tokio::test]
    async fn test_me_requires_login() {
        let (_dir, app) = seeded_app().await;
        let session = app.guest_session().await.unwrap();
        let err = me(&app, &session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = authenticate(&app, "garbage").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
