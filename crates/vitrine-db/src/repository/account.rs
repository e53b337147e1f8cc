//! # Account Repository
//!
//! Registration and credential lookup. Emails are stored lower-case so
//! `Ana@Example.com` and `ana@example.com` are the same account.
//!
//! Password hashing happens in the storefront; this repository only ever
//! sees the PHC hash string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::{Account, Role};

const ACCOUNT_COLUMNS: &str = "id, name, email, phone, role, active, created_at";

/// Input for [`AccountRepository::create`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// An account together with its password hash, for login only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountCredentials {
    #[sqlx(flatten)]
    pub account: Account,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Creates an account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the email is already registered
    pub async fn create(&self, new: &NewAccount) -> DbResult<Account> {
        let email = new.email.trim().to_lowercase();
        debug!(email = %email, role = ?new.role, "Creating account");

        let account = Account {
            id: generate_id(),
            name: new.name.trim().to_string(),
            email,
            phone: new.phone.clone(),
            role: new.role,
            active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO accounts (id, name, email, phone, password_hash, role, active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&new.password_hash)
        .bind(account.role)
        .bind(account.active)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &account.email),
            other => other,
        })?;

        Ok(account)
    }

    /// Account plus password hash, looked up by (case-insensitive) email.
    pub async fn find_credentials(&self, email: &str) -> DbResult<Option<AccountCredentials>> {
        let email = email.trim().to_lowercase();

        let row = sqlx::query_as::<_, AccountCredentials>(&format!(
            "SELECT {}, password_hash FROM accounts WHERE email = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        Ok(self.find_credentials(email).await?.map(|c| c.account))
    }

    /// Promotes or demotes an account.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<()> {
        debug!(id = %id, role = ?role, "Changing account role");

        let result = sqlx::query("UPDATE accounts SET role = ?2 WHERE id = ?1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }
        Ok(())
    }

    /// Deactivated accounts can no longer log in.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE accounts SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
