//! # Cart Repository
//!
//! Server-side cart lines for authenticated accounts.
//!
//! ## Line Identity
//! ```text
//!   (account_id, product_id, size_id) ──UNIQUE──► one row
//!
//!   upsert_line(acc, p1, M, 3)   INSERT   → row id R1, qty 3
//!   upsert_line(acc, p1, M, 5)   CONFLICT → row id R1, qty 5   (absolute)
//! ```
//!
//! Every statement is scoped by `account_id`, so one account can never read
//! or delete another account's lines even with a guessed line id.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::CartLine;

const LINE_SELECT: &str = "SELECT c.id, c.account_id, c.product_id, p.name AS product_name, \
        p.price_cents AS unit_price_cents, c.size_id, s.name AS size_name, c.quantity \
     FROM cart_lines c \
     INNER JOIN products p ON p.id = c.product_id \
     INNER JOIN sizes s ON s.id = c.size_id";

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// An account's lines in the order they were first added.
    pub async fn list_lines(&self, account_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(&format!(
            "{} WHERE c.account_id = ?1 ORDER BY c.created_at, c.rowid",
            LINE_SELECT
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Writes the absolute quantity for a product+size, creating the line
    /// if needed.
    ///
    /// ## Returns
    /// The stored line, carrying the server's line id.
    pub async fn upsert_line(
        &self,
        account_id: &str,
        product_id: &str,
        size_id: &str,
        quantity: i64,
    ) -> DbResult<CartLine> {
        debug!(
            account_id = %account_id,
            product_id = %product_id,
            size_id = %size_id,
            quantity,
            "Upserting cart line"
        );

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO cart_lines (id, account_id, product_id, size_id, quantity, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
             ON CONFLICT (account_id, product_id, size_id) \
             DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at",
        )
        .bind(generate_id())
        .bind(account_id)
        .bind(product_id)
        .bind(size_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let line = sqlx::query_as::<_, CartLine>(&format!(
            "{} WHERE c.account_id = ?1 AND c.product_id = ?2 AND c.size_id = ?3",
            LINE_SELECT
        ))
        .bind(account_id)
        .bind(product_id)
        .bind(size_id)
        .fetch_optional(&self.pool)
        .await?;

        line.ok_or_else(|| DbError::not_found("CartLine", format!("{}/{}", product_id, size_id)))
    }

    /// Deletes one of the account's lines. Deleting a missing line is not
    /// an error.
    pub async fn delete_line(&self, line_id: &str, account_id: &str) -> DbResult<bool> {
        debug!(line_id = %line_id, account_id = %account_id, "Deleting cart line");

        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1 AND account_id = ?2")
            .bind(line_id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every line of an account (the cart was turned into an order).
    pub async fn clear(&self, account_id: &str) -> DbResult<u64> {
        debug!(account_id = %account_id, "Clearing account cart");

        let result = sqlx::query("DELETE FROM cart_lines WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::account::NewAccount;
    use crate::{Database, DbConfig};
    use vitrine_core::{ProductDraft, Role};

    struct Fixture {
        db: Database,
        account: String,
        other_account: String,
        product: String,
        size_m: String,
        size_g: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut ids = Vec::new();
        for email in ["ana@example.com", "bia@example.com"] {
            let account = db
                .accounts()
                .create(&NewAccount {
                    name: "Shopper".to_string(),
                    email: email.to_string(),
                    phone: None,
                    password_hash: "hash".to_string(),
                    role: Role::Customer,
                })
                .await
                .unwrap();
            ids.push(account.id);
        }

        let product = db
            .products()
            .create(&ProductDraft {
                name: "Camisa".to_string(),
                price_cents: 9_990,
                ..ProductDraft::default()
            })
            .await
            .unwrap();
        let m = db.catalog().create_size("M", 2).await.unwrap();
        let g = db.catalog().create_size("G", 3).await.unwrap();

        Fixture {
            db,
            other_account: ids.pop().unwrap(),
            account: ids.pop().unwrap(),
            product: product.id,
            size_m: m.id,
            size_g: g.id,
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_pair() {
        let f = fixture().await;
        let carts = f.db.carts();

        let first = carts.upsert_line(&f.account, &f.product, &f.size_m, 2).await.unwrap();
        let again = carts.upsert_line(&f.account, &f.product, &f.size_m, 5).await.unwrap();
        carts.upsert_line(&f.account, &f.product, &f.size_g, 1).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.quantity, 5);
        assert_eq!(again.product_name, "Camisa");
        assert_eq!(again.unit_price_cents, 9_990);
        assert_eq!(again.size_name, "M");

        let lines = carts.list_lines(&f.account).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, first.id);
    }

    #[tokio::test]
    async fn test_lines_are_scoped_by_account() {
        let f = fixture().await;
        let carts = f.db.carts();

        let line = carts.upsert_line(&f.account, &f.product, &f.size_m, 1).await.unwrap();

        assert!(carts.list_lines(&f.other_account).await.unwrap().is_empty());
        assert!(!carts.delete_line(&line.id, &f.other_account).await.unwrap());
        assert_eq!(carts.clear(&f.other_account).await.unwrap(), 0);

        assert!(carts.delete_line(&line.id, &f.account).await.unwrap());
        assert!(carts.list_lines(&f.account).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_is_refused() {
        let f = fixture().await;
        let err = f
            .db
            .carts()
            .upsert_line(&f.account, &f.product, &f.size_m, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_product_is_foreign_key_violation() {
        let f = fixture().await;
        let err = f
            .db
            .carts()
            .upsert_line(&f.account, "ghost", &f.size_m, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_clear() {
        let f = fixture().await;
        let carts = f.db.carts();
        carts.upsert_line(&f.account, &f.product, &f.size_m, 1).await.unwrap();
        carts.upsert_line(&f.account, &f.product, &f.size_g, 1).await.unwrap();

        assert_eq!(carts.clear(&f.account).await.unwrap(), 2);
        assert!(carts.list_lines(&f.account).await.unwrap().is_empty());
    }
}
