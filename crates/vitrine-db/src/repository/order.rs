//! # Order Repository
//!
//! Placed orders and their lines. An order and its lines are written in one
//! transaction; nothing else ever changes an order except its status.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::{CartItem, CartTotals, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, account_id, customer_name, line_count, subtotal_cents, \
     discount_cents, total_cents, coupon_code, status, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, size_name, unit_price_cents, quantity";

/// Input for [`OrderRepository::create`]: a confirmed checkout.
#[derive(Debug, Clone, Copy)]
pub struct NewOrder<'a> {
    pub account_id: &'a str,
    pub customer_name: &'a str,
    pub items: &'a [CartItem],
    pub totals: &'a CartTotals,
    pub coupon_code: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Stores an order with its lines, status pending.
    pub async fn create(&self, new: NewOrder<'_>) -> DbResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: generate_id(),
            account_id: new.account_id.to_string(),
            customer_name: new.customer_name.to_string(),
            line_count: new.items.len() as i64,
            subtotal_cents: new.totals.subtotal_cents,
            discount_cents: new.totals.discount_cents,
            total_cents: new.totals.total_cents,
            coupon_code: new.coupon_code.map(str::to_string),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO orders ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            ORDER_COLUMNS
        ))
        .bind(&order.id)
        .bind(&order.account_id)
        .bind(&order.customer_name)
        .bind(order.line_count)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(&order.coupon_code)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in new.items {
            sqlx::query(&format!(
                "INSERT INTO order_items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                ITEM_COLUMNS
            ))
            .bind(generate_id())
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(&item.size_name)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(order_id = %order.id, total = order.total_cents, lines = order.line_count, "Order placed");
        Ok(order)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lines of an order in the order they were in the cart.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY rowid",
            ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Every order, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// One account's orders, newest first.
    pub async fn list_for_account(&self, account_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE account_id = ?1 ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        debug!(order_id = %id, status = %status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }
}
