//! # Account Cart Backend
//!
//! An authenticated shopper's cart lives in `cart_lines`, one row per
//! product+size. Each change is a single independent write:
//!
//! ```text
//!   Upserted(item) ──► upsert_line(account, product, size, item.quantity)
//!   Removed(item)  ──► delete_line(item.line_id, account)
//!   Cleared        ──► clear(account)
//! ```
//!
//! Failures are returned, never swallowed; the session rolls its in-memory
//! cart back when a write fails.

use async_trait::async_trait;
use tracing::debug;

use vitrine_core::CartItem;
use vitrine_db::CartRepository;

use super::backend::{BackendError, BackendKind, CartBackend, CartChange};

#[derive(Debug, Clone)]
pub struct RemoteCart {
    carts: CartRepository,
    account_id: String,
}

impl RemoteCart {
    pub fn new(carts: CartRepository, account_id: impl Into<String>) -> Self {
        RemoteCart {
            carts,
            account_id: account_id.into(),
        }
    }
}

#[async_trait]
impl CartBackend for RemoteCart {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn load(&self) -> Result<Vec<CartItem>, BackendError> {
        let lines = self.carts.list_lines(&self.account_id).await?;
        Ok(lines.into_iter().map(CartItem::from).collect())
    }

    async fn persist(
        &self,
        change: CartChange<'_>,
        _snapshot: &[CartItem],
    ) -> Result<Option<String>, BackendError> {
        match change {
            CartChange::Upserted(item) => {
                let line = self
                    .carts
                    .upsert_line(&self.account_id, &item.product_id, &item.size_id, item.quantity)
                    .await?;
                Ok(Some(line.id))
            }
            CartChange::Removed(item) => {
                let deleted = self.carts.delete_line(&item.line_id, &self.account_id).await?;
                debug!(line_id = %item.line_id, deleted, "Removed account cart line");
                Ok(None)
            }
            CartChange::Cleared => {
                let deleted = self.carts.clear(&self.account_id).await?;
                debug!(account_id = %self.account_id, deleted, "Cleared account cart");
                Ok(None)
            }
        }
    }
}
