//! # Guest Cart Storage
//!
//! A guest's cart survives restarts as a JSON array of [`CartItem`] in a
//! single file. A missing file is an empty cart.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-write leaves the previous cart intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use vitrine_core::validation::{validate_price_cents, validate_quantity};
use vitrine_core::CartItem;

use super::backend::{BackendError, BackendKind, CartBackend, CartChange};

/// File-backed guest cart storage.
#[derive(Debug, Clone)]
pub struct GuestStorage {
    path: PathBuf,
}

impl GuestStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GuestStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored guest cart.
    ///
    /// Unreadable JSON is logged and treated as an empty cart. Lines whose
    /// quantity or price a cart would refuse are dropped, as are repeats of
    /// a product+size already loaded.
    pub async fn load_guest_cart(&self) -> Result<Vec<CartItem>, BackendError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let items: Vec<CartItem> = match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable guest cart");
                return Ok(Vec::new());
            }
        };

        let mut kept: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            let invalid = validate_quantity(item.quantity).is_err()
                || validate_price_cents(item.unit_price_cents).is_err();
            if invalid || kept.iter().any(|k| k.matches(&item.product_id, &item.size_id)) {
                continue;
            }
            kept.push(item);
        }

        debug!(path = %self.path.display(), lines = kept.len(), "Loaded guest cart");
        Ok(kept)
    }

    /// Replaces the stored guest cart with `items`.
    pub async fn save_guest_cart(&self, items: &[CartItem]) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), lines = items.len(), "Saved guest cart");
        Ok(())
    }
}

/// The guest backend: the whole cart is rewritten on every change.
#[derive(Debug, Clone)]
pub struct LocalCart {
    storage: GuestStorage,
}

impl LocalCart {
    pub fn new(storage: GuestStorage) -> Self {
        LocalCart { storage }
    }
}

#[async_trait]
impl CartBackend for LocalCart {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn load(&self) -> Result<Vec<CartItem>, BackendError> {
        self.storage.load_guest_cart().await
    }

    async fn persist(
        &self,
        _change: CartChange<'_>,
        snapshot: &[CartItem],
    ) -> Result<Option<String>, BackendError> {
        self.storage.save_guest_cart(snapshot).await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(line: &str, product: &str, size: &str, quantity: i64) -> CartItem {
        CartItem {
            line_id: line.to_string(),
            product_id: product.to_string(),
            product_name: "Camiseta".to_string(),
            unit_price_cents: 4_990,
            size_id: size.to_string(),
            size_name: "M".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_cart() {
        let dir = TempDir::new().unwrap();
        let storage = GuestStorage::new(dir.path().join("cart.json"));
        assert!(storage.load_guest_cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let storage = GuestStorage::new(dir.path().join("nested").join("cart.json"));
        let items = vec![item("l-2", "p-2", "s-m", 1), item("l-1", "p-1", "s-m", 3)];

        storage.save_guest_cart(&items).await.unwrap();
        assert_eq!(storage.load_guest_cart().await.unwrap(), items);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_cart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cart.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let storage = GuestStorage::new(&path);
        assert!(storage.load_guest_cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_invalid_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cart.json");
        let mut overpriced = item("l-4", "p-3", "s-m", 1);
        overpriced.unit_price_cents = i64::MAX;
        let stored = vec![
            item("l-1", "p-1", "s-m", 2),
            item("l-2", "p-2", "s-m", 0),
            item("l-3", "p-1", "s-m", 5),
            overpriced,
            item("l-5", "p-4", "s-m", 1_000),
        ];
        tokio::fs::write(&path, serde_json::to_vec(&stored).unwrap())
            .await
            .unwrap();

        let loaded = GuestStorage::new(&path).load_guest_cart().await.unwrap();
        assert_eq!(loaded, vec![item("l-1", "p-1", "s-m", 2)]);
    }

    #[tokio::test]
    async fn test_local_backend_writes_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = GuestStorage::new(dir.path().join("cart.json"));
        let backend = LocalCart::new(storage.clone());
        let line = item("l-1", "p-1", "s-m", 1);

        let assigned = backend
            .persist(CartChange::Upserted(&line), std::slice::from_ref(&line))
            .await
            .unwrap();
        assert_eq!(assigned, None);
        assert_eq!(backend.load().await.unwrap(), vec![line]);

        backend.persist(CartChange::Cleared, &[]).await.unwrap();
        assert!(backend.load().await.unwrap().is_empty());
    }
}
