//! # Product Repository
//!
//! Products, storefront filters and per-size stock.
//!
//! ## Listing Filters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductFilter                 SQL predicate (all AND-ed)               │
//! │  ─────────────                 ─────────────────────────                │
//! │  category_id: Some(c)   ──►    category_id = c                          │
//! │  gender: Some(g)        ──►    gender = g                               │
//! │  search: Some("lin")    ──►    name LIKE '%lin%'  (case-insensitive)    │
//! │  featured / trending /  ──►    flag = 1                                 │
//! │  is_new: true                                                           │
//! │                                                                         │
//! │  Inactive products never appear.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::validation::slugify;
use vitrine_core::{Product, ProductDraft, ProductFilter, StockEntry};

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price_cents, gender, \
     featured, trending, is_new, image_url, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products matching `filter`, newest first.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        debug!(?filter, "Listing products");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products \
             WHERE active = 1 \
               AND (?1 IS NULL OR category_id = ?1) \
               AND (?2 IS NULL OR gender = ?2) \
               AND (?3 IS NULL OR name LIKE ?3) \
               AND (?4 = 0 OR featured = 1) \
               AND (?5 = 0 OR trending = 1) \
               AND (?6 = 0 OR is_new = 1) \
             ORDER BY created_at DESC, name",
            PRODUCT_COLUMNS
        ))
        .bind(&filter.category_id)
        .bind(filter.gender)
        .bind(pattern)
        .bind(filter.featured)
        .bind(filter.trending)
        .bind(filter.is_new)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listing returned products");
        Ok(products)
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE slug = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Picks a slug for `name` that no other product uses.
    ///
    /// On collision the first block of the product's id is appended.
    async fn unique_slug(&self, name: &str, product_id: &str) -> DbResult<String> {
        let base = slugify(name);
        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE slug = ?1 AND id <> ?2")
                .bind(&base)
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        if taken == 0 {
            return Ok(base);
        }

        let suffix = product_id.split('-').next().unwrap_or(product_id);
        Ok(format!("{}-{}", base, suffix))
    }

    /// Inserts a new product built from `draft`.
    pub async fn create(&self, draft: &ProductDraft) -> DbResult<Product> {
        let id = generate_id();
        let slug = self.unique_slug(&draft.name, &id).await?;
        let now = Utc::now();

        let product = Product {
            id,
            category_id: draft.category_id.clone(),
            name: draft.name.trim().to_string(),
            slug,
            description: draft.description.clone(),
            price_cents: draft.price_cents,
            gender: draft.gender,
            featured: draft.featured,
            trending: draft.trending,
            is_new: draft.is_new,
            image_url: draft.image_url.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(slug = %product.slug, "Inserting product");

        sqlx::query(&format!(
            "INSERT INTO products ({}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            PRODUCT_COLUMNS
        ))
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.gender)
        .bind(product.featured)
        .bind(product.trending)
        .bind(product.is_new)
        .bind(&product.image_url)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Overwrites a product's editable fields. The slug follows the name.
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let slug = self.unique_slug(&draft.name, id).await?;

        let result = sqlx::query(
            "UPDATE products SET \
                category_id = ?2, name = ?3, slug = ?4, description = ?5, price_cents = ?6, \
                gender = ?7, featured = ?8, trending = ?9, is_new = ?10, image_url = ?11, \
                updated_at = ?12 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&draft.category_id)
        .bind(draft.name.trim())
        .bind(&slug)
        .bind(&draft.description)
        .bind(draft.price_cents)
        .bind(draft.gender)
        .bind(draft.featured)
        .bind(draft.trending)
        .bind(draft.is_new)
        .bind(&draft.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Hides a product from the storefront.
    ///
    /// Existing cart lines keep pointing at it.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Removes a product for good, along with its stock rows and any cart
    /// lines pointing at it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Stock rows for a product, in size picker order.
    pub async fn stock_for(&self, product_id: &str) -> DbResult<Vec<StockEntry>> {
        let rows = sqlx::query_as::<_, StockEntry>(
            "SELECT st.id, st.product_id, st.size_id, s.name AS size_name, st.quantity \
             FROM stock st \
             INNER JOIN sizes s ON s.id = st.size_id \
             WHERE st.product_id = ?1 \
             ORDER BY s.sort_order, s.name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Units on hand for one product+size; `None` when the size is not
    /// offered for the product.
    pub async fn stock_level(&self, product_id: &str, size_id: &str) -> DbResult<Option<i64>> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock WHERE product_id = ?1 AND size_id = ?2",
        )
        .bind(product_id)
        .bind(size_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quantity)
    }

    /// Sets absolute stock levels for several sizes at once.
    ///
    /// Upserts on `(product_id, size_id)` inside one transaction: either
    /// every level is written or none is.
    pub async fn set_stock(&self, product_id: &str, levels: &[(String, i64)]) -> DbResult<()> {
        debug!(product_id = %product_id, sizes = levels.len(), "Setting stock levels");

        let mut tx = self.pool.begin().await?;

        for (size_id, quantity) in levels {
            sqlx::query(
                "INSERT INTO stock (id, product_id, size_id, quantity) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT (product_id, size_id) DO UPDATE SET quantity = excluded.quantity",
            )
            .bind(generate_id())
            .bind(product_id)
            .bind(size_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Stops offering a size for a product.
    pub async fn delete_stock(&self, product_id: &str, size_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM stock WHERE product_id = ?1 AND size_id = ?2")
            .bind(product_id)
            .bind(size_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", format!("{}/{}", product_id, size_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use vitrine_core::Gender;

    fn draft(name: &str, price_cents: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price_cents,
            ..ProductDraft::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_slugs() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let first = repo.create(&draft("Camisa Linho", 12_990)).await.unwrap();
        let second = repo.create(&draft("Camisa  Linho!", 13_990)).await.unwrap();

        assert_eq!(first.slug, "camisa-linho");
        assert_ne!(second.slug, first.slug);
        assert!(second.slug.starts_with("camisa-linho-"));
        assert_eq!(
            repo.get_by_slug("camisa-linho").await.unwrap().unwrap().id,
            first.id
        );
    }

    #[tokio::test]
    async fn test_list_filters_combine() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut dress = draft("Vestido Floral", 19_990);
        dress.gender = Some(Gender::Female);
        dress.featured = true;
        repo.create(&dress).await.unwrap();

        let mut shirt = draft("Camisa Floral", 9_990);
        shirt.gender = Some(Gender::Male);
        repo.create(&shirt).await.unwrap();

        let hidden = repo.create(&draft("Saia Floral", 5_000)).await.unwrap();
        repo.deactivate(&hidden.id).await.unwrap();

        let all = repo.list(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let floral = ProductFilter {
            search: Some("FLORAL".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(repo.list(&floral).await.unwrap().len(), 2);

        let female_featured = ProductFilter {
            gender: Some(Gender::Female),
            featured: true,
            ..ProductFilter::default()
        };
        let found = repo.list(&female_featured).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Vestido Floral");
    }

    #[tokio::test]
    async fn test_set_stock_upserts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.catalog().create_size("P", 1).await.unwrap();
        let m = db.catalog().create_size("M", 2).await.unwrap();
        let repo = db.products();
        let product = repo.create(&draft("Camisa", 9_990)).await.unwrap();

        repo.set_stock(&product.id, &[(m.id.clone(), 3), (p.id.clone(), 0)])
            .await
            .unwrap();
        repo.set_stock(&product.id, &[(m.id.clone(), 7)]).await.unwrap();

        let stock = repo.stock_for(&product.id).await.unwrap();
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].size_name, "P");
        assert_eq!(stock[0].quantity, 0);
        assert_eq!(stock[1].quantity, 7);

        assert_eq!(repo.stock_level(&product.id, &m.id).await.unwrap(), Some(7));
        assert_eq!(repo.stock_level(&product.id, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_negative_stock_rolls_back_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let m = db.catalog().create_size("M", 2).await.unwrap();
        let g = db.catalog().create_size("G", 3).await.unwrap();
        let repo = db.products();
        let product = repo.create(&draft("Camisa", 9_990)).await.unwrap();

        let err = repo
            .set_stock(&product.id, &[(m.id.clone(), 5), (g.id.clone(), -1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
        assert!(repo.stock_for(&product.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .products()
            .update("missing", &draft("X", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_stock_and_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let size = db.catalog().create_size("M", 2).await.unwrap();
        let product = repo.create(&draft("Bermuda", 7_990)).await.unwrap();
        repo.set_stock(&product.id, &[(size.id.clone(), 4)]).await.unwrap();

        repo.delete_stock(&product.id, &size.id).await.unwrap();
        assert_eq!(repo.stock_level(&product.id, &size.id).await.unwrap(), None);
        assert!(matches!(
            repo.delete_stock(&product.id, &size.id).await,
            Err(DbError::NotFound { .. })
        ));

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(&product.id).await, Err(DbError::NotFound { .. })));
    }
}
