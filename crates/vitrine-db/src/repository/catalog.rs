//! # Catalog Repository
//!
//! Categories and sizes: the small reference tables products hang off.

use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use vitrine_core::validation::slugify;
use vitrine_core::{Category, Size};

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Active categories, alphabetically.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, active FROM categories WHERE active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, active FROM categories WHERE slug = ?1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Creates a category; the slug is derived from the name.
    pub async fn create_category(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: generate_id(),
            name: name.trim().to_string(),
            slug: slugify(name),
            active: true,
        };
        debug!(slug = %category.slug, "Creating category");

        sqlx::query("INSERT INTO categories (id, name, slug, active) VALUES (?1, ?2, ?3, ?4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(category.active)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("slug", &category.slug),
                other => other,
            })?;

        Ok(category)
    }

    /// Deletes a category. Its products stay, uncategorized.
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    /// All sizes in picker order.
    pub async fn list_sizes(&self) -> DbResult<Vec<Size>> {
        let rows = sqlx::query_as::<_, Size>(
            "SELECT id, name, sort_order FROM sizes ORDER BY sort_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_size(&self, id: &str) -> DbResult<Option<Size>> {
        let row = sqlx::query_as::<_, Size>("SELECT id, name, sort_order FROM sizes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create_size(&self, name: &str, sort_order: i64) -> DbResult<Size> {
        let size = Size {
            id: generate_id(),
            name: name.trim().to_uppercase(),
            sort_order,
        };

        sqlx::query("INSERT INTO sizes (id, name, sort_order) VALUES (?1, ?2, ?3)")
            .bind(&size.id)
            .bind(&size.name)
            .bind(size.sort_order)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("size", &size.name),
                other => other,
            })?;

        Ok(size)
    }
}
