//! # Catalog Commands
//!
//! Read-only browsing: categories, sizes, product listings and the product
//! page with its size picker.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use vitrine_core::validation::validate_search_query;
use vitrine_core::{size_options, Category, Gender, Product, ProductFilter, Size, SizeOption};

/// Listing filters as the shopper expresses them (category by slug).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub search: Option<String>,
    pub featured: bool,
    pub trending: bool,
    pub is_new: bool,
}

/// A product as listed, with its display price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(flatten)]
    pub product: Product,
    pub price_label: String,
}

/// The product page: details plus the size picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductDto,
    pub sizes: Vec<SizeOption>,
}

fn to_dto(app: &AppState, product: Product) -> ProductDto {
    let price_label = app.config().format_currency(product.price_cents);
    ProductDto {
        product,
        price_label,
    }
}

pub async fn list_categories(app: &AppState) -> ApiResult<Vec<Category>> {
    debug!("list_categories command");
    Ok(app.db().catalog().list_categories().await?)
}

pub async fn list_sizes(app: &AppState) -> ApiResult<Vec<Size>> {
    debug!("list_sizes command");
    Ok(app.db().catalog().list_sizes().await?)
}

/// Lists active products, newest first.
///
/// ## Arguments
/// * `query.category` - Category slug; unknown slugs are NOT_FOUND
/// * `query.search` - Case-insensitive substring of the product name
pub async fn list_products(app: &AppState, query: ProductQuery) -> ApiResult<Vec<ProductDto>> {
    debug!(?query, "list_products command");

    let category_id = match query.category.as_deref() {
        Some(slug) => Some(
            app.db()
                .catalog()
                .get_category_by_slug(slug)
                .await?
                .ok_or_else(|| ApiError::not_found("Category", slug))?
                .id,
        ),
        None => None,
    };

    let search = match query.search.as_deref() {
        Some(raw) => Some(validate_search_query(raw)?).filter(|s| !s.is_empty()),
        None => None,
    };

    let filter = ProductFilter {
        category_id,
        gender: query.gender,
        search,
        featured: query.featured,
        trending: query.trending,
        is_new: query.is_new,
    };

    let products = app.db().products().list(&filter).await?;
    Ok(products.into_iter().map(|p| to_dto(app, p)).collect())
}

/// Loads an active product with its size picker.
pub async fn get_product(app: &AppState, product_id: &str) -> ApiResult<ProductDetail> {
    debug!(product_id = %product_id, "get_product command");

    let product = app
        .db()
        .products()
        .get_by_id(product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let stock = app.db().products().stock_for(&product.id).await?;

    Ok(ProductDetail {
        product: to_dto(app, product),
        sizes: size_options(&stock),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{app as empty_app, seeded_app};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_list_by_category_slug() {
        let (_dir, app) = seeded_app().await;

        let all = list_products(&app, ProductQuery::default()).await.unwrap();
        assert_eq!(all.len(), 12);

        let dresses = list_products(
            &app,
            ProductQuery {
                category: Some("vestidos".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(dresses.len(), 3);
        assert!(dresses.iter().all(|p| p.price_label.starts_with("R$")));

        let err = list_products(
            &app,
            ProductQuery {
                category: Some("nope".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_and_gender() {
        let (_dir, app) = seeded_app().await;

        let found = list_products(
            &app,
            ProductQuery {
                search: Some("  VESTIDO ".to_string()),
                gender: Some(Gender::Female),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 3);

        // Blank search means no search
        let blank = list_products(
            &app,
            ProductQuery {
                search: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(blank.len(), 12);
    }

    #[tokio::test]
    async fn test_product_detail_has_size_picker() {
        let (_dir, app) = seeded_app().await;
        let first = &list_products(&app, ProductQuery::default()).await.unwrap()[0];

        let detail = get_product(&app, &first.product.id).await.unwrap();
        assert_eq!(detail.sizes.len(), 5);
        assert!(detail.sizes.iter().any(|s| !s.available));
        assert_eq!(list_sizes(&app).await.unwrap().len(), 5);
        assert_eq!(list_categories(&app).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_hidden_product_is_not_found() {
        let (_dir, app) = seeded_app().await;
        let first = list_products(&app, ProductQuery::default()).await.unwrap()[0]
            .product
            .id
            .clone();
        app.db().products().deactivate(&first).await.unwrap();

        let err = get_product(&app, &first).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let (_empty_dir, empty) = empty_app().await;
        assert!(list_products(&empty, ProductQuery::default()).await.unwrap().is_empty());
    }
}
