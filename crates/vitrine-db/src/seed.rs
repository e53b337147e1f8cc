//! # Development Seed Data
//!
//! A small apparel catalog with sizes, stock and a few coupons, so the
//! storefront has something to sell on a fresh database.
//!
//! ## What Gets Created
//! ```text
//!   sizes       PP P M G GG
//!   categories  Camisetas, Vestidos, Calças, Acessórios
//!   products    3 per category, stock varying per size (some sold out)
//!   coupons     BEMVINDO10   10%, no minimum
//!               VITRINE50    50.00 off, minimum 200.00
//!               VERAO15      15%, expired yesterday
//! ```

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use vitrine_core::{CouponDraft, CouponKind, Gender, ProductDraft};

const SIZES: &[&str] = &["PP", "P", "M", "G", "GG"];

const CATALOG: &[(&str, &[(&str, i64, Gender)])] = &[
    (
        "Camisetas",
        &[
            ("Camiseta Básica Algodão", 4_990, Gender::Unisex),
            ("Camiseta Listrada", 6_990, Gender::Male),
            ("Regata Canelada", 3_990, Gender::Female),
        ],
    ),
    (
        "Vestidos",
        &[
            ("Vestido Floral Midi", 18_990, Gender::Female),
            ("Vestido Linho Curto", 15_990, Gender::Female),
            ("Vestido Tubinho Preto", 12_990, Gender::Female),
        ],
    ),
    (
        "Calças",
        &[
            ("Calça Jeans Reta", 19_990, Gender::Male),
            ("Calça Pantalona", 17_990, Gender::Female),
            ("Jogger Moletom", 11_990, Gender::Unisex),
        ],
    ),
    (
        "Acessórios",
        &[
            ("Boné Aba Curva", 7_990, Gender::Unisex),
            ("Cinto Couro", 8_990, Gender::Male),
            ("Lenço Estampado", 4_590, Gender::Female),
        ],
    ),
];

/// Counts of what [`seed_demo_data`] inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub sizes: usize,
    pub categories: usize,
    pub products: usize,
    pub coupons: usize,
}

/// Seeds the demo catalog. Does nothing when products already exist.
pub async fn seed_demo_data(db: &Database) -> DbResult<SeedReport> {
    let mut report = SeedReport::default();

    if db.products().count().await? > 0 {
        info!("Catalog already populated, skipping seed");
        return Ok(report);
    }

    let mut size_ids = Vec::with_capacity(SIZES.len());
    for (order, name) in SIZES.iter().enumerate() {
        let size = db.catalog().create_size(name, order as i64 + 1).await?;
        size_ids.push(size.id);
        report.sizes += 1;
    }

    for (category_idx, (category_name, products)) in CATALOG.iter().enumerate() {
        let category = db.catalog().create_category(category_name).await?;
        report.categories += 1;

        for (product_idx, (name, price_cents, gender)) in products.iter().enumerate() {
            let seed = category_idx * 10 + product_idx;
            let product = db
                .products()
                .create(&ProductDraft {
                    category_id: Some(category.id.clone()),
                    name: name.to_string(),
                    description: Some(format!("{} da coleção Vitrine.", name)),
                    price_cents: *price_cents,
                    gender: Some(*gender),
                    featured: seed % 4 == 0,
                    trending: seed % 3 == 0,
                    is_new: product_idx == 0,
                    image_url: None,
                })
                .await?;

            // Every third size of every product is sold out
            let levels: Vec<(String, i64)> = size_ids
                .iter()
                .enumerate()
                .map(|(i, size_id)| {
                    let qty = if (seed + i) % 3 == 0 { 0 } else { ((seed + i) % 7 + 1) as i64 };
                    (size_id.clone(), qty)
                })
                .collect();
            db.products().set_stock(&product.id, &levels).await?;
            report.products += 1;
        }
    }

    let today = Utc::now().date_naive();
    let coupons = [
        CouponDraft {
            code: "BEMVINDO10".to_string(),
            kind: CouponKind::Percentage,
            value: 1_000,
            minimum_spend_cents: 0,
            expires_on: today + Duration::days(365),
            active: true,
        },
        CouponDraft {
            code: "VITRINE50".to_string(),
            kind: CouponKind::Fixed,
            value: 5_000,
            minimum_spend_cents: 20_000,
            expires_on: today + Duration::days(90),
            active: true,
        },
        CouponDraft {
            code: "VERAO15".to_string(),
            kind: CouponKind::Percentage,
            value: 1_500,
            minimum_spend_cents: 0,
            expires_on: today - Duration::days(1),
            active: true,
        },
    ];
    for draft in &coupons {
        db.coupons().create(draft).await?;
        report.coupons += 1;
    }

    info!(
        sizes = report.sizes,
        categories = report.categories,
        products = report.products,
        coupons = report.coupons,
        "Seed complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use vitrine_core::ProductFilter;

    #[tokio::test]
    async fn test_seed_populates_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = seed_demo_data(&db).await.unwrap();
        assert_eq!(report.sizes, 5);
        assert_eq!(report.categories, 4);
        assert_eq!(report.products, 12);
        assert_eq!(report.coupons, 3);

        let again = seed_demo_data(&db).await.unwrap();
        assert_eq!(again, SeedReport::default());

        let products = db.products().list(&ProductFilter::default()).await.unwrap();
        assert_eq!(products.len(), 12);

        let stock = db.products().stock_for(&products[0].id).await.unwrap();
        assert_eq!(stock.len(), 5);
        assert!(stock.iter().any(|s| s.quantity == 0));
        assert!(stock.iter().any(|s| s.quantity > 0));
    }

    #[tokio::test]
    async fn test_seeded_expired_coupon_is_not_valid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let today = Utc::now().date_naive();
        assert!(db.coupons().find_valid("bemvindo10", today).await.unwrap().is_some());
        assert!(db.coupons().find_valid("VERAO15", today).await.unwrap().is_none());
    }
}
