//! # Seed Data Generator
//!
//! Populates a database with the demo catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p vitrine-db --bin seed
//! cargo run -p vitrine-db --bin seed -- --db ./data/vitrine.db
//! ```

use std::env;
use vitrine_db::seed::seed_demo_data;
use vitrine_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./vitrine_dev.db".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vitrine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vitrine_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vitrine Seed Data Generator");
    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let report = seed_demo_data(&db).await?;
    if report.products == 0 {
        println!("⚠ Catalog already populated. Delete the database file to regenerate.");
    } else {
        println!(
            "✓ Seeded {} sizes, {} categories, {} products, {} coupons",
            report.sizes, report.categories, report.products, report.coupons
        );
    }

    db.close().await;
    Ok(())
}
