//! # Vitrine Entry Point
//!
//! ```bash
//! vitrine --seed
//! vitrine --db ./data/vitrine.db --guest-cart ./data/guest_cart.json
//! echo 'products --category vestidos' | vitrine
//! ```
//!
//! Flags override the matching `VITRINE_*` environment variables.

use std::path::PathBuf;

use clap::Parser;

use vitrine_storefront::config::StorefrontConfig;

#[derive(Debug, Parser)]
#[command(name = "vitrine")]
#[command(about = "Vitrine storefront shell: one command per line, JSON replies")]
struct Cli {
    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Guest cart JSON file
    #[arg(long)]
    guest_cart: Option<PathBuf>,

    /// Seed the demo catalog when the store is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    vitrine_storefront::init_tracing();

    let mut config = StorefrontConfig::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(guest_cart) = cli.guest_cart {
        config.guest_cart_path = guest_cart;
    }

    vitrine_storefront::run(config, cli.seed).await
}
