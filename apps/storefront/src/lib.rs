//! # Vitrine Storefront
//!
//! Session layer of the Vitrine apparel store: one shopper's cart and coupon
//! slot, login state, and the commands a shopper or back-office user runs.
//!
//! ## Module Organization
//! ```text
//! vitrine_storefront/
//! ├── lib.rs          ◄─── Startup (logging, database, admin bootstrap)
//! ├── config.rs       ◄─── VITRINE_* environment configuration
//! ├── auth.rs         ◄─── Session tokens and password hashing
//! ├── coupon.rs       ◄─── Coupon validator over a lookup seam
//! ├── error.rs        ◄─── API error type for commands
//! ├── state/
//! │   ├── app.rs      ◄─── Shared state: database, config, tokens
//! │   ├── session.rs  ◄─── One shopper: cart, coupon slot, login
//! │   ├── backend.rs  ◄─── Cart backend trait and selection
//! │   ├── guest.rs    ◄─── Guest cart file
//! │   └── remote.rs   ◄─── Account cart lines in the database
//! ├── commands/       ◄─── catalog, cart, account, admin
//! └── shell.rs        ◄─── Line-oriented JSON front end
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod coupon;
pub mod error;
pub mod shell;
pub mod state;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::StorefrontConfig;
use shell::Shell;
use state::AppState;
use vitrine_db::seed::seed_demo_data;
use vitrine_db::{Database, DbConfig};

/// Runs the storefront shell over stdin/stdout until end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Connect to SQLite, apply migrations                                 │
/// │  2. Seed the demo catalog when asked (no-op on a populated store)       │
/// │  3. Create or promote the configured admin account                      │
/// │  4. Open a guest session over the guest cart file                       │
/// │  5. Read commands, write one JSON reply per line                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config: StorefrontConfig, seed: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!(store = %config.store_name, db_path = %config.db_path.display(), "Starting Vitrine storefront");

    if config.uses_dev_secret() {
        warn!("Using the development token secret; set VITRINE_JWT_SECRET in production");
    }

    let db = Database::new(DbConfig::new(config.db_path.clone())).await?;
    info!("Database connected and migrations applied");

    if seed {
        let report = seed_demo_data(&db).await?;
        info!(products = report.products, coupons = report.coupons, "Seed finished");
    }

    let app = AppState::new(db.clone(), config);
    if let Some(admin) = commands::admin::bootstrap_admin(&app).await? {
        info!(account_id = %admin.id, "Admin account ready");
    }

    let session = app.guest_session().await?;
    let mut shell = Shell::new(app, session);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin, tokio::io::stdout()).await?;

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout carries the shell's replies.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vitrine=trace` - Show trace for vitrine crates only
/// - Default: INFO, with debug for vitrine crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vitrine=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
