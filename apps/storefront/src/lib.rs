//! # Rehoboth Florals Storefront
//!
//! Application layer: wires configuration, storage, the catalog and the
//! cart store together, and exposes the commands the front end calls.
//!
//! ## Module Organization
//! ```text
//! florals_storefront/
//! ├── lib.rs          ◄─── You are here (AppState, tracing setup)
//! ├── state/
//! │   ├── db.rs       ◄─── Database handle wrapper
//! │   ├── cart.rs     ◄─── CartStore (persisted, observable cart)
//! │   └── config.rs   ◄─── ConfigState (defaults, toml, env)
//! ├── commands/
//! │   ├── catalog.rs  ◄─── Product listing and lookup
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── checkout.rs ◄─── Totals and order placement
//! │   └── order.rs    ◄─── Order lookup
//! └── error.rs        ◄─── ApiError for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()           RUST_LOG, default info,florals=debug       │
//! │  2. ConfigState::load(path)  defaults → florals.toml → FLORALS_*        │
//! │  3. Database::new()          SQLite file, WAL, migrations               │
//! │  4. CartStore::load()        re-hydrate cart-storage                    │
//! │  5. run commands                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiResult;
use florals_core::catalog::Catalog;
use florals_db::{Database, DbConfig};
use state::{CartStore, ConfigState, DbState};

/// Everything a command may need.
#[derive(Debug)]
pub struct AppState {
    pub config: ConfigState,
    pub db: DbState,
    pub cart: CartStore,
    pub catalog: Catalog,
}

impl AppState {
    /// Opens the configured database and loads the persisted cart.
    pub async fn open(config: ConfigState) -> ApiResult<Self> {
        let db_path = config.resolve_database_path()?;
        info!(db_path = %db_path.display(), "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        AppState::with_database(config, db).await
    }

    /// Builds state over an already-open database.
    pub async fn with_database(config: ConfigState, db: Database) -> ApiResult<Self> {
        let cart = CartStore::load(db.carts()).await?;

        info!(store = %config.store_name, "Storefront state initialized");

        Ok(AppState {
            config,
            db: DbState::new(db),
            cart,
            catalog: Catalog::seeded(),
        })
    }

    /// Fresh in-memory state with default configuration.
    pub async fn in_memory() -> ApiResult<Self> {
        let db = Database::in_memory().await?;
        AppState::with_database(ConfigState::default(), db).await
    }
}

/// Installs the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=florals=trace` - Trace the storefront crates only
/// - Default: `info,florals=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,florals=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
