//! # florals-db: Storage Layer for Rehoboth Florals
//!
//! SQLite-backed key/value storage for the storefront: the persisted cart
//! snapshot and placed orders. Values are the same JSON documents a browser
//! build keeps in local storage, so data moves between the two unchanged.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore / place_order (storefront)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   florals-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Storage       │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Cart, Order   │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  storage_entries (key TEXT PK, value TEXT, updated_at TEXT)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use florals_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("florals.db")).await?;
//! let cart = db.carts().load().await?.unwrap_or_default();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::order::OrderRepository;
pub use repository::storage::StorageRepository;
