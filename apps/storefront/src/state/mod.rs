//! # State Module
//!
//! Long-lived storefront state, owned by [`AppState`](crate::AppState).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │    CartStore     │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Mutex<Cart>     │  │  store_name      │          │
//! │  │  (SQLite     │  │  CartRepository  │  │  page_size       │          │
//! │  │   pool)      │  │  watch<Totals>   │  │  CheckoutRules   │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • DbState: Database has internal connection pool (thread-safe)         │
//! │  • CartStore: tokio Mutex, held across persistence                      │
//! │  • ConfigState: Read-only after initialization                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;

pub use cart::{CartStore, CartStoreError, CartStoreResult};
pub use config::{ConfigError, ConfigState, ENV_PREFIX};
pub use db::DbState;
