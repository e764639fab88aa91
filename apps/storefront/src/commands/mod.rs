//! # Commands Module
//!
//! Everything the front end can ask the storefront to do. Each command
//! takes `&AppState` plus plain arguments and returns `ApiResult<T>` with a
//! serializable `T`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── list_products, get_product, list_categories
//! ├── cart.rs      ◄─── get_cart, add_to_cart, update_cart_item, ...
//! ├── checkout.rs  ◄─── checkout_summary, place_order
//! └── order.rs     ◄─── get_order, find_order, lookup_order, list_orders
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
