//! # Repository Module
//!
//! Storage repositories for the storefront.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartRepository ──┐                                                     │
//! │   "cart-storage"  │                                                     │
//! │                   ├──► StorageRepository ──► storage_entries            │
//! │  OrderRepository ─┘     get / set / remove      key | value | updated   │
//! │   "order-{id}"          JSON helpers                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`StorageRepository`](storage::StorageRepository) - Raw and typed JSON documents by key
//! - [`CartRepository`](cart::CartRepository) - The single cart snapshot
//! - [`OrderRepository`](order::OrderRepository) - Placed orders

pub mod cart;
pub mod order;
pub mod storage;
