//! `shelflife-store`
//!
//! **Responsibility:** the product record store.
//!
//! This crate provides:
//! - The [`ProductStore`] contract (initialize, full scan, schema reset, insert)
//! - A SQLite-backed implementation for on-device persistence
//! - An in-memory implementation for tests and embedding
//!
//! The store is the sole owner of product identity.

pub mod config;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use shelflife_core::{NewProduct, Product, StoreResult};

pub use config::{default_db_path, default_seed, StoreConfig, StoreLocation};
pub use memory::InMemoryProductStore;
pub use sqlite::SqliteProductStore;

/// Product record store.
#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
    /// Create the backing table if absent, seeding it on first creation only.
    ///
    /// Idempotent. When the persisted schema version differs from the
    /// configured one the table is reset (drop, recreate, re-seed).
    async fn initialize(&self) -> StoreResult<()>;

    /// Every stored product, in insertion order.
    async fn get_all_products(&self) -> StoreResult<Vec<Product>>;

    /// Drop and recreate the table, then re-seed it.
    async fn reset_schema(&self) -> StoreResult<()>;

    /// Persist a new product; the store assigns its id.
    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product>;
}

#[async_trait]
impl<S: ProductStore + ?Sized> ProductStore for Arc<S> {
    async fn initialize(&self) -> StoreResult<()> {
        (**self).initialize().await
    }

    async fn get_all_products(&self) -> StoreResult<Vec<Product>> {
        (**self).get_all_products().await
    }

    async fn reset_schema(&self) -> StoreResult<()> {
        (**self).reset_schema().await
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        (**self).insert_product(product).await
    }
}
