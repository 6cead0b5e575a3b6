//! In-memory product store for tests/dev.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use shelflife_core::{NewProduct, Product, ProductId, StoreError, StoreResult};

use crate::config::StoreConfig;
use crate::ProductStore;

#[derive(Debug)]
struct Table {
    rows: Vec<Product>,
    next_id: i64,
    schema_version: u32,
}

impl Table {
    fn create(config: &StoreConfig) -> Self {
        let mut table = Self {
            rows: Vec::with_capacity(config.seed.len()),
            next_id: 1,
            schema_version: config.schema_version,
        };
        for product in &config.seed {
            table.insert(product.clone());
        }
        table
    }

    fn insert(&mut self, product: NewProduct) -> Product {
        let id = ProductId::new(self.next_id);
        self.next_id += 1;
        let product = product.with_id(id);
        self.rows.push(product.clone());
        product
    }
}

/// Same contract as the SQLite store, kept in a `Vec`.
///
/// The table does not exist until [`ProductStore::initialize`] runs, so reads
/// before that fail just as they would against a fresh database file.
#[derive(Debug)]
pub struct InMemoryProductStore {
    config: StoreConfig,
    table: RwLock<Option<Table>>,
}

impl InMemoryProductStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            table: RwLock::new(None),
        }
    }

    /// Store that is already initialized with the given seed.
    pub fn seeded(seed: Vec<NewProduct>) -> Self {
        let config = StoreConfig::in_memory().with_seed(seed);
        let table = Table::create(&config);
        Self {
            config,
            table: RwLock::new(Some(table)),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Option<Table>>> {
        self.table
            .read()
            .map_err(|_| StoreError::unavailable("product table lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Option<Table>>> {
        self.table
            .write()
            .map_err(|_| StoreError::unavailable("product table lock poisoned"))
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new(StoreConfig::in_memory())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn initialize(&self) -> StoreResult<()> {
        let mut table = self.write()?;
        match table.as_ref() {
            Some(existing) if existing.schema_version == self.config.schema_version => {}
            Some(existing) if existing.schema_version > self.config.schema_version => {
                return Err(StoreError::schema_too_new(
                    existing.schema_version,
                    self.config.schema_version,
                ));
            }
            Some(existing) => {
                tracing::info!(
                    from = existing.schema_version,
                    to = self.config.schema_version,
                    "schema version upgraded; resetting products table"
                );
                *table = Some(Table::create(&self.config));
            }
            None => {
                *table = Some(Table::create(&self.config));
            }
        }
        Ok(())
    }

    async fn get_all_products(&self) -> StoreResult<Vec<Product>> {
        let table = self.read()?;
        table
            .as_ref()
            .map(|t| t.rows.clone())
            .ok_or_else(|| StoreError::query("no such table: products"))
    }

    async fn reset_schema(&self) -> StoreResult<()> {
        let mut table = self.write()?;
        *table = Some(Table::create(&self.config));
        Ok(())
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut table = self.write()?;
        let table = table
            .as_mut()
            .ok_or_else(|| StoreError::query("no such table: products"))?;
        Ok(table.insert(product))
    }
}
