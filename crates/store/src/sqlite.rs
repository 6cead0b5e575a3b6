//! SQLite-backed product store.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use shelflife_core::{NewProduct, Product, ProductId, StoreError, StoreResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::config::{StoreConfig, StoreLocation};
use crate::ProductStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Attach a message to a `sqlx` failure, the way `anyhow::Context` would.
trait QueryContext<T> {
    fn query_context(self, msg: &str) -> StoreResult<T>;
}

impl<T> QueryContext<T> for Result<T, sqlx::Error> {
    fn query_context(self, msg: &str) -> StoreResult<T> {
        self.map_err(|err| StoreError::query(format!("{msg}: {err}")))
    }
}

/// SQLite record store.
///
/// Cheap to clone; clones share the same connection pool, so the UI read path
/// and the background evaluator can hold their own handles.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
    config: Arc<StoreConfig>,
}

impl SqliteProductStore {
    /// Open (or create) the database described by `config`.
    ///
    /// Does not touch the schema; call [`ProductStore::initialize`] next.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let pool = match &config.location {
            StoreLocation::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        StoreError::unavailable(format!(
                            "failed to create database directory at {parent:?}: {err}"
                        ))
                    })?;
                }

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);

                SqlitePoolOptions::new()
                    .max_connections(4)
                    .connect_with(options)
                    .await
                    .map_err(|err| {
                        StoreError::unavailable(format!(
                            "failed to open product database at {path:?}: {err}"
                        ))
                    })?
            }
            StoreLocation::InMemory => {
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|err| StoreError::unavailable(err.to_string()))?;

                // Each in-memory connection is its own database; pin a single one.
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None::<Duration>)
                    .max_lifetime(None::<Duration>)
                    .connect_with(options)
                    .await
                    .map_err(|err| {
                        StoreError::unavailable(format!(
                            "failed to open in-memory product database: {err}"
                        ))
                    })?
            }
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Schema version currently recorded in the database header.
    pub async fn stored_schema_version(&self) -> StoreResult<u32> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .query_context("failed to acquire connection")?;
        read_user_version(&mut conn).await
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn initialize(&self) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .query_context("failed to begin initialization")?;

        let exists: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table' AND name = 'products'
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .query_context("failed to inspect schema")?;

        let stored_version = read_user_version(&mut tx).await?;

        if exists == 0 {
            tracing::info!(
                schema_version = self.config.schema_version,
                seeded = self.config.seed.len(),
                "creating products table"
            );
            create_and_seed(&mut tx, &self.config).await?;
        } else if stored_version > self.config.schema_version {
            tracing::error!(
                stored = stored_version,
                supported = self.config.schema_version,
                "products table written by a newer schema; refusing to open"
            );
            return Err(StoreError::schema_too_new(
                stored_version,
                self.config.schema_version,
            ));
        } else if stored_version < self.config.schema_version {
            tracing::info!(
                from = stored_version,
                to = self.config.schema_version,
                "schema version upgraded; resetting products table"
            );
            drop_table(&mut tx).await?;
            create_and_seed(&mut tx, &self.config).await?;
        } else {
            tracing::debug!(schema_version = stored_version, "products table already initialized");
        }

        tx.commit()
            .await
            .query_context("failed to commit initialization")?;

        Ok(())
    }

    async fn get_all_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, expirationDate
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .query_context("failed to read products")?;

        let products = rows
            .iter()
            .map(|row| -> StoreResult<Product> {
                let id = row
                    .try_get::<i64, _>("id")
                    .query_context("failed to read id column")?;
                let id = ProductId::new(id);
                let name: String = row
                    .try_get("name")
                    .map_err(|err| StoreError::decode(id, err.to_string()))?;
                let raw_date: String = row
                    .try_get("expirationDate")
                    .map_err(|err| StoreError::decode(id, err.to_string()))?;
                let expiration_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
                    .map_err(|err| {
                        StoreError::decode(id, format!("invalid expiration date {raw_date:?}: {err}"))
                    })?;

                Ok(Product::new(id, name, expiration_date))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        tracing::debug!(count = products.len(), "read products");
        Ok(products)
    }

    async fn reset_schema(&self) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .query_context("failed to begin schema reset")?;

        drop_table(&mut tx).await?;
        create_and_seed(&mut tx, &self.config).await?;

        tx.commit().await.query_context("failed to commit schema reset")?;

        tracing::info!(
            schema_version = self.config.schema_version,
            seeded = self.config.seed.len(),
            "products table reset"
        );
        Ok(())
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .query_context("failed to acquire connection")?;

        let id = insert_row(&mut conn, &product).await?;
        tracing::debug!(product_id = %id, name = %product.name, "inserted product");

        Ok(product.with_id(id))
    }
}

async fn read_user_version(conn: &mut SqliteConnection) -> StoreResult<u32> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await
        .query_context("failed to read schema version")?;

    u32::try_from(version)
        .map_err(|_| StoreError::query(format!("schema version out of range: {version}")))
}

async fn drop_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query("DROP TABLE IF EXISTS products")
        .execute(&mut *conn)
        .await
        .query_context("failed to drop products table")?;
    Ok(())
}

async fn create_and_seed(conn: &mut SqliteConnection, config: &StoreConfig) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE products (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            expirationDate  TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await
    .query_context("failed to create products table")?;

    for product in &config.seed {
        insert_row(conn, product).await?;
    }

    // PRAGMA arguments cannot be bound; the value is a plain integer.
    sqlx::query(&format!("PRAGMA user_version = {}", config.schema_version))
        .execute(&mut *conn)
        .await
        .query_context("failed to record schema version")?;

    Ok(())
}

async fn insert_row(conn: &mut SqliteConnection, product: &NewProduct) -> StoreResult<ProductId> {
    let result = sqlx::query(
        r#"
        INSERT INTO products (name, expirationDate)
        VALUES (?1, ?2)
        "#,
    )
    .bind(&product.name)
    .bind(product.expiration_date.format(DATE_FORMAT).to_string())
    .execute(&mut *conn)
    .await
    .query_context("failed to insert product")?;

    Ok(ProductId::new(result.last_insert_rowid()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::Days;
    use shelflife_core::Entity;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn open(config: StoreConfig) -> SqliteProductStore {
        let store = SqliteProductStore::connect(config).await.unwrap();
        store.initialize().await.unwrap();
        store
    }

    fn names_and_dates(products: &[Product]) -> Vec<(String, NaiveDate)> {
        products
            .iter()
            .map(|p| (p.name().to_string(), p.expiration_date()))
            .collect()
    }

    fn seed_pairs(seed: &[NewProduct]) -> Vec<(String, NaiveDate)> {
        seed.iter()
            .map(|p| (p.name.clone(), p.expiration_date))
            .collect()
    }

    #[tokio::test]
    async fn first_read_returns_exactly_the_seed_set() {
        let config = StoreConfig::in_memory();
        let seed = config.seed.clone();
        let store = open(config).await;

        let products = store.get_all_products().await.unwrap();

        assert_eq!(names_and_dates(&products), seed_pairs(&seed));
        let ids: HashSet<_> = products.iter().map(|p| p.id()).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let store = open(StoreConfig::in_memory()).await;

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        assert_eq!(store.get_all_products().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = open(StoreConfig::in_memory().with_seed(Vec::new())).await;

        let first = store
            .insert_product(NewProduct::new("牛乳", date(2024, 9, 1)))
            .await
            .unwrap();
        let second = store
            .insert_product(NewProduct::new("牛乳", date(2024, 9, 2)))
            .await
            .unwrap();

        assert!(second.id() > first.id());

        let products = store.get_all_products().await.unwrap();
        assert_eq!(products, vec![first, second]);
    }

    #[tokio::test]
    async fn reset_schema_restores_seed_set() {
        let config = StoreConfig::in_memory();
        let seed = config.seed.clone();
        let store = open(config).await;

        store
            .insert_product(NewProduct::new("extra", date(2030, 1, 1)))
            .await
            .unwrap();
        assert_eq!(store.get_all_products().await.unwrap().len(), 4);

        store.reset_schema().await.unwrap();

        let products = store.get_all_products().await.unwrap();
        assert_eq!(names_and_dates(&products), seed_pairs(&seed));
    }

    #[tokio::test]
    async fn read_before_initialize_is_a_storage_error() {
        let store = SqliteProductStore::connect(StoreConfig::in_memory())
            .await
            .unwrap();

        let err = store.get_all_products().await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn malformed_date_is_reported_as_decode_error() {
        let store = open(StoreConfig::in_memory().with_seed(Vec::new())).await;

        sqlx::query("INSERT INTO products (name, expirationDate) VALUES ('bad', 'soon')")
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.get_all_products().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn dates_are_persisted_as_iso_text() {
        let store = open(StoreConfig::in_memory()).await;

        let raw: Vec<String> = sqlx::query_scalar("SELECT expirationDate FROM products ORDER BY id")
            .fetch_all(&store.pool)
            .await
            .unwrap();

        assert_eq!(raw, vec!["2024-08-30", "2024-09-04", "2024-09-10"]);
    }

    #[tokio::test]
    async fn file_store_survives_reopen_and_resets_on_version_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("products.db");
        let today = date(2024, 8, 28);
        let seed = vec![NewProduct::new("食料", today + Days::new(2))];

        let store = open(StoreConfig::file(&path).with_seed(seed.clone())).await;
        store
            .insert_product(NewProduct::new("衣服", today + Days::new(10)))
            .await
            .unwrap();
        assert_eq!(store.stored_schema_version().await.unwrap(), 5);
        store.close().await;

        // Same version: rows survive.
        let store = open(StoreConfig::file(&path).with_seed(seed.clone())).await;
        assert_eq!(store.get_all_products().await.unwrap().len(), 2);
        store.close().await;

        // New version: drop, recreate, re-seed.
        let store = open(
            StoreConfig::file(&path)
                .with_seed(seed.clone())
                .with_schema_version(6),
        )
        .await;
        let products = store.get_all_products().await.unwrap();
        assert_eq!(names_and_dates(&products), seed_pairs(&seed));
        assert_eq!(store.stored_schema_version().await.unwrap(), 6);
        store.close().await;
    }

    #[tokio::test]
    async fn older_build_refuses_newer_schema_and_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.db");

        let store = open(StoreConfig::file(&path).with_schema_version(6)).await;
        store
            .insert_product(NewProduct::new("user row", date(2030, 1, 1)))
            .await
            .unwrap();
        store.close().await;

        let store = SqliteProductStore::connect(StoreConfig::file(&path).with_schema_version(5))
            .await
            .unwrap();
        let err = store.initialize().await.unwrap_err();
        assert_eq!(err, StoreError::schema_too_new(6, 5));
        assert_eq!(store.stored_schema_version().await.unwrap(), 6);

        let products = store.get_all_products().await.unwrap();
        assert_eq!(products.len(), 4);
        assert!(products.iter().any(|p| p.name() == "user row"));
        store.close().await;
    }
}
