//! Record store configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use shelflife_core::{NewProduct, StoreError, StoreResult};

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Database file on disk (created if missing).
    File(PathBuf),
    /// Private in-memory database, dropped with the store.
    InMemory,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Schema version; a mismatch with the persisted version resets the table.
    pub schema_version: u32,
    /// Rows inserted whenever the table is (re)created.
    pub seed: Vec<NewProduct>,
}

impl StoreConfig {
    pub const DEFAULT_SCHEMA_VERSION: u32 = 5;

    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            schema_version: Self::DEFAULT_SCHEMA_VERSION,
            seed: default_seed(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::InMemory)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn with_seed(mut self, seed: Vec<NewProduct>) -> Self {
        self.seed = seed;
        self
    }
}

/// The three example records written on first creation.
pub fn default_seed() -> Vec<NewProduct> {
    [
        ("食料", 2024, 8, 30),
        ("衣服", 2024, 9, 4),
        ("食料", 2024, 9, 10),
    ]
    .into_iter()
    .filter_map(|(name, y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| NewProduct::new(name, date))
    })
    .collect()
}

/// Resolve the path to the product database:
/// `{app_data_dir}/shelflife/products.db`.
pub fn default_db_path() -> StoreResult<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or_else(|| {
            StoreError::unavailable(
                "failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share",
            )
        })?;

    let mut path = base;
    path.push("shelflife");
    path.push("products.db");

    Ok(path)
}
