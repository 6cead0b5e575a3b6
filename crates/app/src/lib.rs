//! `shelflife-app`
//!
//! **Responsibility:** process wiring for the shelflife daemon.
//!
//! Opens and initializes the record store, publishes chart data, and
//! registers the daily expiration check with the scheduler.

pub mod app;
pub mod config;
pub mod power;

pub use app::{App, EXPIRATION_CHECK_WORK};
pub use config::{AppConfig, ConfigError};
pub use power::SysfsPowerSource;
