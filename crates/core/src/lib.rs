//! `shelflife-core` — product tracking building blocks.
//!
//! This crate contains **pure** primitives (no storage, no scheduling, no IO):
//! the product entity, its identifiers, calendar-day arithmetic and the
//! lookahead window used to decide when a product is nearing expiration.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod product;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{StoreError, StoreResult};
pub use id::{ProductId, RunId};
pub use product::{days_remaining, NewProduct, Product};
pub use window::LookaheadWindow;
