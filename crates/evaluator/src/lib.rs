//! `shelflife-evaluator`
//!
//! **Responsibility:** the periodic expiration check.
//!
//! Each run reads every product, computes whole days remaining against the
//! clock's "today", and raises one notification per product inside the
//! lookahead window. Only a failed store read fails the run.

pub mod alert;
pub mod config;
pub mod evaluator;

pub use alert::{scan, ExpiryAlert};
pub use config::{EvaluatorConfig, RepeatPolicy};
pub use evaluator::{EvaluationReport, ExpirationEvaluator};
