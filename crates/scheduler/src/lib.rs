//! Periodic background work.
//!
//! ## Design
//!
//! - Work is registered against an explicit [`SchedulingPort`] at process start
//!   and deregistered on shutdown (`register → periodic fire → deregister`)
//! - Every fire is preceded by a [`RunGate`] check (e.g. "battery not low")
//! - A task answers each fire with a [`TaskOutcome`]; `Retry` triggers backoff
//!   retries inside the same cycle, governed by a [`RetryPolicy`]
//! - Per-registration statistics for visibility
//!
//! ## Components
//!
//! - `PeriodicTask`: the unit of work
//! - `PeriodicWorkRequest`: name, interval, retry policy and gate
//! - `TokioScheduler`: one tokio task per registration

pub mod gate;
pub mod policy;
pub mod port;
pub mod request;
pub mod task;
pub mod tokio_scheduler;

pub use gate::{AlwaysRun, BatteryNotLow, PowerSource, PowerState, RunGate};
pub use policy::{BackoffStrategy, RetryPolicy};
pub use port::{ScheduleError, SchedulingPort};
pub use request::PeriodicWorkRequest;
pub use task::{PeriodicTask, TaskOutcome};
pub use tokio_scheduler::{TokioScheduler, WorkStats};
