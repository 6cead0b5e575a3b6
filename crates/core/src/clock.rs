//! Source of "today".
//!
//! Every evaluation and chart build asks the clock again; nothing caches the
//! current date across calls.

use chrono::{Local, NaiveDate};

/// Calendar clock.
pub trait Clock: Send + Sync + 'static {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's local time zone.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date (tests, replays).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
