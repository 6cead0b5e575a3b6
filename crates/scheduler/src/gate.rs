//! Run gates: preconditions checked before every scheduled fire.

use serde::{Deserialize, Serialize};

/// Injected precondition for running scheduled work.
pub trait RunGate: Send + Sync + 'static {
    /// `true` if the work may run now.
    fn permits(&self) -> bool;
}

impl<F> RunGate for F
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn permits(&self) -> bool {
        self()
    }
}

/// Gate that never blocks.
#[derive(Debug, Default, Copy, Clone)]
pub struct AlwaysRun;

impl RunGate for AlwaysRun {
    fn permits(&self) -> bool {
        true
    }
}

/// Snapshot of the device power state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerState {
    pub battery_percent: u8,
    pub charging: bool,
}

/// Source of power state readings.
pub trait PowerSource: Send + Sync + 'static {
    /// `None` when the device has no battery or it cannot be read.
    fn power_state(&self) -> Option<PowerState>;
}

/// Skip runs while the battery is low and not charging.
#[derive(Debug, Clone)]
pub struct BatteryNotLow<P> {
    source: P,
    threshold_percent: u8,
}

impl<P: PowerSource> BatteryNotLow<P> {
    /// Level at or below which the battery counts as low.
    pub const DEFAULT_THRESHOLD_PERCENT: u8 = 15;

    pub fn new(source: P) -> Self {
        Self::with_threshold(source, Self::DEFAULT_THRESHOLD_PERCENT)
    }

    pub fn with_threshold(source: P, threshold_percent: u8) -> Self {
        Self {
            source,
            threshold_percent,
        }
    }
}

impl<P: PowerSource> RunGate for BatteryNotLow<P> {
    fn permits(&self) -> bool {
        match self.source.power_state() {
            None => true,
            Some(state) => state.charging || state.battery_percent > self.threshold_percent,
        }
    }
}
