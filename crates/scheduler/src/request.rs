use std::sync::Arc;
use std::time::Duration;

use crate::gate::{AlwaysRun, RunGate};
use crate::policy::RetryPolicy;

/// Description of recurring work to register with a [`SchedulingPort`](crate::SchedulingPort).
#[derive(Clone)]
pub struct PeriodicWorkRequest {
    pub name: String,
    pub interval: Duration,
    pub retry: RetryPolicy,
    pub gate: Arc<dyn RunGate>,
}

impl PeriodicWorkRequest {
    pub const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            retry: RetryPolicy::default(),
            gate: Arc::new(AlwaysRun),
        }
    }

    pub fn daily(name: impl Into<String>) -> Self {
        Self::new(name, Self::DAILY)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_gate(mut self, gate: impl RunGate) -> Self {
        self.gate = Arc::new(gate);
        self
    }
}

impl core::fmt::Debug for PeriodicWorkRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeriodicWorkRequest")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
