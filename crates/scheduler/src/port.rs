use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::request::PeriodicWorkRequest;
use crate::task::PeriodicTask;

/// Scheduling port error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("work already registered: {0}")]
    AlreadyRegistered(String),
    #[error("work not registered: {0}")]
    NotRegistered(String),
    #[error("invalid interval for {0}: must be greater than zero")]
    InvalidInterval(String),
}

/// Registry of periodic work.
///
/// Lifecycle: `register` at process start, fires every `interval` while the
/// request's gate permits, `deregister` (or `shutdown`) when the process stops.
#[async_trait]
pub trait SchedulingPort: Send + Sync {
    /// Start firing `task` according to `request`. Names are unique.
    fn register(
        &self,
        request: PeriodicWorkRequest,
        task: Arc<dyn PeriodicTask>,
    ) -> Result<(), ScheduleError>;

    /// Stop firing the named work, waiting for an in-flight run to finish.
    async fn deregister(&self, name: &str) -> Result<(), ScheduleError>;

    /// Deregister everything.
    async fn shutdown(&self);
}
