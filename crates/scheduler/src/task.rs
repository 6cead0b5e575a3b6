use async_trait::async_trait;

/// Result of one task execution, reported back to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Completed; wait for the next period.
    Success,
    /// Failed permanently for this cycle; wait for the next period.
    Failure(String),
    /// Failed transiently; retry with backoff.
    Retry(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Work fired on a recurring schedule.
#[async_trait]
pub trait PeriodicTask: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run once. Runs are never cancelled midway.
    async fn run(&self) -> TaskOutcome;
}
