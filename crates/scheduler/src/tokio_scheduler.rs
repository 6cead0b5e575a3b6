//! Tokio-backed scheduling port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::port::{ScheduleError, SchedulingPort};
use crate::request::PeriodicWorkRequest;
use crate::task::{PeriodicTask, TaskOutcome};

/// Runtime statistics of one registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkStats {
    /// Interval ticks that passed the gate.
    pub fires: u64,
    /// Interval ticks the gate refused.
    pub skipped: u64,
    /// Task invocations, retries included.
    pub runs: u64,
    pub successes: u64,
    pub failures: u64,
    /// Retries scheduled after a `Retry` outcome.
    pub retries: u64,
    /// Cycles that ran out of attempts.
    pub exhausted: u64,
}

struct Worker {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
    stats: Arc<Mutex<WorkStats>>,
}

/// Scheduling port running each registration on its own tokio task.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct TokioScheduler {
    workers: Mutex<HashMap<String, Worker>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics for the named registration.
    pub fn stats(&self, name: &str) -> Option<WorkStats> {
        self.workers()
            .get(name)
            .map(|worker| lock(&worker.stats).clone())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.workers().contains_key(name)
    }

    fn workers(&self) -> MutexGuard<'_, HashMap<String, Worker>> {
        lock(&self.workers)
    }
}

impl core::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<String> = self.workers().keys().cloned().collect();
        f.debug_struct("TokioScheduler")
            .field("registered", &names)
            .finish()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for worker in lock(&self.workers).values() {
            worker.shutdown.notify_one();
        }
    }
}

#[async_trait]
impl SchedulingPort for TokioScheduler {
    fn register(
        &self,
        request: PeriodicWorkRequest,
        task: Arc<dyn PeriodicTask>,
    ) -> Result<(), ScheduleError> {
        if request.interval.is_zero() {
            return Err(ScheduleError::InvalidInterval(request.name));
        }

        let mut workers = self.workers();
        if workers.contains_key(&request.name) {
            return Err(ScheduleError::AlreadyRegistered(request.name));
        }

        let name = request.name.clone();
        let shutdown = Arc::new(Notify::new());
        let stats = Arc::new(Mutex::new(WorkStats::default()));

        tracing::info!(
            work = %name,
            task = task.name(),
            interval_secs = request.interval.as_secs(),
            "periodic work registered"
        );

        let join = tokio::spawn(worker_loop(request, task, shutdown.clone(), stats.clone()));

        workers.insert(
            name,
            Worker {
                shutdown,
                join,
                stats,
            },
        );
        Ok(())
    }

    async fn deregister(&self, name: &str) -> Result<(), ScheduleError> {
        let removed = self.workers().remove(name);
        let worker = removed.ok_or_else(|| ScheduleError::NotRegistered(name.to_string()))?;

        worker.shutdown.notify_one();
        if let Err(err) = worker.join.await {
            tracing::warn!(work = %name, error = %err, "periodic work ended abnormally");
        }

        tracing::info!(work = %name, "periodic work deregistered");
        Ok(())
    }

    async fn shutdown(&self) {
        let names: Vec<String> = self.workers().keys().cloned().collect();
        for name in names {
            // A concurrent deregister may have won the race; nothing to do then.
            let _ = self.deregister(&name).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn worker_loop(
    request: PeriodicWorkRequest,
    task: Arc<dyn PeriodicTask>,
    shutdown: Arc<Notify>,
    stats: Arc<Mutex<WorkStats>>,
) {
    tracing::debug!(work = %request.name, "periodic worker started");

    let mut ticker = tokio::time::interval(request.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.notified() => {
                tracing::debug!(work = %request.name, "periodic worker received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                if !request.gate.permits() {
                    lock(&stats).skipped += 1;
                    tracing::debug!(work = %request.name, "skipping run - gate closed");
                    continue;
                }

                lock(&stats).fires += 1;
                if !run_cycle(&request, task.as_ref(), &shutdown, &stats).await {
                    break;
                }
            }
        }
    }

    tracing::debug!(work = %request.name, "periodic worker stopped");
}

/// Run the task, retrying with backoff while it asks for it.
///
/// Returns `false` if shutdown was requested during a backoff sleep.
async fn run_cycle(
    request: &PeriodicWorkRequest,
    task: &dyn PeriodicTask,
    shutdown: &Notify,
    stats: &Mutex<WorkStats>,
) -> bool {
    let mut attempts = 0u32;

    loop {
        let outcome = task.run().await;
        attempts += 1;
        lock(stats).runs += 1;

        let reason = match outcome {
            TaskOutcome::Success => {
                lock(stats).successes += 1;
                tracing::debug!(work = %request.name, attempts, "run succeeded");
                return true;
            }
            TaskOutcome::Failure(reason) => {
                lock(stats).failures += 1;
                tracing::warn!(work = %request.name, attempts, %reason, "run failed");
                return true;
            }
            TaskOutcome::Retry(reason) => reason,
        };

        lock(stats).failures += 1;

        if !request.retry.should_retry(attempts) {
            lock(stats).exhausted += 1;
            tracing::error!(
                work = %request.name,
                attempts,
                %reason,
                "run failed; retries exhausted until next period"
            );
            return true;
        }

        let delay = request.retry.delay_for_attempt(attempts);
        lock(stats).retries += 1;
        tracing::warn!(
            work = %request.name,
            attempts,
            %reason,
            "run failed, retrying in {:?}",
            delay
        );

        tokio::select! {
            biased;
            _ = shutdown.notified() => return false,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::policy::RetryPolicy;

    /// Task that replays scripted outcomes, then succeeds forever.
    struct ScriptedTask {
        runs: AtomicUsize,
        script: Mutex<Vec<TaskOutcome>>,
    }

    impl ScriptedTask {
        fn new(mut script: Vec<TaskOutcome>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                script: Mutex::new(script),
            })
        }

        fn succeeding() -> Arc<Self> {
            Self::new(Vec::new())
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PeriodicTask for ScriptedTask {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn run(&self) -> TaskOutcome {
            self.runs.fetch_add(1, Ordering::SeqCst);
            lock(&self.script).pop().unwrap_or(TaskOutcome::Success)
        }
    }

    fn retry(reason: &str) -> TaskOutcome {
        TaskOutcome::Retry(reason.to_string())
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn fires_immediately_then_every_interval() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::succeeding();

        scheduler
            .register(
                PeriodicWorkRequest::new("check", Duration::from_secs(60)),
                task.clone(),
            )
            .unwrap();

        advance(1).await;
        assert_eq!(task.runs(), 1);

        advance(60).await;
        assert_eq!(task.runs(), 2);

        advance(120).await;
        assert_eq!(task.runs(), 4);

        let stats = scheduler.stats("check").unwrap();
        assert_eq!(stats.fires, 4);
        assert_eq!(stats.successes, 4);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn closed_gate_skips_runs() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::succeeding();
        let open = Arc::new(AtomicBool::new(false));
        let gate_flag = open.clone();

        scheduler
            .register(
                PeriodicWorkRequest::new("check", Duration::from_secs(60))
                    .with_gate(move || gate_flag.load(Ordering::SeqCst)),
                task.clone(),
            )
            .unwrap();

        advance(130).await;
        assert_eq!(task.runs(), 0);
        assert_eq!(scheduler.stats("check").unwrap().skipped, 3);

        open.store(true, Ordering::SeqCst);
        advance(60).await;
        assert_eq!(task.runs(), 1);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn retry_outcome_backs_off_within_the_cycle() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::new(vec![retry("db locked"), retry("db locked")]);

        scheduler
            .register(
                PeriodicWorkRequest::daily("check")
                    .with_retry(RetryPolicy::fixed(3, Duration::from_secs(10))),
                task.clone(),
            )
            .unwrap();

        advance(1).await;
        assert_eq!(task.runs(), 1);

        advance(10).await;
        assert_eq!(task.runs(), 2);

        advance(10).await;
        assert_eq!(task.runs(), 3);

        let stats = scheduler.stats("check").unwrap();
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.exhausted, 0);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_wait_for_next_period() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::new(vec![retry("a"), retry("b"), retry("c")]);

        scheduler
            .register(
                PeriodicWorkRequest::new("check", Duration::from_secs(3600))
                    .with_retry(RetryPolicy::fixed(2, Duration::from_secs(10))),
                task.clone(),
            )
            .unwrap();

        advance(100).await;
        assert_eq!(task.runs(), 2);
        assert_eq!(scheduler.stats("check").unwrap().exhausted, 1);

        advance(3600).await;
        assert_eq!(task.runs(), 4);
        assert_eq!(scheduler.stats("check").unwrap().successes, 1);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_outcome_is_not_retried() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::new(vec![TaskOutcome::Failure("bad".to_string())]);

        scheduler
            .register(PeriodicWorkRequest::daily("check"), task.clone())
            .unwrap();

        advance(600).await;
        assert_eq!(task.runs(), 1);
        assert_eq!(scheduler.stats("check").unwrap().retries, 0);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn deregister_stops_firing() {
        let scheduler = TokioScheduler::new();
        let task = ScriptedTask::succeeding();

        scheduler
            .register(
                PeriodicWorkRequest::new("check", Duration::from_secs(60)),
                task.clone(),
            )
            .unwrap();

        advance(1).await;
        scheduler.deregister("check").await.unwrap();
        assert!(!scheduler.is_registered("check"));

        advance(600).await;
        assert_eq!(task.runs(), 1);

        assert_eq!(
            scheduler.deregister("check").await,
            Err(ScheduleError::NotRegistered("check".to_string()))
        );
    }

    #[tokio::test]
    async fn duplicate_and_zero_interval_registrations_are_rejected() {
        let scheduler = TokioScheduler::new();

        scheduler
            .register(PeriodicWorkRequest::daily("check"), ScriptedTask::succeeding())
            .unwrap();

        assert_eq!(
            scheduler.register(PeriodicWorkRequest::daily("check"), ScriptedTask::succeeding()),
            Err(ScheduleError::AlreadyRegistered("check".to_string()))
        );
        assert_eq!(
            scheduler.register(
                PeriodicWorkRequest::new("other", Duration::ZERO),
                ScriptedTask::succeeding()
            ),
            Err(ScheduleError::InvalidInterval("other".to_string()))
        );

        scheduler.shutdown().await;
        assert!(!scheduler.is_registered("check"));
    }
}
