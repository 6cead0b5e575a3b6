//! The expiration evaluator and its periodic-task adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shelflife_core::{Clock, ProductId, RunId, StoreResult};
use shelflife_notify::{DeliveryOutcome, Notifier};
use shelflife_scheduler::{PeriodicTask, TaskOutcome};
use shelflife_store::ProductStore;

use crate::alert::{scan, ExpiryAlert};
use crate::config::{EvaluatorConfig, RepeatPolicy};

/// Summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub run_id: RunId,
    pub today: NaiveDate,
    /// Products read from the store.
    pub scanned: usize,
    /// Notification events emitted this run.
    pub alerts: Vec<ExpiryAlert>,
    pub delivered: usize,
    /// Dropped because notification permission was not granted.
    pub suppressed: usize,
    /// Rejected by the sink after permission was granted.
    pub failed: usize,
    /// In the window, but held back by the repeat policy.
    pub held_back: usize,
}

/// Periodic expiration check over a product store.
pub struct ExpirationEvaluator<S, C> {
    store: S,
    clock: C,
    notifier: Notifier,
    config: EvaluatorConfig,
    /// Last day each product was delivered a notification.
    last_notified: Mutex<HashMap<ProductId, NaiveDate>>,
}

impl<S, C> ExpirationEvaluator<S, C>
where
    S: ProductStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, notifier: Notifier, config: EvaluatorConfig) -> Self {
        Self {
            store,
            clock,
            notifier,
            config,
            last_notified: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Run one evaluation against the store.
    ///
    /// Fails only when the store cannot be read; notification outcomes are
    /// reported in the returned summary.
    pub async fn evaluate(&self) -> StoreResult<EvaluationReport> {
        let run_id = RunId::new();
        let products = self.store.get_all_products().await?;
        let today = self.clock.today();

        let candidates = scan(&products, today, self.config.lookahead);

        let mut report = EvaluationReport {
            run_id,
            today,
            scanned: products.len(),
            alerts: Vec::with_capacity(candidates.len()),
            delivered: 0,
            suppressed: 0,
            failed: 0,
            held_back: 0,
        };

        let mut ledger = self.ledger();
        ledger.retain(|id, _| candidates.iter().any(|a| a.product_id == *id));

        for alert in candidates {
            if let RepeatPolicy::MinDaysBetween(days) = self.config.repeat {
                let recent = ledger.get(&alert.product_id).is_some_and(|last| {
                    today.signed_duration_since(*last).num_days() < i64::from(days)
                });
                if recent {
                    report.held_back += 1;
                    continue;
                }
            }

            let notification = self.config.template.render(&alert.name, alert.days_remaining);
            match self.notifier.notify(&notification) {
                Ok(DeliveryOutcome::Delivered) => {
                    report.delivered += 1;
                    ledger.insert(alert.product_id, today);
                }
                Ok(DeliveryOutcome::Suppressed) => report.suppressed += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        %run_id,
                        product_id = %alert.product_id,
                        error = %err,
                        "failed to deliver expiration notification"
                    );
                }
            }

            report.alerts.push(alert);
        }
        drop(ledger);

        tracing::info!(
            %run_id,
            %today,
            scanned = report.scanned,
            alerts = report.alerts.len(),
            delivered = report.delivered,
            suppressed = report.suppressed,
            held_back = report.held_back,
            "expiration check completed"
        );

        Ok(report)
    }

    fn ledger(&self) -> MutexGuard<'_, HashMap<ProductId, NaiveDate>> {
        self.last_notified
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<S, C> PeriodicTask for ExpirationEvaluator<S, C>
where
    S: ProductStore,
    C: Clock,
{
    fn name(&self) -> &str {
        "expiration-check"
    }

    async fn run(&self) -> TaskOutcome {
        match self.evaluate().await {
            Ok(_) => TaskOutcome::Success,
            Err(err) => {
                tracing::error!(error = %err, "expiration check could not read products");
                TaskOutcome::Retry(err.to_string())
            }
        }
    }
}
