//! Application lifecycle.

use std::sync::Arc;

use anyhow::Context;
use shelflife_chart::{ChartSeries, ExpirationChart};
use shelflife_core::SystemClock;
use shelflife_evaluator::{EvaluatorConfig, ExpirationEvaluator};
use shelflife_notify::{NotificationChannel, NotificationSink, Notifier, TracingSink};
use shelflife_scheduler::{
    BatteryNotLow, PeriodicWorkRequest, SchedulingPort, TokioScheduler, WorkStats,
};
use shelflife_store::{default_db_path, ProductStore, SqliteProductStore, StoreConfig};

use crate::config::AppConfig;
use crate::power::SysfsPowerSource;

/// Name the expiration check is registered under.
pub const EXPIRATION_CHECK_WORK: &str = "expiration-check";

/// A running shelflife process.
#[derive(Debug)]
pub struct App {
    store: SqliteProductStore,
    scheduler: TokioScheduler,
}

impl App {
    /// Open the store and register the periodic expiration check, posting
    /// notifications through the tracing pipeline.
    pub async fn start(config: AppConfig) -> anyhow::Result<Self> {
        let sink = TracingSink::new(NotificationChannel::default(), config.notifications);
        Self::start_with_sink(config, Arc::new(sink)).await
    }

    /// Same as [`App::start`] with an explicit notification sink.
    ///
    /// Notification permission is requested before the check is scheduled.
    pub async fn start_with_sink(
        config: AppConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> anyhow::Result<Self> {
        let db_path = match config.db_path.clone() {
            Some(path) => path,
            None => default_db_path().context("failed to determine product database path")?,
        };

        let store_config = StoreConfig::file(&db_path).with_schema_version(config.schema_version);
        let store = SqliteProductStore::connect(store_config)
            .await
            .with_context(|| format!("failed to open product database at {db_path:?}"))?;
        store
            .initialize()
            .await
            .context("failed to initialize product database")?;

        tracing::info!(db_path = %db_path.display(), "product store ready");

        let notifier = Notifier::new(sink);
        match notifier.request_permission() {
            Ok(permission) => tracing::info!(%permission, "notification permission resolved"),
            Err(err) => tracing::warn!(error = %err, "permission confirmation not delivered"),
        }

        let evaluator = ExpirationEvaluator::new(
            store.clone(),
            SystemClock,
            notifier,
            EvaluatorConfig::default()
                .with_lookahead(config.lookahead)
                .with_repeat(config.repeat),
        );

        let scheduler = TokioScheduler::new();
        scheduler
            .register(
                PeriodicWorkRequest::new(EXPIRATION_CHECK_WORK, config.check_interval)
                    .with_gate(BatteryNotLow::new(SysfsPowerSource::default())),
                Arc::new(evaluator),
            )
            .context("failed to register expiration check")?;

        let app = Self { store, scheduler };

        let chart = app.chart().await?;
        let chart_json =
            serde_json::to_string(&chart).context("failed to serialize chart data")?;
        tracing::info!(points = chart.points.len(), chart = %chart_json, "chart data");

        Ok(app)
    }

    /// Chart data for the current product list, computed against today.
    pub async fn chart(&self) -> anyhow::Result<ChartSeries> {
        let products = self
            .store
            .get_all_products()
            .await
            .context("failed to read products for chart")?;

        Ok(ExpirationChart::new(SystemClock).build(&products))
    }

    pub fn store(&self) -> &SqliteProductStore {
        &self.store
    }

    pub fn check_stats(&self) -> Option<WorkStats> {
        self.scheduler.stats(EXPIRATION_CHECK_WORK)
    }

    /// Deregister scheduled work and close the store.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
        self.store.close().await;
        tracing::info!("shelflife stopped");
    }
}
