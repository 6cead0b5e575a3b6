use anyhow::Context;
use shelflife_app::{App, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    shelflife_observability::init_with(config.log_format);

    tracing::info!(
        lookahead_days = config.lookahead.max_days,
        check_interval_secs = config.check_interval.as_secs(),
        notifications = %config.notifications,
        "starting shelflife"
    );

    let app = App::start(config).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");

    app.shutdown().await;
    Ok(())
}
