use anyhow::Context;
use attendance_load::{Config, LoadRunner, RunSummary, install_prometheus_recorder, publish};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flip the stop flag on Ctrl-C so VUs stop starting new iterations
fn spawn_interrupt_listener(stop_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping VUs");
            let _ = stop_tx.send(true);
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_load=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = Config::from_env();
    config.validate()?;
    info!(
        "Loaded configuration: base_url={}, vus={}, duration={:?}, pause={:?}",
        config.base_url, config.run.vus, config.run.duration, config.run.pause
    );
    if let Some(threshold) = config.report.check_threshold {
        info!("Check threshold: {:.2}%", threshold * 100.0);
    }

    // Must precede the first recorded metric
    let prometheus_handle = install_prometheus_recorder(&config.report)?;

    let (stop_tx, stop_rx) = watch::channel(false);
    spawn_interrupt_listener(stop_tx);

    let runner = LoadRunner::over_http(config).context("Failed to build HTTP client")?;
    let config = runner.config();
    let results = runner
        .run_until(stop_rx)
        .await
        .context("Load run aborted during setup")?;

    let summary = RunSummary::from_results(&results, config.report.check_threshold);
    publish(&summary, &config.report, prometheus_handle.as_ref())?;

    Ok(())
}
