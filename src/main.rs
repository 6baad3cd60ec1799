// src/main.rs
use anyhow::Context;
use log::{error, info, warn};
use risklens_dashboard::{
    config::{load_config, Config},
    dashboard::{DashboardStateStore, DashboardView, RefreshReport},
    simulation::{RunOutcome, SimulationController},
    utils::setup_logging,
    HttpDataClient, RemoteDataClient,
};
use std::sync::Arc;

fn log_view(view: &DashboardView) {
    info!(
        "📊 Transactions: {} | Fraud detected: {} ({:.2}%) | Avg risk: {:.2} | Potential loss: ${:.2}",
        view.stats.total_transactions,
        view.stats.fraud_detected,
        view.stats.fraud_rate_pct(),
        view.stats.avg_risk,
        view.stats.potential_loss
    );
    let heights: Vec<String> = view
        .trend_heights_pct()
        .iter()
        .map(|h| format!("{:.0}", h))
        .collect();
    info!("📈 Fraud trend ({} points, % of peak): [{}]", view.trends.len(), heights.join(", "));
    info!(
        "🧾 Latest {} transactions, {} flagged",
        view.transactions.len(),
        view.flagged_transactions().count()
    );
    for tx in view.transactions.iter() {
        info!(
            "   #{} ${:.2} at {}{}",
            tx.id,
            tx.amount,
            tx.timestamp.format("%Y-%m-%d %H:%M"),
            if tx.is_fraud { "  ⚠️ FLAGGED" } else { "" }
        );
    }
}

fn log_failed_legs(report: &RefreshReport) {
    for (leg, e) in &report.failed_legs {
        if e.is_recoverable() {
            warn!("{} still stale, will retry next refresh: {}", leg.as_str(), e);
        } else {
            error!("{} rejected by backend contract [{}]: {}", leg.as_str(), e.categorize().as_str(), e);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logging(Config::from_env().log_level_filter()).context("Failed to initialize logging")?;
    let config = load_config().context("Failed to load dashboard configuration")?;
    info!("🚀 RiskLens dashboard starting against {}", config.api_url);

    let client: Arc<dyn RemoteDataClient> = Arc::new(HttpDataClient::from_config(&config)?);

    match client.health().await {
        Ok(status) if status.is_healthy() => info!("Backend healthy"),
        Ok(status) => warn!("Backend reports status '{}'", status.status),
        Err(e) => warn!("Backend health probe failed: {}", e),
    }

    let store = DashboardStateStore::new(client.clone())
        .with_transaction_limit(config.transaction_limit)
        .with_request_timeout(config.request_timeout());

    log_failed_legs(&store.refresh_all().await);
    log_view(&store.view().await);

    let simulator = SimulationController::from_config(client.clone(), &config)?;
    match simulator.run().await {
        RunOutcome::Completed(result) => info!(
            "🎲 +{:.0}% volume: p95 loss ${:.2}, mean projected loss ${:.2}",
            simulator.view().await.volume_increase * 100.0,
            result.p95_loss,
            result.mean_projected_loss
        ),
        RunOutcome::Failed(e) => warn!("Startup simulation unavailable: {}", e),
        RunOutcome::AlreadyRunning => {}
    }

    let Some(interval) = config.refresh_interval() else {
        return Ok(());
    };

    info!("Refreshing every {}s; press Ctrl-C to stop", interval.as_secs());
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                log_failed_legs(&store.refresh_all().await);
                log_view(&store.view().await);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
