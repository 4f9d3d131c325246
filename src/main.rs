use std::path::Path;

use tracing::info;

use chairside::board::{Board, BoardConfig};
use chairside::config::Config;
use chairside::model::Ms;
use chairside::occupancy::now_ms;
use chairside::registry::ClinicRegistry;
use chairside::snapshot::Snapshot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    chairside::observability::init(config.metrics_port)?;

    let board_config = BoardConfig::new(config.utilization, config.work_day)?;
    let registry = ClinicRegistry::new(board_config);
    let board = registry.get_or_create(&config.clinic)?;

    info!("chairside board for clinic {}", board.clinic());
    info!("  snapshot: {}", config.snapshot_path.display());
    info!(
        "  slot: {} min, formula: {:?}, clamp: {}",
        config.utilization.slot_ms / 60_000,
        config.utilization.formula,
        config.utilization.clamp
    );
    info!("  refresh: {}", config.refresh.map_or("once".to_string(), |d| format!("every {}s", d.as_secs())));

    let Some(period) = config.refresh else {
        refresh(&board, &config.snapshot_path, config.at).await?;
        return Ok(());
    };

    // Polling mode: keep the last good snapshot when a reload fails.
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = refresh(&board, &config.snapshot_path, config.at).await {
                    metrics::counter!(chairside::observability::SNAPSHOT_ERRORS_TOTAL).increment(1);
                    tracing::error!("snapshot reload failed: {e}");
                }
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("chairside stopped");
    Ok(())
}

/// Load the snapshot file, swap it into the board, and print the result as JSON.
async fn refresh(board: &Board, path: &Path, at: Option<Ms>) -> Result<(), Box<dyn std::error::Error>> {
    let json = tokio::fs::read_to_string(path).await?;
    let snapshot = Snapshot::from_json(&json)?;
    let update = board.replace_snapshot(snapshot, at.unwrap_or_else(now_ms)).await;
    println!("{}", serde_json::to_string(&update)?);
    Ok(())
}
