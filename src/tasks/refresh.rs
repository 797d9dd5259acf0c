//! Auto-Refresh Task
//!
//! Background task that periodically refreshes the wallet.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::coordinator::WalletCoordinator;

/// Spawns a background task that refreshes the wallet at a fixed interval.
///
/// Ticks that fire while a cycle is still running join that cycle instead of
/// starting another one.
///
/// # Arguments
/// * `coordinator` - Coordinator to refresh
/// * `refresh_interval_secs` - Interval in seconds between refreshes
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_refresh_task(
    coordinator: WalletCoordinator,
    refresh_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(refresh_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting auto-refresh task with interval of {} seconds",
            refresh_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            coordinator.refresh().await;

            let state = coordinator.refresh_state().await;
            match state.last_error {
                Some(err) => info!("Auto-refresh: completed with error: {}", err),
                None => debug!("Auto-refresh: completed"),
            }
        }
    })
}
