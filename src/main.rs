//! Wallet Core - demo daemon
//!
//! Runs the orchestration core against the in-memory mock backend and logs
//! the wallet state after each auto-refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_core::models::{ArkBalance, OnchainBalance};
use wallet_core::source::{MockDataSource, MockResponses};
use wallet_core::store::MemoryStore;
use wallet_core::{spawn_persistence_task, spawn_refresh_task, Config, WalletCoordinator};

/// Main entry point for the demo daemon.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the persistence worker
/// 4. Build the coordinator and initialize the wallet
/// 5. Start the auto-refresh task
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting wallet core");

    let config = Config::from_env();
    info!(
        "Configuration loaded: block_height_ttl={}s, ark_info_ttl={}s",
        config.block_height_ttl, config.ark_info_ttl
    );
    info!(
        "Configuration loaded: persistence_queue_size={}, refresh_interval={}s",
        config.persistence_queue_size, config.refresh_interval
    );

    let store = Arc::new(MemoryStore::new());
    let (persistence, persistence_handle) =
        spawn_persistence_task(store.clone(), config.persistence_queue_size);

    let source = Arc::new(
        MockDataSource::new(MockResponses {
            ark_balance: Ok(ArkBalance::spendable(50_000)),
            onchain_balance: Ok(OnchainBalance::confirmed(120_000)),
            block_height: Ok(850_000),
            wallet_exists: Ok(false),
            ..MockResponses::default()
        })
        .with_latency(Duration::from_millis(200)),
    );
    let coordinator = WalletCoordinator::new(source, persistence, &config);

    coordinator.initialize().await?;
    log_state(&coordinator).await;

    let refresh_handle = spawn_refresh_task(coordinator.clone(), config.refresh_interval);
    info!("Auto-refresh task started");

    shutdown_signal().await;

    refresh_handle.abort();
    coordinator.cancel_all();
    drop(coordinator);
    persistence_handle.abort();
    warn!("Background tasks aborted");

    info!("Persisted {} records", store.len().await);
    info!("Shutdown complete");
    Ok(())
}

async fn log_state(coordinator: &WalletCoordinator) {
    let balance = coordinator.current_balance().await;
    info!(
        "Wallet: total_spendable={:?} address={:?} transactions={} estimated_height={:?}",
        balance.total_spendable,
        coordinator.current_address().await,
        coordinator.transactions().await.len(),
        coordinator.estimated_block_height().await
    );
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
