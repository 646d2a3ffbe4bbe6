//! Startup pass and periodic timers.
//!
//! The agent runs one synchronous fetch pass, then arms two independent
//! timers: one polling secrets for changes, one checking credential TTL.
//! Each timer drives a single sequential loop, so a slow pass delays the
//! next tick of the same timer instead of overlapping it. The two timers
//! may interleave with each other; they share no state besides the store
//! client, which only the renewal path mutates.

use crate::renewal::TokenRenewer;
use crate::sync::{SyncEngine, SyncOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};
use vault_client::SecretStore;

/// Timer cadences for the two periodic jobs.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    /// Poll-for-changes period
    pub secrets_check: Duration,
    /// Credential-check period
    pub token_check: Duration,
}

/// Run the agent until a shutdown signal arrives.
pub async fn run<S>(engine: Arc<SyncEngine<S>>, renewer: Arc<TokenRenewer<S>>, cadence: Cadence)
where
    S: SecretStore + 'static,
{
    info!(mappings = engine.mappings().len(), "Running initial fetch pass");
    let outcomes = engine.initial_pass().await;
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, SyncOutcome::Failed { .. } | SyncOutcome::NoFallback))
        .count();
    info!(total = outcomes.len(), failed, "Initial fetch pass complete");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poll_task = tokio::spawn(poll_loop(
        Arc::clone(&engine),
        cadence.secrets_check,
        shutdown_rx.clone(),
    ));
    let renew_task = tokio::spawn(renew_loop(renewer, cadence.token_check, shutdown_rx));

    wait_for_signal().await;
    info!("Shutting down");

    let _ = shutdown_tx.send(true);
    if let Err(e) = poll_task.await {
        error!(error = %e, "Poll task failed");
    }
    if let Err(e) = renew_task.await {
        error!(error = %e, "Renewal task failed");
    }

    info!("Shutdown complete");
}

async fn poll_loop<S>(
    engine: Arc<SyncEngine<S>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: SecretStore + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The interval's first tick completes immediately; the startup pass
    // already covered it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.poll_pass().await;
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn renew_loop<S>(
    renewer: Arc<TokenRenewer<S>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: SecretStore + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                renewer.check_and_renew().await;
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Waits for SIGTERM or SIGINT.
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
