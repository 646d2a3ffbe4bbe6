//! Sync Agent - Main Entry Point
//!
//! Pulls secrets from Vault into local env files on a fixed cadence and
//! keeps the Vault token renewed along the way.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use sync_agent::cache::CacheStore;
use sync_agent::config::Config;
use sync_agent::observability;
use sync_agent::renewal::TokenRenewer;
use sync_agent::scheduler::{self, Cadence};
use sync_agent::sync::SyncEngine;
use vault_client::{VaultClient, VaultConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    observability::init(config.log_json);

    info!(
        mode = ?config.mode,
        mappings = config.mappings.len(),
        cache_dir = %config.cache_dir.display(),
        "Starting sync agent"
    );

    let vault_config = VaultConfig::new(config.vault_addr.as_str())
        .with_mount(&config.vault_mount)
        .with_timeout(config.vault_timeout);
    let client = Arc::new(
        VaultClient::new(vault_config, config.vault_token.clone())
            .context("building Vault client")?,
    );

    let engine = Arc::new(SyncEngine::new(
        Arc::clone(&client),
        CacheStore::new(&config.cache_dir),
        config.mappings.clone(),
    ));
    let renewer = Arc::new(TokenRenewer::new(
        Arc::clone(&client),
        config.token_renew_threshold,
    ));

    scheduler::run(
        engine,
        renewer,
        Cadence {
            secrets_check: config.secrets_check_interval,
            token_check: config.token_check_interval,
        },
    )
    .await;

    info!("Sync agent stopped");

    Ok(())
}
