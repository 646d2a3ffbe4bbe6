//! Generic secret store trait.
//!
//! The sync engine is generic over this trait so tests can script store
//! behavior without a live Vault.

use crate::error::VaultResult;
use crate::secrets::{SecretSnapshot, TokenStatus};
use async_trait::async_trait;

/// Remote KV read and credential renewal capability.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the full snapshot of keys and values at a secret path.
    async fn read(&self, path: &str) -> VaultResult<SecretSnapshot>;

    /// Look up the remaining TTL of the active credential.
    async fn lookup_token(&self) -> VaultResult<TokenStatus>;

    /// Renew the active credential, replacing it with the result.
    async fn renew_token(&self) -> VaultResult<TokenStatus>;
}
