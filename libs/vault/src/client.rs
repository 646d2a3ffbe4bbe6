//! Vault HTTP client with owned credential state.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    provider::SecretStore,
    secrets::{AuthResponse, KvResponse, LookupResponse, SecretSnapshot, TokenStatus},
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// Vault client holding the active credential.
///
/// The token is owned exclusively by this client. `renew_token` is the
/// single operation that replaces it; readers always pick up the current
/// value on their next request.
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
    token: RwLock<SecretString>,
}

impl VaultClient {
    /// Create a new Vault client with an initial token.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidConfig` for an unusable configuration or
    /// `VaultError::Http` if the HTTP client cannot be built.
    pub fn new(config: VaultConfig, token: SecretString) -> VaultResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VaultError::Http)?;

        Ok(Self {
            config,
            http,
            token: RwLock::new(token),
        })
    }

    async fn current_token(&self) -> Zeroizing<String> {
        Zeroizing::new(self.token.read().await.expose_secret().to_string())
    }

    async fn do_request<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> VaultResult<T> {
        let token = self.current_token().await;
        let url = format!("{}/v1/{}", self.config.addr, path);

        let response = self
            .http
            .request(method, &url)
            .header("X-Vault-Token", token.as_str())
            .send()
            .await
            .map_err(|e| VaultError::unavailable(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            401 => {
                let text = response.text().await.unwrap_or_default();
                return Err(VaultError::auth_failed(format!("Status {status}: {text}")));
            }
            403 => return Err(VaultError::PermissionDenied(path.to_string())),
            404 => return Err(VaultError::not_found(path)),
            s if s >= 500 => {
                let text = response.text().await.unwrap_or_default();
                return Err(VaultError::unavailable(format!("Status {status}: {text}")));
            }
            _ if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(VaultError::unavailable(format!("Status {status}: {text}")));
            }
            _ => {}
        }

        response.json().await.map_err(VaultError::from)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    #[instrument(skip(self))]
    async fn read(&self, path: &str) -> VaultResult<SecretSnapshot> {
        debug!(path, "Reading secret");

        let response: KvResponse = self
            .do_request(
                reqwest::Method::GET,
                &format!("{}/data/{path}", self.config.mount),
            )
            .await?;

        debug!(path, version = response.data.metadata.version, "Fetched secret");
        response.data.into_snapshot().map_err(VaultError::from)
    }

    async fn lookup_token(&self) -> VaultResult<TokenStatus> {
        let response: LookupResponse = self
            .do_request(reqwest::Method::GET, "auth/token/lookup-self")
            .await?;

        Ok(TokenStatus {
            ttl: Duration::from_secs(response.data.ttl),
            renewable: response.data.renewable,
        })
    }

    async fn renew_token(&self) -> VaultResult<TokenStatus> {
        let response: AuthResponse = self
            .do_request(reqwest::Method::POST, "auth/token/renew-self")
            .await
            .map_err(|e| VaultError::renewal_failed(e.to_string()))?;

        let ttl = Duration::from_secs(response.auth.lease_duration);
        *self.token.write().await = response.auth.client_token;
        debug!(ttl_secs = ttl.as_secs(), "Renewed Vault token");

        Ok(TokenStatus {
            ttl,
            renewable: response.auth.renewable,
        })
    }
}
