//! Vault client configuration.

use crate::error::{VaultError, VaultResult};
use std::time::Duration;

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub addr: String,
    /// KV v2 mount the agent reads secret paths under
    pub mount: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: "http://127.0.0.1:8200".to_string(),
            mount: "secret".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration for the given server address.
    ///
    /// A trailing slash on the address is stripped so request URLs never
    /// contain double slashes.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set the KV mount name.
    #[must_use]
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidConfig` if the address is not a valid URL
    /// or the mount name is empty.
    pub fn validate(&self) -> VaultResult<()> {
        url::Url::parse(&self.addr)
            .map_err(|e| VaultError::InvalidConfig(format!("invalid addr '{}': {e}", self.addr)))?;

        if self.mount.is_empty() {
            return Err(VaultError::InvalidConfig("mount must not be empty".to_string()));
        }

        Ok(())
    }
}
