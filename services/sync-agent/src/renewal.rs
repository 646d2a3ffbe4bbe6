//! Credential lifecycle checks.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vault_client::SecretStore;

/// Result of one renewal check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalStatus {
    /// TTL above threshold; no renewal attempted
    Active {
        /// Remaining credential lifetime
        ttl: Duration,
    },
    /// TTL at or below threshold; credential renewed
    Renewed {
        /// Lifetime before renewal
        old_ttl: Duration,
        /// Lifetime after renewal
        new_ttl: Duration,
    },
    /// Lookup or renewal failed; retried on the next check
    Failed {
        /// Underlying error message
        reason: String,
    },
}

/// Periodically renews the store credential before it expires.
pub struct TokenRenewer<S> {
    store: Arc<S>,
    threshold: Duration,
}

impl<S: SecretStore> TokenRenewer<S> {
    /// Create a renewer that triggers once TTL drops to `threshold`.
    pub fn new(store: Arc<S>, threshold: Duration) -> Self {
        Self { store, threshold }
    }

    /// Look up the credential TTL and renew when it reaches the threshold.
    ///
    /// Failures are reported and swallowed; a stale but working credential
    /// keeps working until actual expiry, so a transient renewal error
    /// must never take the agent down.
    pub async fn check_and_renew(&self) -> RenewalStatus {
        let status = match self.store.lookup_token().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Credential lookup failed");
                return RenewalStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if status.ttl > self.threshold {
            debug!(
                ttl_secs = status.ttl.as_secs(),
                renewable = status.renewable,
                "Credential TTL above renewal threshold"
            );
            return RenewalStatus::Active { ttl: status.ttl };
        }

        match self.store.renew_token().await {
            Ok(renewed) => {
                info!(
                    old_ttl_secs = status.ttl.as_secs(),
                    new_ttl_secs = renewed.ttl.as_secs(),
                    "Renewed credential"
                );
                RenewalStatus::Renewed {
                    old_ttl: status.ttl,
                    new_ttl: renewed.ttl,
                }
            }
            Err(e) => {
                warn!(error = %e, "Credential renewal failed");
                RenewalStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
