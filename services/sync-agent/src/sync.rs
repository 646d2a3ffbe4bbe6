//! Per-mapping fetch, compare and write orchestration.
//!
//! Two operations cover the agent's life cycle. `initial_fetch` runs once
//! at startup and degrades to cached values when the store rejects the
//! credential. `poll_for_changes` runs on every poll tick and only touches
//! disk when content actually changed. Authentication failures during
//! polling are reported without rewriting the target; the file on disk
//! already holds the last good state.

use crate::cache::CacheStore;
use crate::error::StorageError;
use crate::mappings::Mapping;
use crate::target;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vault_client::{SecretSnapshot, SecretStore, VaultError};

/// Result of one `initial_fetch` on one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh snapshot written to the target and persisted to cache
    Synced {
        /// Key names in the snapshot
        keys: Vec<String>,
    },
    /// Store rejected the credential; cached snapshot written instead
    FellBack {
        /// Key names in the cached snapshot
        keys: Vec<String>,
    },
    /// Store rejected the credential and no cache entry exists
    NoFallback,
    /// Any other failure; the cache keeps its previous entry
    Failed {
        /// Underlying error message
        reason: String,
    },
}

/// Result of one `poll_for_changes` on one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No cache entry existed; snapshot written and persisted
    FirstObservation {
        /// Key names in the snapshot
        keys: Vec<String>,
    },
    /// Snapshot content-equal to the cache; nothing written
    Unchanged,
    /// Content differs; target and cache updated
    Changed {
        /// Key names in the new snapshot
        keys: Vec<String>,
    },
    /// Store rejected the credential; reported only, target untouched
    AuthFailed {
        /// Underlying error message
        reason: String,
    },
    /// Any other failure; the cache keeps its previous entry
    Failed {
        /// Underlying error message
        reason: String,
    },
}

/// Orchestrates fetch, cache and target writes across the mapping set.
pub struct SyncEngine<S> {
    store: Arc<S>,
    cache: CacheStore,
    mappings: Vec<Mapping>,
}

impl<S: SecretStore> SyncEngine<S> {
    /// Create an engine over a fixed mapping set.
    pub fn new(store: Arc<S>, cache: CacheStore, mappings: Vec<Mapping>) -> Self {
        Self {
            store,
            cache,
            mappings,
        }
    }

    /// The mapping set this engine serves.
    #[must_use]
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Run `initial_fetch` for every mapping sequentially.
    ///
    /// One mapping's failure never aborts the rest; outcomes keep mapping
    /// order.
    pub async fn initial_pass(&self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            outcomes.push(self.initial_fetch(mapping).await);
        }
        outcomes
    }

    /// Run `poll_for_changes` for every mapping sequentially.
    pub async fn poll_pass(&self) -> Vec<PollOutcome> {
        let mut outcomes = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            outcomes.push(self.poll_for_changes(mapping).await);
        }
        outcomes
    }

    /// Fetch a mapping for the first time.
    ///
    /// On success the snapshot is written to the target and persisted to
    /// cache. On an authentication failure the cached snapshot, if any,
    /// is written to the target instead. A read failure leaves both
    /// untouched; a write failure is reported and the write is retried
    /// by the next poll.
    pub async fn initial_fetch(&self, mapping: &Mapping) -> SyncOutcome {
        match self.store.read(&mapping.secret_path).await {
            Ok(snapshot) => match self.persist_and_write(mapping, &snapshot).await {
                Ok(()) => {
                    let keys = key_names(&snapshot);
                    info!(
                        path = %mapping.secret_path,
                        target = %mapping.target_file.display(),
                        keys = ?keys,
                        "Synced secret"
                    );
                    SyncOutcome::Synced { keys }
                }
                Err(e) => {
                    error!(path = %mapping.secret_path, error = %e, "Failed to store snapshot");
                    SyncOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            Err(e) if e.is_auth_failure() => self.fall_back(mapping, &e).await,
            Err(e) => {
                error!(path = %mapping.secret_path, error = %e, "Failed to fetch secret");
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Re-fetch a mapping and write only when content changed.
    pub async fn poll_for_changes(&self, mapping: &Mapping) -> PollOutcome {
        let snapshot = match self.store.read(&mapping.secret_path).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_auth_failure() => {
                warn!(path = %mapping.secret_path, error = %e, "Authentication failure polling secret");
                return PollOutcome::AuthFailed {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                error!(path = %mapping.secret_path, error = %e, "Failed to poll secret");
                return PollOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let cached = match self.cache.load(mapping).await {
            Ok(cached) => cached,
            Err(e) => {
                error!(path = %mapping.secret_path, error = %e, "Failed to load cache entry");
                return PollOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match cached {
            None => match self.persist_and_write(mapping, &snapshot).await {
                Ok(()) => {
                    let keys = key_names(&snapshot);
                    info!(path = %mapping.secret_path, keys = ?keys, "Cached secret for the first time");
                    PollOutcome::FirstObservation { keys }
                }
                Err(e) => {
                    error!(path = %mapping.secret_path, error = %e, "Failed to store snapshot");
                    PollOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            Some(ref previous) if previous == &snapshot => {
                debug!(path = %mapping.secret_path, "Secret unchanged");
                PollOutcome::Unchanged
            }
            Some(_) => match self.persist_and_write(mapping, &snapshot).await {
                Ok(()) => {
                    let keys = key_names(&snapshot);
                    info!(
                        path = %mapping.secret_path,
                        target = %mapping.target_file.display(),
                        keys = ?keys,
                        "Secret values changed"
                    );
                    PollOutcome::Changed { keys }
                }
                Err(e) => {
                    error!(path = %mapping.secret_path, error = %e, "Failed to store snapshot");
                    PollOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
        }
    }

    /// Write the cached snapshot to the target after an authentication
    /// failure, leaving the target untouched when no entry exists.
    async fn fall_back(&self, mapping: &Mapping, cause: &VaultError) -> SyncOutcome {
        warn!(path = %mapping.secret_path, error = %cause, "Authentication failure fetching secret");

        match self.cache.load(mapping).await {
            Ok(Some(snapshot)) => {
                match target::write_target(&snapshot, &mapping.target_file).await {
                    Ok(()) => {
                        let keys = key_names(&snapshot);
                        warn!(
                            path = %mapping.secret_path,
                            target = %mapping.target_file.display(),
                            keys = ?keys,
                            "Wrote cached values as fallback"
                        );
                        SyncOutcome::FellBack { keys }
                    }
                    Err(e) => {
                        error!(path = %mapping.secret_path, error = %e, "Failed to write fallback");
                        SyncOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Ok(None) => {
                warn!(path = %mapping.secret_path, "No cached fallback available");
                SyncOutcome::NoFallback
            }
            Err(e) => {
                error!(path = %mapping.secret_path, error = %e, "Failed to load cache entry");
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Target first, then cache, so a failed target write leaves the
    /// cache stale and the next poll retries the write instead of
    /// reporting the mapping unchanged.
    async fn persist_and_write(
        &self,
        mapping: &Mapping,
        snapshot: &SecretSnapshot,
    ) -> Result<(), StorageError> {
        target::write_target(snapshot, &mapping.target_file).await?;
        self.cache.save(mapping, snapshot).await?;
        Ok(())
    }
}

fn key_names(snapshot: &SecretSnapshot) -> Vec<String> {
    snapshot.keys().cloned().collect()
}
