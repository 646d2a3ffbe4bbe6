//! Sync Agent - Vault secrets materialized into local env files.
//!
//! This crate provides the core functionality for the sync agent: mapping
//! resolution, a local snapshot cache, change-polling sync passes, and token
//! lifetime management, all driven by a small interval scheduler.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod duration;
pub mod error;
pub mod mappings;
pub mod observability;
pub mod renewal;
pub mod scheduler;
pub mod sync;
pub mod target;

pub use cache::CacheStore;
pub use config::{Config, ConfigError};
pub use error::StorageError;
pub use mappings::{Mapping, SyncMode};
pub use renewal::{RenewalStatus, TokenRenewer};
pub use sync::{PollOutcome, SyncEngine, SyncOutcome};
