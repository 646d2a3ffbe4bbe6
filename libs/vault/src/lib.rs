//! HashiCorp Vault client for the secret sync agent.
//!
//! Provides KV v2 secret reads and token lifecycle operations behind the
//! [`SecretStore`] trait.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use provider::SecretStore;
pub use secrets::{SecretSnapshot, TokenStatus};
