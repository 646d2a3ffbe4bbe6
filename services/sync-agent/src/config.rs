//! Type-Safe Agent Configuration
//!
//! Loads every agent knob from environment variables with validation.
//! `Config::from_vars` accepts the variables as plain key/value pairs so
//! tests can build configurations without mutating the process environment;
//! `Config::from_env` is the thin wrapper the binary uses.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::duration;
use crate::mappings::{self, Mapping, SyncMode};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable that held the URL
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid duration string
    #[error("Invalid duration {input:?}: {reason}")]
    InvalidDuration {
        /// Original input text
        input: String,
        /// What made it unparseable
        reason: String,
    },

    /// Malformed secret mapping entry
    #[error("Invalid mapping entry {entry:?}: {reason}")]
    InvalidMapping {
        /// Offending list entry
        entry: String,
        /// What made it malformed
        reason: String,
    },

    /// Interval values must be positive
    #[error("Invalid interval for {0}: must be greater than 0")]
    InvalidInterval(String),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Agent configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vault server address
    pub vault_addr: Url,
    /// Vault token used for every request
    pub vault_token: SecretString,
    /// KV v2 mount name
    pub vault_mount: String,
    /// HTTP timeout for Vault requests
    pub vault_timeout: Duration,
    /// Whether one mapping or many were configured
    pub mode: SyncMode,
    /// Secret path to target file mappings, in configuration order
    pub mappings: Vec<Mapping>,
    /// How often secrets are polled for changes
    pub secrets_check_interval: Duration,
    /// How often the token TTL is checked
    pub token_check_interval: Duration,
    /// Remaining TTL at or below which the token is renewed
    pub token_renew_threshold: Duration,
    /// Directory holding cached secret snapshots
    pub cache_dir: PathBuf,
    /// Emit JSON logs instead of text
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// Reads a `.env` file first when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds configuration from explicit key/value pairs with validation.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let resolved = mappings::resolve(&vars)?;
        let token = vars
            .get("VAULT_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("VAULT_TOKEN".to_string()))?;

        let config = Self {
            vault_addr: parse_url_var(&vars, "VAULT_ADDR", "http://127.0.0.1:8200")?,
            vault_token: SecretString::from(token.clone()),
            vault_mount: vars
                .get("VAULT_MOUNT")
                .cloned()
                .unwrap_or_else(|| "secret".to_string()),
            vault_timeout: Duration::from_secs(parse_var(&vars, "VAULT_TIMEOUT_SECS", 30u64)?),
            mode: resolved.mode,
            mappings: resolved.mappings,
            secrets_check_interval: parse_duration_var(&vars, "SECRETS_CHECK_INTERVAL", 5)?,
            token_check_interval: parse_duration_var(&vars, "TOKEN_CHECK_INTERVAL", 60)?,
            token_renew_threshold: parse_duration_var(&vars, "TOKEN_RENEW_THRESHOLD", 60)?,
            cache_dir: PathBuf::from(vars.get("CACHE_DIR").map_or("cache", String::as_str)),
            log_json: vars
                .get("LOG_FORMAT")
                .is_some_and(|value| value.eq_ignore_ascii_case("json")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secrets_check_interval.is_zero() {
            return Err(ConfigError::InvalidInterval(
                "SECRETS_CHECK_INTERVAL".to_string(),
            ));
        }
        if self.token_check_interval.is_zero() {
            return Err(ConfigError::InvalidInterval(
                "TOKEN_CHECK_INTERVAL".to_string(),
            ));
        }
        if self.vault_mount.is_empty() {
            return Err(ConfigError::MissingRequired("VAULT_MOUNT".to_string()));
        }
        if self.vault_timeout.is_zero() {
            return Err(ConfigError::ParseError {
                name: "VAULT_TIMEOUT_SECS".to_string(),
                reason: "timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a variable with a default value.
fn parse_var<T: std::str::FromStr>(
    vars: &BTreeMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a URL variable with a default value.
fn parse_url_var(
    vars: &BTreeMap<String, String>,
    name: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let url_str = vars.get(name).map_or(default, String::as_str);
    Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a duration variable with a default in seconds.
fn parse_duration_var(
    vars: &BTreeMap<String, String>,
    name: &str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    match vars.get(name) {
        Some(value) => duration::parse(value).map(Duration::from_secs),
        None => Ok(Duration::from_secs(default_secs)),
    }
}
