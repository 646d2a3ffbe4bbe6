//! Wire types for the Vault HTTP API.

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// One complete read of all keys and values at a secret path.
///
/// Ordered map so serialization within one pass is stable.
pub type SecretSnapshot = BTreeMap<String, String>;

/// Vault KV v2 response wrapper
#[derive(Debug, Deserialize)]
pub struct KvResponse {
    pub data: KvData,
}

/// Inner KV v2 payload: the secret values plus version metadata.
#[derive(Deserialize)]
pub struct KvData {
    pub data: BTreeMap<String, serde_json::Value>,
    pub metadata: KvMetadata,
}

#[derive(Debug, Deserialize)]
pub struct KvMetadata {
    pub created_time: String,
    pub version: u32,
}

impl KvData {
    /// Flatten the raw payload into a string-to-string snapshot.
    ///
    /// JSON strings are taken verbatim; any other value (number, bool,
    /// nested structure) is rendered as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a non-string value cannot be
    /// rendered back to JSON.
    pub fn into_snapshot(self) -> Result<SecretSnapshot, serde_json::Error> {
        self.data
            .into_iter()
            .map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s,
                    other => serde_json::to_string(&other)?,
                };
                Ok((key, rendered))
            })
            .collect()
    }
}

// Secret values never appear in Debug output, only key names.
impl fmt::Debug for KvData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: BTreeMap<&str, &str> =
            self.data.keys().map(|k| (k.as_str(), "[REDACTED]")).collect();
        f.debug_struct("KvData")
            .field("data", &redacted)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Vault auth response, as returned by token renewal.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub auth: AuthData,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub client_token: SecretString,
    pub lease_duration: u64,
    pub renewable: bool,
}

/// Token lookup response.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    pub data: LookupData,
}

#[derive(Debug, Deserialize)]
pub struct LookupData {
    pub ttl: u64,
    pub renewable: bool,
}

/// Remaining lifetime of the active credential.
#[derive(Debug, Clone, Copy)]
pub struct TokenStatus {
    /// Time until the token expires
    pub ttl: Duration,
    /// Whether the token can be renewed
    pub renewable: bool,
}
