//! Property-based tests for Vault client types.
//!
//! Validates that secret values never leak through Debug output and that
//! snapshot flattening preserves string values exactly.

use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use vault_client::secrets::{AuthData, KvData, KvMetadata};

// Strategy for generating secret values
fn secret_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{8,64}"
}

// Strategy for generating key names; all shorter than any generated value
// so containment checks cannot trip over a key.
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("USER".to_string()),
        Just("PASS".to_string()),
        Just("API_KEY".to_string()),
        Just("TOKEN".to_string()),
    ]
}

fn kv_data(data: BTreeMap<String, serde_json::Value>) -> KvData {
    KvData {
        data,
        metadata: KvMetadata {
            created_time: "2025-01-15T00:00:00Z".to_string(),
            version: 1,
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debug output of a KV payload shows key names and the redaction
    /// marker, never the values.
    #[test]
    fn prop_kv_debug_redacts_values(
        key in key_strategy(),
        value in secret_value_strategy(),
    ) {
        let mut data = BTreeMap::new();
        data.insert(key.clone(), serde_json::Value::String(value.clone()));
        let payload = kv_data(data);

        let debug_output = format!("{payload:?}");
        let without_marker = debug_output.replace("[REDACTED]", "");

        prop_assert!(
            !without_marker.contains(&value),
            "Debug output should not contain secret value"
        );
        prop_assert!(
            debug_output.contains(&key),
            "Debug output should contain the key name"
        );
        prop_assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should show [REDACTED]"
        );
    }

    /// String values survive snapshot flattening byte for byte, including
    /// characters that are special in the target file format.
    #[test]
    fn prop_snapshot_strings_verbatim(
        key in key_strategy(),
        value in "[ -~]{0,48}",
    ) {
        let mut data = BTreeMap::new();
        data.insert(key.clone(), serde_json::Value::String(value.clone()));

        let snapshot = kv_data(data).into_snapshot().unwrap();

        prop_assert_eq!(snapshot.get(&key), Some(&value));
    }

    /// Flattening preserves the key set.
    #[test]
    fn prop_snapshot_preserves_keys(
        values in prop::collection::btree_map("[A-Z][A-Z0-9_]{0,7}", 0u32..1000, 0..8),
    ) {
        let data: BTreeMap<String, serde_json::Value> = values
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
            .collect();
        let keys: Vec<String> = data.keys().cloned().collect();

        let snapshot = kv_data(data).into_snapshot().unwrap();

        prop_assert_eq!(snapshot.keys().cloned().collect::<Vec<_>>(), keys);
    }

    /// A renewed token never appears in Debug output of the auth payload.
    #[test]
    fn prop_auth_token_redacted(
        token in secret_value_strategy(),
        lease_duration in 0u64..86400,
    ) {
        let auth = AuthData {
            client_token: SecretString::from(token.clone()),
            lease_duration,
            renewable: true,
        };

        let debug_output = format!("{auth:?}");
        let without_marker = debug_output.replace("[REDACTED]", "");

        prop_assert!(
            !without_marker.contains(&token),
            "Debug output should not contain the token"
        );

        // The value stays reachable for the request layer.
        prop_assert_eq!(auth.client_token.expose_secret(), token.as_str());
    }
}

/// SecretString debug output stays redacted.
#[test]
fn test_secret_string_no_debug_leak() {
    let secret = SecretString::from("super-secret-password");
    let debug = format!("{secret:?}");
    assert!(!debug.contains("super-secret-password"));
}
