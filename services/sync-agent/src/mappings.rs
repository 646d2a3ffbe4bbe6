//! Mapping resolution from configuration input.
//!
//! Two declaration styles feed one resolved list: a comma-separated
//! `secretPath:targetFile` list and indexed `SECRET_PATH_<N>` /
//! `TARGET_FILE_<N>` pairs. List entries come first, then indexed entries
//! in ascending numeric order. When neither style yields an entry the agent
//! runs in single-mapping mode off `SECRET_PATH` / `TARGET_FILE`.

use crate::config::ConfigError;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Target file used in single-mapping mode when none is configured.
pub const DEFAULT_TARGET_FILE: &str = "secrets.env";

/// One configured association between a secret path and a destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Location within the remote KV store
    pub secret_path: String,
    /// Destination file the snapshot is materialized into
    pub target_file: PathBuf,
}

impl Mapping {
    /// Create a mapping.
    pub fn new(secret_path: impl Into<String>, target_file: impl Into<PathBuf>) -> Self {
        Self {
            secret_path: secret_path.into(),
            target_file: target_file.into(),
        }
    }
}

/// How the mapping set was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// One pair from `SECRET_PATH` / `TARGET_FILE`
    Single,
    /// Merged list and indexed declarations
    Multi,
}

/// Mapping set fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Declaration style in effect
    pub mode: SyncMode,
    /// Mappings in declaration order
    pub mappings: Vec<Mapping>,
}

/// Resolve the effective mapping list from configuration input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidMapping` for a list entry without a `:`
/// separator and `ConfigError::MissingRequired` when single-mapping mode
/// has no `SECRET_PATH`. Incomplete indexed pairs are skipped, not errors.
pub fn resolve(vars: &BTreeMap<String, String>) -> Result<Resolved, ConfigError> {
    let mut mappings = match vars.get("SECRET_MAPPINGS") {
        Some(list) => parse_list(list)?,
        None => Vec::new(),
    };
    mappings.extend(collect_indexed(vars));

    if mappings.is_empty() {
        let path = vars
            .get("SECRET_PATH")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("SECRET_PATH".to_string()))?;
        let target = vars
            .get("TARGET_FILE")
            .filter(|t| !t.is_empty())
            .map_or(DEFAULT_TARGET_FILE, String::as_str);

        return Ok(Resolved {
            mode: SyncMode::Single,
            mappings: vec![Mapping::new(path, target)],
        });
    }

    Ok(Resolved {
        mode: SyncMode::Multi,
        mappings,
    })
}

/// Parse the comma-separated list form. Empty segments are skipped; an
/// entry without a separator fails the whole resolution.
fn parse_list(value: &str) -> Result<Vec<Mapping>, ConfigError> {
    let mut mappings = Vec::new();

    for entry in value.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let unquoted = strip_quotes(entry);
        let Some((path, target)) = unquoted.split_once(':') else {
            return Err(ConfigError::InvalidMapping {
                entry: entry.to_string(),
                reason: "missing ':' separator".to_string(),
            });
        };

        mappings.push(Mapping::new(path.trim(), target.trim()));
    }

    Ok(mappings)
}

/// Collect indexed pairs. Only indices with both halves present and
/// non-empty are included; ordering follows the numeric index.
fn collect_indexed(vars: &BTreeMap<String, String>) -> Vec<Mapping> {
    let mut by_index: BTreeMap<u32, (Option<&str>, Option<&str>)> = BTreeMap::new();

    for (key, value) in vars {
        if let Some(index) = indexed_suffix(key, "SECRET_PATH_") {
            by_index.entry(index).or_default().0 = Some(value.as_str());
        } else if let Some(index) = indexed_suffix(key, "TARGET_FILE_") {
            by_index.entry(index).or_default().1 = Some(value.as_str());
        }
    }

    by_index
        .into_values()
        .filter_map(|pair| match pair {
            (Some(path), Some(target)) if !path.is_empty() && !target.is_empty() => {
                Some(Mapping::new(path, target))
            }
            _ => None,
        })
        .collect()
}

fn indexed_suffix(key: &str, prefix: &str) -> Option<u32> {
    key.strip_prefix(prefix)?.parse().ok()
}

/// Strip one pair of matching single or double quotes.
fn strip_quotes(entry: &str) -> &str {
    let bytes = entry.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &entry[1..entry.len() - 1];
        }
    }
    entry
}
