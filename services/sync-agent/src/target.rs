//! Target file materialization.

use crate::error::StorageError;
use std::path::Path;
use tracing::debug;
use vault_client::SecretSnapshot;

/// Serialize a snapshot as `KEY=VALUE` lines.
///
/// Lines are joined with a newline and the result carries no trailing
/// newline. Values are written verbatim, so a value containing a newline
/// corrupts the format; that is a known limitation of the flat layout.
#[must_use]
pub fn render(snapshot: &SecretSnapshot) -> String {
    snapshot
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write a snapshot to its destination, creating parent directories as
/// needed and replacing any prior content.
///
/// # Errors
///
/// Returns a `StorageError` if a directory or the file cannot be written.
pub async fn write_target(snapshot: &SecretSnapshot, dest: &Path) -> Result<(), StorageError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(dest, render(snapshot)).await?;

    debug!(path = %dest.display(), keys = snapshot.len(), "Wrote target file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(pairs: &[(&str, &str)]) -> SecretSnapshot {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn test_render_key_value_lines() {
        let rendered = render(&snapshot(&[("USER", "alice"), ("PASS", "x1")]));
        assert_eq!(rendered, "PASS=x1\nUSER=alice");
    }

    #[test]
    fn test_render_no_trailing_newline() {
        let rendered = render(&snapshot(&[("K", "v")]));
        assert_eq!(rendered, "K=v");
        assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn test_render_empty_snapshot() {
        assert_eq!(render(&snapshot(&[])), "");
    }

    #[test]
    fn test_render_values_verbatim() {
        let rendered = render(&snapshot(&[("URL", "postgres://u:p@host:5432/db?ssl=true")]));
        assert_eq!(rendered, "URL=postgres://u:p@host:5432/db?ssl=true");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("deep/nested/db.env");

        write_target(&snapshot(&[("K", "v")]), &dest).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "K=v");
    }

    #[tokio::test]
    async fn test_write_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("db.env");

        write_target(&snapshot(&[("A", "1"), ("B", "2")]), &dest).await.unwrap();
        write_target(&snapshot(&[("A", "3")]), &dest).await.unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "A=3");
    }

    #[tokio::test]
    async fn test_write_bare_filename() {
        let dir = tempfile::tempdir().unwrap();
        let prev = std::env::current_dir().unwrap();

        // Relative destination with no parent component.
        std::env::set_current_dir(dir.path()).unwrap();
        let result = write_target(&snapshot(&[("K", "v")]), Path::new("bare.env")).await;
        std::env::set_current_dir(prev).unwrap();

        result.unwrap();
    }
}
