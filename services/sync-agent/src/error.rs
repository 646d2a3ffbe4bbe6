//! Agent error types.

use thiserror::Error;

/// Errors touching the local cache and target files.
///
/// These are runtime errors: the engine reports them per mapping and moves
/// on, they never terminate the scheduling loop.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache document serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err: StorageError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().contains("denied"));
    }
}
