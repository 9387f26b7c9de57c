//! Shared key validation for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that are empty, traverse upwards or are absolute.
///
/// Both backends call this before touching the store so a key accepted by one
/// is accepted by the other.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/') || storage_key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key may not be absolute or traverse upwards: {}",
            storage_key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("video.mp4").is_ok());
        assert!(validate_key("renders/video.mp4").is_ok());
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("../etc/passwd"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("/etc/passwd"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("a/../b"), Err(StorageError::InvalidKey(_))));
        assert!(validate_key("take..two.mp4").is_ok());
    }
}
