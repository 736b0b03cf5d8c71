//! Cache Key Module
//!
//! Validation rules shared by items, the pool and the storage backends.

use crate::cache::RESERVED_KEY_CHARS;
use crate::error::{CacheError, Result};

// == Validate Key ==
/// Checks that a key is usable by every backend.
///
/// A key must be non-empty and must not contain any of `( ) { } / \`.
/// Those characters are reserved for backend key-encoding schemes, such as
/// the file backend embedding the key in a file name.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }

    if let Some(reserved) = key.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(CacheError::InvalidKey(format!(
            "key '{}' contains reserved character '{}'",
            key, reserved
        )));
    }

    Ok(())
}
