//! Shared key derivation for originals and thumbnails.

/// Derives thumbnail keys and recognizes keys under the thumbnail prefix.
///
/// Thumbnails live next to originals in the same bucket. Objects under the prefix
/// must never be converted again, otherwise every thumbnail would spawn another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailKeys {
    prefix: String,
}

impl ThumbnailKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `thumbnails/{original_key}.jpg`
    pub fn thumbnail_key(&self, original_key: &str) -> String {
        format!("{}{}.jpg", self.prefix, original_key)
    }

    pub fn is_thumbnail(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }
}

impl Default for ThumbnailKeys {
    fn default() -> Self {
        Self::new("thumbnails/")
    }
}

/// Reject keys that could escape the flat key namespace.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("Storage key must not be empty".to_string());
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err("Storage key contains invalid path segments".to_string());
    }
    Ok(())
}
