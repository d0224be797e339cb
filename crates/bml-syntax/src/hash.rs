//! Content hashing for parse caching
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest of source text.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content hash (Blake3)
///
/// Identical source text always yields the same hash, so parse results can be
/// shared between files and runs. Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self::new(*hash.as_bytes())
    }

    /// Hash source text together with a discriminator (the language name),
    /// so the same text parsed with two grammars gets two cache entries.
    #[must_use]
    pub fn of_source(discriminator: &str, text: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(discriminator.as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        Self::new(*hasher.finalize().as_bytes())
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short string representation (first 16 hex chars)
    #[must_use]
    pub fn short(&self) -> String {
        self.to_string()[..16].to_string()
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_identical_hash() {
        assert_eq!(ContentHash::compute(b"abc"), ContentHash::compute(b"abc"));
        assert_ne!(ContentHash::compute(b"abc"), ContentHash::compute(b"abd"));
    }

    #[test]
    fn discriminator_changes_hash() {
        let ts = ContentHash::of_source("typescript", "class A {}");
        let tsx = ContentHash::of_source("tsx", "class A {}");
        assert_ne!(ts, tsx);
    }

    #[test]
    fn display_is_hex() {
        let hash = ContentHash::compute(b"x");
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.short().len(), 16);
    }
}
