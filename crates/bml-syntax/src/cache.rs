//! Content-addressed parse cache using moka
//!
//! Parsing is the most expensive host step. Files are keyed by the hash of
//! their (language, text) pair, so re-loading an unchanged file or loading two
//! files with identical content parses once.

use crate::error::HostError;
use crate::hash::ContentHash;
use crate::language::Language;
use crate::source::{FileId, SourceFile};
use moka::sync::Cache;
use std::sync::Arc;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Parse cache keyed by [`ContentHash`]
#[derive(Debug, Clone)]
pub struct ParseCache {
    inner: Cache<ContentHash, Arc<SourceFile>>,
}

impl ParseCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Get a parsed file, parsing and caching on miss
    ///
    /// # Errors
    /// Returns error if parsing fails
    pub fn get_or_parse(
        &self,
        id: FileId,
        language: Language,
        text: String,
    ) -> Result<Arc<SourceFile>, HostError> {
        let hash = ContentHash::of_source(language.name(), &text);

        if let Some(cached) = self.inner.get(&hash) {
            if *cached.id() == id {
                return Ok(cached);
            }
            tracing::trace!(file = %id, shared_with = %cached.id(), "reusing parse of identical content");
            return Ok(Arc::new(cached.with_id(id)));
        }

        let parsed = Arc::new(SourceFile::parse(id, language, text)?);
        self.inner.insert(hash, Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Check if cache contains hash
    #[inline]
    #[must_use]
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.inner.contains_key(hash)
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for ParseCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_hit_returns_same_arc() {
        let cache = ParseCache::new(16);
        let a = cache
            .get_or_parse(FileId::new("a.ts"), Language::TypeScript, "class A {}".into())
            .unwrap();
        let b = cache
            .get_or_parse(FileId::new("a.ts"), Language::TypeScript, "class A {}".into())
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.contains(&a.hash()));
    }

    #[test]
    fn identical_content_other_path_is_relabelled() {
        let cache = ParseCache::new(16);
        let a = cache
            .get_or_parse(FileId::new("a.ts"), Language::TypeScript, "class A {}".into())
            .unwrap();
        let b = cache
            .get_or_parse(FileId::new("b.ts"), Language::TypeScript, "class A {}".into())
            .unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(b.id().as_str(), "b.ts");
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn invalidate_all_empties_cache() {
        let cache = ParseCache::default();
        let a = cache
            .get_or_parse(FileId::new("a.ts"), Language::TypeScript, "class A {}".into())
            .unwrap();
        cache.invalidate_all();
        assert!(!cache.contains(&a.hash()));
    }
}
