//! Keyword to image URL cache.

use mini_moka::sync::Cache;
use std::sync::RwLock;

/// Session-scoped map from search keyword to the chosen remote image URL.
///
/// Entries never expire on their own; the whole cache is dropped when the
/// search parameters change.
pub struct KeywordCache {
    entries: RwLock<Cache<String, String>>,
}

impl KeywordCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Self::build()),
        }
    }

    fn build() -> Cache<String, String> {
        Cache::builder().build()
    }

    /// The generation live right now.
    ///
    /// A search holds on to the generation it started in, so a result that
    /// lands after [`clear`](Self::clear) goes into the discarded generation.
    pub fn generation(&self) -> CacheGeneration {
        CacheGeneration(self.entries.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    pub fn get(&self, keyword: &str) -> Option<String> {
        self.generation().get(keyword)
    }

    pub fn insert(&self, keyword: &str, url: &str) {
        self.generation().insert(keyword, url);
    }

    /// Drop every entry.
    ///
    /// Swaps in a fresh cache rather than using `invalidate_all`, whose
    /// timestamp check can miss entries written in the same clock tick.
    pub fn clear(&self) {
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = Self::build();
    }
}

/// One generation of a [`KeywordCache`], between two clears.
#[derive(Clone)]
pub struct CacheGeneration(Cache<String, String>);

impl CacheGeneration {
    pub fn get(&self, keyword: &str) -> Option<String> {
        self.0.get(&keyword.to_string())
    }

    pub fn insert(&self, keyword: &str, url: &str) {
        self.0.insert(keyword.to_string(), url.to_string());
    }
}

impl Default for KeywordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeywordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_clear() {
        let cache = KeywordCache::new();
        assert_eq!(cache.get("turtle"), None);

        cache.insert("turtle", "https://img/1.jpg");
        cache.insert("ocean", "https://img/2.jpg");
        assert_eq!(cache.get("turtle").as_deref(), Some("https://img/1.jpg"));

        cache.clear();
        assert_eq!(cache.get("turtle"), None);
        assert_eq!(cache.get("ocean"), None);
    }

    #[test]
    fn test_writes_to_a_cleared_generation_are_discarded() {
        let cache = KeywordCache::new();
        let before = cache.generation();
        cache.clear();

        before.insert("forest", "https://img/stale.jpg");
        assert_eq!(cache.get("forest"), None);

        let after = cache.generation();
        after.insert("forest", "https://img/fresh.jpg");
        assert_eq!(cache.get("forest").as_deref(), Some("https://img/fresh.jpg"));
    }

    #[test]
    fn test_keys_are_exact() {
        let cache = KeywordCache::new();
        cache.insert("Turtle", "https://img/1.jpg");
        assert_eq!(cache.get("turtle"), None);
    }
}
