//! In-memory cache implementation using moka
//!
//! Fast, thread-safe in-memory cache with TTL expiration and glob-style
//! pattern deletion for invalidating groups of keys (`posts:*`).

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default TTL for cache entries (1 hour)
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry wrapper that stores serialized JSON data, so any serializable
/// type can share one cache instance.
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default capacity and TTL
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a new memory cache with custom capacity and default TTL
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .support_invalidation_closures()
            .build();

        Self { cache, default_ttl }
    }

    /// Get the current number of entries in the cache
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Glob-style matching: `*` matches any sequence, `?` any single char
    fn pattern_matches(pattern: &str, key: &str) -> bool {
        let pattern_chars: Vec<char> = pattern.chars().collect();
        let key_chars: Vec<char> = key.chars().collect();
        Self::glob_match(&pattern_chars, &key_chars, 0, 0)
    }

    fn glob_match(pattern: &[char], key: &[char], pi: usize, ki: usize) -> bool {
        if pi == pattern.len() {
            return ki == key.len();
        }

        match pattern[pi] {
            '*' => {
                if Self::glob_match(pattern, key, pi + 1, ki) {
                    return true;
                }
                if ki < key.len() && Self::glob_match(pattern, key, pi, ki + 1) {
                    return true;
                }
                false
            }
            '?' => {
                if ki < key.len() {
                    Self::glob_match(pattern, key, pi + 1, ki + 1)
                } else {
                    false
                }
            }
            p => {
                if ki < key.len() && key[ki] == p {
                    Self::glob_match(pattern, key, pi + 1, ki + 1)
                } else {
                    false
                }
            }
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;

        // Per-entry TTL is bounded by the cache-wide time_to_live; a custom
        // Expiry policy would be needed for shorter per-entry lifetimes.
        let _ = ttl;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let pattern = pattern.to_string();
        self.cache
            .invalidate_entries_if(move |key, _| MemoryCache::pattern_matches(&pattern, key))
            .map_err(|e| anyhow::anyhow!("Failed to invalidate entries: {}", e))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_roundtrip() {
        let cache = MemoryCache::new();
        cache
            .set("posts:list:1", &vec![1, 2, 3], Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<Vec<i32>> = cache.get("posts:list:1").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let cache = MemoryCache::new();
        let value: Option<String> = cache.get("missing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new();
        cache
            .set("key", &"value".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete("key").await.unwrap();

        let value: Option<String> = cache.get("key").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn delete_pattern_invalidates_matches() {
        let cache = MemoryCache::new();
        cache
            .set("posts:slug:a", &1, Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("posts:slug:b", &2, Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("gallery:all", &3, Duration::from_secs(60))
            .await
            .unwrap();

        cache.delete_pattern("posts:*").await.unwrap();
        // invalidate_entries_if is eventually consistent; sync to apply
        cache.cache.run_pending_tasks().await;

        let a: Option<i32> = cache.get("posts:slug:a").await.unwrap();
        let g: Option<i32> = cache.get("gallery:all").await.unwrap();
        assert!(a.is_none());
        assert_eq!(g, Some(3));
    }

    #[test]
    fn glob_matching() {
        assert!(MemoryCache::pattern_matches("posts:*", "posts:slug:a"));
        assert!(MemoryCache::pattern_matches("posts:?", "posts:1"));
        assert!(!MemoryCache::pattern_matches("posts:?", "posts:12"));
        assert!(!MemoryCache::pattern_matches("posts:*", "gallery:all"));
        assert!(MemoryCache::pattern_matches("*", "anything"));
    }
}
