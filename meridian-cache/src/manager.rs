use crate::lru_ttl::{CacheStats, LruTtlCache};
use serde::Serialize;
use std::time::Duration;

/// SHA-256 of the canonical JSON encoding of a tuple identifying the
/// operation, e.g. `tool_cache` key = `(tool_name, normalized_args,
/// user_scope)`.
pub fn cache_key<T: Serialize>(parts: &T) -> String {
    let value = serde_json::to_value(parts).expect("cache key parts must serialize");
    meridian_core::canonical_hash(&value)
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AggregateCacheStats {
    pub llm: CacheStats,
    pub tool: CacheStats,
    pub retrieval: CacheStats,
}

/// Facade over the three independent caches named in spec 4.C.
pub struct CacheManager {
    pub llm_cache: LruTtlCache<serde_json::Value>,
    pub tool_cache: LruTtlCache<serde_json::Value>,
    pub retrieval_cache: LruTtlCache<serde_json::Value>,
}

impl CacheManager {
    pub fn new(
        llm_max_size: usize,
        llm_ttl: Duration,
        tool_max_size: usize,
        tool_ttl: Duration,
        retrieval_max_size: usize,
        retrieval_ttl: Duration,
    ) -> Self {
        Self {
            llm_cache: LruTtlCache::new(llm_max_size, llm_ttl),
            tool_cache: LruTtlCache::new(tool_max_size, tool_ttl),
            retrieval_cache: LruTtlCache::new(retrieval_max_size, retrieval_ttl),
        }
    }

    pub fn stats(&self) -> AggregateCacheStats {
        AggregateCacheStats {
            llm: self.llm_cache.stats(),
            tool: self.tool_cache.stats(),
            retrieval: self.retrieval_cache.stats(),
        }
    }

    /// Health warnings across all three caches, tagged by cache name.
    pub fn health_warnings(&self) -> Vec<(&'static str, &'static str)> {
        let mut warnings = Vec::new();
        for warning in self.llm_cache.health_warnings() {
            warnings.push(("llm_cache", warning));
        }
        for warning in self.tool_cache.health_warnings() {
            warnings.push(("tool_cache", warning));
        }
        for warning in self.retrieval_cache.health_warnings() {
            warnings.push(("retrieval_cache", warning));
        }
        warnings
    }

    pub fn clear_expired(&self) -> usize {
        self.llm_cache.clear_expired() + self.tool_cache.clear_expired() + self.retrieval_cache.clear_expired()
    }
}
