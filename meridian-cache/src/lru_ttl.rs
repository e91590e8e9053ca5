use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
    last_used: Instant,
}

/// `get(key) → {value, hit}`; `put`; `invalidate`; `clear`;
/// `clear_expired() → count`; `stats()`.
///
/// Eviction order: (1) drop expired entries on access, (2) evict the
/// least-recently-used entry when at capacity.
pub struct LruTtlCache<V: Clone> {
    max_size: usize,
    ttl: Duration,
    state: Mutex<State<V>>,
}

struct State<V> {
    entries: HashMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<V> {
    pub value: Option<V>,
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate_percent: f64,
}

impl<V: Clone> LruTtlCache<V> {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size,
            ttl,
            state: Mutex::new(State { entries: HashMap::new(), hits: 0, misses: 0, evictions: 0 }),
        }
    }

    pub fn get(&self, key: &str) -> CacheLookup<V> {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        let expired = state.entries.get(key).map(|e| now >= e.expires_at).unwrap_or(false);
        if expired {
            state.entries.remove(key);
        }
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = now;
                let value = entry.value.clone();
                state.hits += 1;
                CacheLookup { value: Some(value), hit: true }
            }
            None => {
                state.misses += 1;
                CacheLookup { value: None, hit: false }
            }
        }
    }

    pub fn put(&self, key: String, value: V) {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_size {
            if let Some(lru_key) =
                state.entries.iter().min_by_key(|(_, e)| e.last_used).map(|(k, _)| k.clone())
            {
                state.entries.remove(&lru_key);
                state.evictions += 1;
            }
        }

        state.entries.insert(
            key,
            Entry { value, expires_at: now + self.ttl, last_used: now },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.state.lock().unwrap().entries.remove(key);
    }

    pub fn clear(&self) {
        self.state.lock().unwrap().entries.clear();
    }

    /// Removes all currently expired entries and returns how many were
    /// dropped.
    pub fn clear_expired(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        let before = state.entries.len();
        state.entries.retain(|_, e| now < e.expires_at);
        before - state.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap();
        let total = state.hits + state.misses;
        let hit_rate_percent = if total == 0 { 0.0 } else { state.hits as f64 / total as f64 * 100.0 };
        CacheStats {
            size: state.entries.len(),
            max_size: self.max_size,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            hit_rate_percent,
        }
    }

    /// Health heuristics from spec 4.C: reported, never auto-applied.
    pub fn health_warnings(&self) -> Vec<&'static str> {
        let stats = self.stats();
        let mut warnings = Vec::new();
        let total_requests = stats.hits + stats.misses;
        if total_requests >= 100 && stats.hit_rate_percent < 30.0 {
            warnings.push("low hit rate");
        }
        if stats.max_size > 0 && stats.size as f64 / stats.max_size as f64 > 0.9 {
            warnings.push("high pressure");
        }
        warnings
    }
}
