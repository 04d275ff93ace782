// ABOUTME: Bounded TTL cache and sliding-window rate limiter shared by external API clients
// ABOUTME: LRU eviction on capacity, lazy expiry on read, per-minute request budgets
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// LRU cache whose entries expire after a fixed TTL
#[derive(Debug)]
pub struct TtlCache<K: Hash + Eq, V> {
    store: Mutex<LruCache<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// Fallback capacity when configured with zero entries
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache holding at most `capacity` entries for `ttl` each
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Fresh value for `key`, dropping it if expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut store = self.store.lock().await;
        // LruCache::get is mutable (updates access order)
        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired() => return Some(entry.data.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
        }
        None
    }

    /// Store a value, evicting the least recently used entry when full
    pub async fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            data: value,
            expires_at: Instant::now() + self.ttl,
        };
        self.store.lock().await.push(key, entry);
    }

    /// Number of entries, expired ones included
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    /// Remove everything
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}

/// Sliding-window rate limiter for API requests
#[derive(Debug)]
pub struct RateLimiter {
    requests: Mutex<Vec<Instant>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Allow `limit` requests per `window`
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            limit,
            window,
        }
    }

    /// Allow `limit` requests per minute
    #[must_use]
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Record a request if the budget allows it.
    ///
    /// Returns `false` without recording when the window is full, so callers
    /// that cannot wait can fall back immediately.
    pub async fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.lock().await;
        requests.retain(|&t| now.duration_since(t) < self.window);
        if requests.len() < self.limit as usize {
            requests.push(now);
            true
        } else {
            false
        }
    }

    /// Wait until a request can be made, then record it
    pub async fn acquire(&self) {
        while !self.try_acquire().await {
            sleep(Duration::from_millis(250)).await;
        }
    }
}
