//! TTL caches for raw provider responses
//!
//! Only payloads as received from a provider are cached. Anything derived
//! from them (snapshots, ratios, verdicts) is recomputed on every call.

use cached::{Cached, TimedCache};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as SyncMutex};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Cache key for a provider request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Provider name
    pub provider: &'static str,
    /// Endpoint or function name
    pub endpoint: String,
    /// Symbol or query text
    pub subject: String,
    /// Additional parameters as a JSON string
    pub params: String,
}

impl CacheKey {
    pub fn new(
        provider: &'static str,
        endpoint: impl Into<String>,
        subject: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
            subject: subject.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe TTL cache of JSON payloads
///
/// Concurrent misses on one key are coalesced: the first caller fetches,
/// the others wait for it and read the cached payload.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Arc<RwLock<TimedCache<CacheKey, Value>>>,
    in_flight: Arc<SyncMutex<HashMap<CacheKey, Arc<Mutex<()>>>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
            in_flight: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    fn fetch_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(in_flight.entry(key.clone()).or_default())
    }

    fn release_fetch_lock(&self, key: &CacheKey) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(key);
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached payload, or run `fetcher` and cache what it returns
    ///
    /// Errors are never cached; callers waiting on a failed fetch try again
    /// themselves.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(
                provider = key.provider,
                endpoint = %key.endpoint,
                subject = %key.subject,
                "Cache hit"
            );
            return Ok(value);
        }

        let lock = self.fetch_lock(&key);
        let _guard = lock.lock().await;
        if let Some(value) = self.get(&key).await {
            tracing::debug!(
                provider = key.provider,
                endpoint = %key.endpoint,
                subject = %key.subject,
                "Cache filled by a concurrent fetch"
            );
            return Ok(value);
        }

        tracing::debug!(
            provider = key.provider,
            endpoint = %key.endpoint,
            subject = %key.subject,
            "Cache miss"
        );
        let fetched = fetcher().await;
        if let Ok(value) = &fetched {
            self.insert(key.clone(), value.clone()).await;
        }
        self.release_fetch_lock(&key);
        fetched
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// One cache per freshness class
#[derive(Clone)]
pub struct CacheManager {
    /// Daily price series
    pub realtime: ResponseCache,
    /// Company overviews and financial statements
    pub fundamental: ResponseCache,
    /// Research search results
    pub search: ResponseCache,
}

impl CacheManager {
    pub fn new(realtime_ttl: Duration, fundamental_ttl: Duration, search_ttl: Duration) -> Self {
        Self {
            realtime: ResponseCache::new(realtime_ttl),
            fundamental: ResponseCache::new(fundamental_ttl),
            search: ResponseCache::new(search_ttl),
        }
    }

    pub fn from_config(config: &crate::InvestConfig) -> Self {
        Self::new(
            config.cache_ttl_realtime,
            config.cache_ttl_fundamental,
            config.cache_ttl_search,
        )
    }

    pub async fn clear_all(&self) {
        self.realtime.clear().await;
        self.fundamental.clear().await;
        self.search.clear().await;
    }
}
