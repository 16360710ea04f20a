//! In-memory LRU cache of decoded rasters.
//!
//! The cache is an explicit object owned by the caller: create it once,
//! hand it to one or more orchestrators, clear it when the descriptor
//! changes.

use lru::LruCache;
use metrics::counter;
use std::num::NonZeroUsize;
use std::sync::Arc;
use solar_common::RasterImage;
use tokio::sync::Mutex;
use tracing::debug;

/// Decoded rasters keyed by URL.
pub struct RasterCache {
    /// `None` when the capacity is 0
    inner: Option<Mutex<Inner>>,
    capacity: usize,
}

struct Inner {
    entries: LruCache<String, Arc<RasterImage>>,
    stats: CacheStats,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit percentage, 0 when nothing was looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl RasterCache {
    /// Create a cache holding at most `capacity` rasters. A capacity of 0
    /// gives a cache that stores nothing.
    pub fn new(capacity: usize) -> Self {
        let inner = NonZeroUsize::new(capacity).map(|cap| {
            Mutex::new(Inner {
                entries: LruCache::new(cap),
                stats: CacheStats::default(),
            })
        });
        Self { inner, capacity }
    }

    pub async fn get(&self, url: &str) -> Option<Arc<RasterImage>> {
        let inner = self.inner.as_ref()?;
        let mut inner = inner.lock().await;

        match inner.entries.get(url).cloned() {
            Some(raster) => {
                inner.stats.hits += 1;
                counter!("solar_raster_cache_hits_total").increment(1);
                debug!(url, "Raster cache hit");
                Some(raster)
            }
            None => {
                inner.stats.misses += 1;
                counter!("solar_raster_cache_misses_total").increment(1);
                None
            }
        }
    }

    pub async fn insert(&self, url: &str, raster: Arc<RasterImage>) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let mut inner = inner.lock().await;

        if inner.entries.len() >= inner.entries.cap().get() && !inner.entries.contains(url) {
            inner.stats.evictions += 1;
        }
        inner.entries.put(url.to_string(), raster);
    }

    pub async fn stats(&self) -> CacheStats {
        match &self.inner {
            Some(inner) => inner.lock().await.stats.clone(),
            None => CacheStats::default(),
        }
    }

    pub async fn len(&self) -> usize {
        match &self.inner {
            Some(inner) => inner.lock().await.entries.len(),
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry and reset the statistics.
    pub async fn clear(&self) {
        if let Some(inner) = &self.inner {
            let mut inner = inner.lock().await;
            inner.entries.clear();
            inner.stats = CacheStats::default();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
