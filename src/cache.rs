// =============================================================================
// Series cache — TTL-bounded read-through store for fetched OHLCV data
// =============================================================================
//
// Daily bars change once per session, so repeated pipeline runs against the
// same symbol/period should not refetch.  Entries expire on read after the
// TTL; when the cache is full the oldest entry (by insertion time) is
// evicted first.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;
use crate::series::{MarketDataSource, OhlcvSeries};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SeriesKey {
    symbol: String,
    period: String,
}

struct CacheEntry {
    series: Arc<OhlcvSeries>,
    inserted_at: Instant,
}

/// Thread-safe TTL cache keyed by (symbol, period).
pub struct SeriesCache {
    entries: RwLock<HashMap<SeriesKey, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl SeriesCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a live entry; expired entries are dropped on the spot.
    pub fn get(&self, symbol: &str, period: &str) -> Option<Arc<OhlcvSeries>> {
        let key = SeriesKey {
            symbol: symbol.to_string(),
            period: period.to_string(),
        };
        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(Arc::clone(&entry.series));
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Stale: upgrade to a write lock and remove.
        self.entries.write().remove(&key);
        debug!(symbol, period, "evicted expired series");
        None
    }

    /// Store a series, evicting the oldest entry if the cache is full.
    pub fn insert(&self, symbol: &str, period: &str, series: Arc<OhlcvSeries>) {
        let key = SeriesKey {
            symbol: symbol.to_string(),
            period: period.to_string(),
        };
        let mut entries = self.entries.write();
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
                debug!(symbol = %oldest.symbol, period = %oldest.period, "evicted oldest series");
            }
        }
        entries.insert(
            key,
            CacheEntry {
                series,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Read-through wrapper around any market data source.
pub struct CachedSource<S: MarketDataSource> {
    inner: S,
    cache: SeriesCache,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            cache: SeriesCache::new(ttl, max_entries),
        }
    }

    /// Fetch through the cache; misses hit the inner source and populate it.
    pub fn fetch(&self, symbol: &str, period: &str) -> Result<Arc<OhlcvSeries>> {
        if let Some(series) = self.cache.get(symbol, period) {
            debug!(symbol, period, "series cache hit");
            return Ok(series);
        }
        let series = Arc::new(self.inner.fetch(symbol, period)?);
        self.cache.insert(symbol, period, Arc::clone(&series));
        Ok(series)
    }
}
