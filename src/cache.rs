use crate::error::{Error, Result};
use crate::hierarchy::FlattenedHierarchy;
use crate::store::RoleStore;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Mutex as RebuildMutex;

/// Point-in-time cache counters and build samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheMetrics {
    /// Lookups served from the cached hierarchy.
    pub hits: u64,
    /// Lookups that triggered a rebuild.
    pub misses: u64,
    /// Role count of the cached generation, zero after `clear`.
    pub size: usize,
    /// `hits / (hits + misses)`, zero when no accesses were recorded.
    pub hit_rate: f64,
    /// Wall-clock duration of the last rebuild, in milliseconds.
    pub last_warm_time_ms: Option<f64>,
    /// Instant the last rebuild completed.
    pub last_warm_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct MetricsState {
    hits: u64,
    misses: u64,
    size: usize,
    last_warm_time_ms: Option<f64>,
    last_warm_at: Option<Instant>,
}

/// In-process cache of the flattened role hierarchy.
///
/// Invalidation is push-based: any external mutation that creates, edits,
/// reparents or deletes a role must call [`HierarchyCache::clear`] before
/// the next authorization check. There is no TTL and no automatic staleness
/// detection. A generation is replaced wholesale, never patched.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    value: Mutex<Option<Arc<FlattenedHierarchy>>>,
    rebuild: RebuildMutex<()>,
    metrics: Mutex<MetricsState>,
}

impl HierarchyCache {
    /// Creates an empty cache; the first `get` is a guaranteed miss.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached hierarchy, rebuilding from the store on miss.
    ///
    /// Concurrent misses serialize behind a rebuild mutex so at most one
    /// `load_all` runs per cache generation; callers arriving while a
    /// rebuild is in flight share its result. Store failures propagate
    /// unchanged as [`Error::Store`].
    pub async fn get<S>(&self, store: &S) -> Result<Arc<FlattenedHierarchy>>
    where
        S: RoleStore + ?Sized,
    {
        if let Some(cached) = self.cached() {
            self.record_hit();
            return Ok(cached);
        }

        let _rebuild = self.rebuild.lock().await;
        // Another caller may have finished the rebuild while we waited.
        if let Some(cached) = self.cached() {
            self.record_hit();
            return Ok(cached);
        }

        {
            let mut metrics = self.metrics.lock().expect("poisoned lock");
            metrics.misses += 1;
        }

        let started = Instant::now();
        let records = store.load_all().await.map_err(Error::from)?;
        let flattened = Arc::new(FlattenedHierarchy::from_records(&records));
        let warm_time_ms = started.elapsed().as_secs_f64() * 1_000.0;

        {
            let mut guard = self.value.lock().expect("poisoned lock");
            *guard = Some(Arc::clone(&flattened));
        }
        {
            let mut metrics = self.metrics.lock().expect("poisoned lock");
            metrics.size = flattened.len();
            metrics.last_warm_time_ms = Some(warm_time_ms);
            metrics.last_warm_at = Some(Instant::now());
        }

        Ok(flattened)
    }

    /// Drops the cached generation and resets size to zero.
    ///
    /// Counters and warm samples are preserved; the next `get` is a miss.
    pub fn clear(&self) {
        let mut guard = self.value.lock().expect("poisoned lock");
        *guard = None;
        drop(guard);

        let mut metrics = self.metrics.lock().expect("poisoned lock");
        metrics.size = 0;
    }

    /// Zeroes hit/miss counters, preserving the cached hierarchy and its
    /// size/warm-time samples.
    pub fn reset_metrics(&self) {
        let mut metrics = self.metrics.lock().expect("poisoned lock");
        metrics.hits = 0;
        metrics.misses = 0;
    }

    /// Returns a metrics snapshot.
    pub fn metrics(&self) -> CacheMetrics {
        let metrics = self.metrics.lock().expect("poisoned lock");
        let accesses = metrics.hits + metrics.misses;
        let hit_rate = if accesses == 0 {
            0.0
        } else {
            metrics.hits as f64 / accesses as f64
        };
        CacheMetrics {
            hits: metrics.hits,
            misses: metrics.misses,
            size: metrics.size,
            hit_rate,
            last_warm_time_ms: metrics.last_warm_time_ms,
            last_warm_at: metrics.last_warm_at,
        }
    }

    fn cached(&self) -> Option<Arc<FlattenedHierarchy>> {
        self.value.lock().expect("poisoned lock").clone()
    }

    fn record_hit(&self) {
        let mut metrics = self.metrics.lock().expect("poisoned lock");
        metrics.hits += 1;
    }
}
