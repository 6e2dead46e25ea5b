//! Result Cache — request-coalescing TTL cache with a background sweeper
//!
//! Grounded in the teacher's `FilterCache`: a `DashMap` keyed store with
//! per-entry expiry and `AtomicU64` hit/miss counters, but generalised to
//! a single `TrustResult` cache with one uniform TTL per entry instead of
//! the teacher's several purpose-specific caches.

use crate::result::TrustResult;
use crate::subject::SubjectKey;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TTL_SECS: u64 = 300;

struct CacheEntry {
    result: TrustResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache hit/miss counters for observability (spec.md §4.6 is silent on
/// metrics, but the teacher's cache always carries `CacheStats`, so the
/// ambient stack keeps the pattern here).
#[derive(Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub sweeps: AtomicU64,
    pub expired_removed: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Bounded-lifetime keyed store of `TrustResult`s (spec.md §4.6).
pub struct ResultCache {
    entries: DashMap<SubjectKey, CacheEntry>,
    stats: Arc<CacheStats>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn get(&self, key: &SubjectKey) -> Option<TrustResult> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                self.stats.record_hit();
                return Some(entry.result.clone());
            }
            drop(entry);
            self.entries.remove(key);
        }
        self.stats.record_miss();
        None
    }

    pub fn put(&self, key: SubjectKey, result: TrustResult, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                result,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &SubjectKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Remove every expired entry, returning the count removed
    /// (spec.md §4.6).
    pub fn sweep_expired(&self) -> usize {
        let expired_keys: Vec<SubjectKey> = self
            .entries
            .iter()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.key().clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
        }

        self.stats.sweeps.fetch_add(1, Ordering::Relaxed);
        self.stats
            .expired_removed
            .fetch_add(expired_keys.len() as u64, Ordering::Relaxed);

        expired_keys.len()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the periodic sweeper as a cancellable background task
/// (spec.md §4.6 "must not hold the main request path"; "tear-down
/// friendly"). Abort the handle (or drop this guard) to stop the
/// sweeper — important so embedding tests don't keep the process alive.
pub struct SweeperHandle {
    task: tokio::task::JoinHandle<()>,
}

impl SweeperHandle {
    pub fn spawn(cache: Arc<ResultCache>) -> Self {
        Self::spawn_with_interval(cache, Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS))
    }

    pub fn spawn_with_interval(cache: Arc<ResultCache>, interval: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = cache.sweep_expired();
                if removed > 0 {
                    debug!(removed, "result cache sweep removed expired entries");
                }
            }
        });
        Self { task }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{FraudSignal, TrustResult};
    use crate::scoring::{Recommendation, RiskLevel};
    use crate::subject::EntityType;

    fn sample_result() -> TrustResult {
        TrustResult {
            subject_key: "github:octocat".to_string(),
            trust_score: 86.0,
            confidence: 0.9,
            risk_level: RiskLevel::Minimal,
            recommendation: Recommendation::Allow,
            entity_type: EntityType::Developer,
            human_label: "looks good".to_string(),
            signals: vec![],
            fraud_signals: vec![],
            unresolved: vec![],
            evaluated_at: chrono::Utc::now(),
            query_id: uuid::Uuid::new_v4(),
        }
    }

    #[test]
    fn put_then_get_is_a_hit() {
        let cache = ResultCache::new();
        let key = SubjectKey::from_raw("github:octocat");
        cache.put(key.clone(), sample_result(), Duration::from_secs(60));
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn expired_entry_is_a_miss_and_is_removed() {
        let cache = ResultCache::new();
        let key = SubjectKey::from_raw("github:octocat");
        cache.put(key.clone(), sample_result(), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn sweep_expired_removes_only_expired_entries() {
        let cache = ResultCache::new();
        cache.put(
            SubjectKey::from_raw("github:a"),
            sample_result(),
            Duration::from_millis(0),
        );
        cache.put(
            SubjectKey::from_raw("github:b"),
            sample_result(),
            Duration::from_secs(60),
        );
        std::thread::sleep(Duration::from_millis(5));
        let removed = cache.sweep_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = ResultCache::new();
        let key = SubjectKey::from_raw("github:octocat");
        cache.put(key.clone(), sample_result(), Duration::from_secs(60));
        assert!(cache.invalidate(&key));
        assert!(cache.get(&key).is_none());
    }
}
