use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use shared::{RatingBaselines, Set};

use crate::config::ExhibitionPolicy;
use crate::ratings::EloConfig;

/// Stored JSON plus the instant it stops being served
#[derive(Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Optional memoization of computed results, stored as JSON.
///
/// Keys carry a digest of every set in the input and of the rating settings,
/// so a corrected score or a different K-factor never meets an old entry.
/// The set log stays the only source of truth; dropping the cache never
/// changes a result.
#[derive(Clone)]
pub struct AnalyticsCache {
    cache: Arc<RwLock<HashMap<String, CacheEntry<String>>>>,
    default_ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl AnalyticsCache {
    /// Empty cache whose entries live for `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Five minute entries
    pub fn new_default() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// Raw JSON for `key`, counting the lookup as a hit or a miss
    pub fn get(&self, key: &str) -> Option<String> {
        let found = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(key).filter(|e| !e.is_expired()).map(|e| e.data.clone()));
        match found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("Analytics cache hit: {}", key);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                log::debug!("Analytics cache miss: {}", key);
            }
        }
        found
    }

    pub fn set(&self, key: String, value: String) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: String, value: String, ttl: Duration) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
            cache.insert(key, CacheEntry::new(value, ttl));
        }
    }

    /// Look up `key`, computing and storing the value on a miss
    pub fn get_or_compute<T, F>(&self, key: String, compute: F) -> T
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(raw) = self.get(&key) {
            match serde_json::from_str(&raw) {
                Ok(value) => return value,
                Err(e) => log::warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }
        let value = compute();
        match serde_json::to_string(&value) {
            Ok(raw) => self.set(key, raw),
            Err(e) => log::warn!("Not caching {}: {}", key, e),
        }
        value
    }

    /// Drop entries past their TTL
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (total_entries, expired_entries) = self
            .cache
            .read()
            .map(|cache| {
                let expired = cache.values().filter(|entry| entry.is_expired()).count();
                (cache.len(), expired)
            })
            .unwrap_or((0, 0));

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every key containing `pattern`
    pub fn invalidate_pattern(&self, pattern: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|key, _| !key.contains(pattern));
        }
    }
}

/// Entry counts and lookup counters since creation
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Key layout for memoized rating folds
pub struct CacheKeys;

impl CacheKeys {
    /// Digest of the settings a fold depends on
    pub fn scope(params: &EloConfig, baselines: &RatingBaselines, policy: ExhibitionPolicy) -> String {
        let mut hasher = Sha256::new();
        for value in [
            params.default_rating,
            params.k_factor,
            params.margin_floor,
            params.set_tiebreak_factor,
            params.match_tiebreak_factor,
            baselines.default_rating,
        ] {
            hasher.update(value.to_bits().to_le_bytes());
        }
        for (player, rating) in &baselines.overrides {
            update_str(&mut hasher, player);
            hasher.update(rating.to_bits().to_le_bytes());
        }
        update_str(
            &mut hasher,
            match policy {
                ExhibitionPolicy::Ladder => "ladder",
                ExhibitionPolicy::Exhibition => "exhibition",
                ExhibitionPolicy::Combined => "combined",
            },
        );
        hex::encode(&hasher.finalize()[..8])
    }

    /// `count:digest` of an ordered set list, covering every field a fold reads
    pub fn fingerprint(sets: &[Set]) -> String {
        let mut hasher = Sha256::new();
        for set in sets {
            hasher.update(set.id.to_le_bytes());
            hasher.update(set.match_id.to_le_bytes());
            update_str(&mut hasher, &set.date.to_string());
            for player in set.participants() {
                update_str(&mut hasher, player);
            }
            hasher.update(set.score_a.to_le_bytes());
            hasher.update(set.score_b.to_le_bytes());
            hasher.update([u8::from(set.finished), u8::from(set.is_exhibition)]);
            update_str(&mut hasher, set.tie_break.as_str());
        }
        format!("{}:{}", sets.len(), hex::encode(hasher.finalize()))
    }

    pub fn live_ratings(scope: &str, sets: &[Set]) -> String {
        format!("ratings:live:{}:{}", scope, Self::fingerprint(sets))
    }

    pub fn player_history(scope: &str, player_id: &str, sets: &[Set]) -> String {
        format!("ratings:history:{}:{}:{}", scope, player_id, Self::fingerprint(sets))
    }

    pub fn period_deltas(scope: &str, start: &str, end: &str, sets: &[Set]) -> String {
        format!("ratings:deltas:{}:{}:{}:{}", scope, start, end, Self::fingerprint(sets))
    }
}

/// Length-prefixed so adjacent strings cannot run into each other
fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
