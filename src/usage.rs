//! Per-key usage metadata for eviction decisions.
//!
//! Tracks when each key was last touched and, under the LFU policy, an
//! 8-bit probabilistic frequency counter: each touch increments the
//! counter with probability 1/(1+freq), approximating log-frequency in
//! a single byte. A periodic decay pass ages counters down so keys
//! that were hot an hour ago don't squat in the cache after the
//! working set shifts.
//!
//! The tracker holds keys only — never entries. Absence of a row means
//! the key was never touched, which ranks it as the best possible
//! eviction candidate.

use ahash::AHashMap;
use rand::Rng;

use crate::time;

/// Default interval between decay passes.
pub const DECAY_INTERVAL_MS: u64 = 60_000;

/// How much a frequency counter ages per decay pass.
pub const DECAY_AMOUNT: u8 = 1;

/// Which signal eviction candidates are ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict the least-recently-accessed key (approximate).
    #[default]
    Lru,
    /// Evict the least-frequently-accessed key, ties broken by last
    /// access (approximate).
    Lfu,
}

#[derive(Debug, Clone, Copy)]
struct UsageMeta {
    last_access: u64,
    freq: u8,
    last_decay: u64,
}

/// Access metadata for every touched key.
#[derive(Debug)]
pub struct UsageTracker {
    rows: AHashMap<Box<str>, UsageMeta>,
    policy: EvictionPolicy,
    decay_interval_ms: u64,
    decay_amount: u8,
}

impl UsageTracker {
    /// Creates a tracker for the given policy with default decay
    /// parameters.
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            rows: AHashMap::new(),
            policy,
            decay_interval_ms: DECAY_INTERVAL_MS,
            decay_amount: DECAY_AMOUNT,
        }
    }

    /// Returns the configured policy.
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Records an access: stamps `last_access`, and under LFU bumps the
    /// frequency counter with probability 1/(1+freq), saturating at 255.
    pub fn touch(&mut self, key: &str) {
        let now = time::now_ms();
        let meta = self.rows.entry(Box::from(key)).or_insert(UsageMeta {
            last_access: now,
            freq: 0,
            last_decay: now,
        });
        meta.last_access = now;

        if self.policy == EvictionPolicy::Lfu && meta.freq < u8::MAX {
            let p = 1.0 / (1.0 + meta.freq as f64);
            if rand::rng().random_bool(p) {
                meta.freq += 1;
            }
        }
    }

    /// Drops the metadata row for a key.
    pub fn remove(&mut self, key: &str) {
        self.rows.remove(key);
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no key has been touched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ages every row whose last decay is at least one interval old.
    /// Returns the number of rows that decayed.
    pub fn decay_tick(&mut self) -> usize {
        let now = time::now_ms();
        let mut decayed = 0;
        for meta in self.rows.values_mut() {
            if now.saturating_sub(meta.last_decay) >= self.decay_interval_ms {
                meta.freq = meta.freq.saturating_sub(self.decay_amount);
                meta.last_decay = now;
                decayed += 1;
            }
        }
        decayed
    }

    /// Sort key for eviction quality: lower sorts first and evicts
    /// first. LRU ranks by last access; LFU by frequency, then last
    /// access. Untouched keys rank as (0, 0) — the best candidates.
    pub fn eviction_rank(&self, key: &str) -> (u64, u64) {
        match self.rows.get(key) {
            Some(meta) => match self.policy {
                EvictionPolicy::Lru => (meta.last_access, 0),
                EvictionPolicy::Lfu => (meta.freq as u64, meta.last_access),
            },
            None => (0, 0),
        }
    }

    #[cfg(test)]
    fn freq(&self, key: &str) -> Option<u8> {
        self.rows.get(key).map(|m| m.freq)
    }

    #[cfg(test)]
    fn force_decay_interval(&mut self, ms: u64) {
        self.decay_interval_ms = ms;
    }
}
