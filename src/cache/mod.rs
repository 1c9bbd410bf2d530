//! The cache coordinator.
//!
//! Owns the entry dictionary and drives every cross-cutting concern
//! around it: passive and lazy TTL expiration, usage tracking, memory
//! accounting, pool-based eviction, and operation statistics. Value
//! engines (sorted sets, member sets) never see any of this — they are
//! plain data structures the coordinator dispatches into after the
//! shape check.
//!
//! Every path that destroys an entry — explicit delete, TTL purge,
//! eviction — converges on [`Cache::delete_key`] (or its destructured
//! twin used inside TTL callbacks), which keeps the dictionary, TTL
//! rows, usage rows, and the memory counter in lockstep.

use crate::config::CacheConfig;
use crate::dict::Dict;
use crate::memory::MemoryTracker;
use crate::ttl::{TtlManager, ACTIVE_MAX_ROUNDS, ACTIVE_SAMPLE_SIZE};
use crate::types::{type_name, Value};
use crate::usage::UsageTracker;

mod scalar;
mod set;
mod zset;


/// Every this-many operations, a small TTL sample runs even if nobody
/// touches an expiring key.
pub const LAZY_EXPIRE_FREQ: u64 = 100;

/// Keys sampled by the lazy in-line expiration sweep.
const LAZY_SAMPLE_SIZE: usize = 5;

/// A stored entry: the value plus its incrementally-maintained memory
/// estimate.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) value: Value,
    pub(crate) memory_used: usize,
}

/// Why an entry is being destroyed; decides which stat counter moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeleteCause {
    Explicit,
    Expired,
    Evicted,
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    operations: u64,
}

/// A point-in-time view of cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub operations: u64,
    pub key_count: usize,
    pub memory_used: usize,
    /// hits / (hits + misses), 0.0 before the first read.
    pub hit_rate: f64,
}

/// The in-process cache: dictionary, TTL, usage tracking, memory
/// budget, and eviction in one single-threaded coordinator.
///
/// All operations are non-blocking and complete without yielding;
/// hosts with parallelism put a mutex around the whole thing.
#[derive(Debug)]
pub struct Cache {
    entries: Dict<Entry>,
    memory: MemoryTracker,
    ttl: TtlManager,
    usage: UsageTracker,
    /// Eviction candidates, best victim first. Preserved across
    /// evictions to amortize sampling.
    pool: Vec<Box<str>>,
    counters: Counters,
    config: CacheConfig,
}

/// Destroys an entry from inside a TTL callback, where the manager
/// itself is mutably borrowed and `delete_key` can't be called. The
/// TTL row is already gone (the manager removes it when flushing), so
/// this covers the rest: entry, memory, usage row, expiration count.
///
/// A key may reach the pending buffer twice before its flush; the
/// second call finds no entry and counts nothing.
fn purge_expired(
    entries: &mut Dict<Entry>,
    memory: &mut MemoryTracker,
    usage: &mut UsageTracker,
    counters: &mut Counters,
    key: &str,
) {
    if let Some(entry) = entries.remove(key) {
        memory.shrink(entry.memory_used);
        usage.remove(key);
        counters.expirations += 1;
    }
}

impl Cache {
    /// Creates a cache with default configuration (no memory budget,
    /// LRU policy).
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: Dict::new(),
            memory: MemoryTracker::new(),
            ttl: TtlManager::new(),
            usage: UsageTracker::new(config.eviction_policy),
            pool: Vec::new(),
            counters: Counters::default(),
            config,
        }
    }

    /// Returns the number of live keys.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current estimated memory usage in bytes.
    pub fn memory_used(&self) -> usize {
        self.memory.used_bytes()
    }

    /// Returns a snapshot of all statistics.
    pub fn get_stats(&self) -> CacheStats {
        let c = &self.counters;
        let lookups = c.hits + c.misses;
        CacheStats {
            hits: c.hits,
            misses: c.misses,
            evictions: c.evictions,
            expirations: c.expirations,
            operations: c.operations,
            key_count: self.entries.len(),
            memory_used: self.memory.used_bytes(),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                c.hits as f64 / lookups as f64
            },
        }
    }

    /// Flushes any TTL deletions still waiting in the pending buffer.
    /// Idempotent; the background tasks are stopped by their owner
    /// (see [`crate::tasks`]).
    pub fn shutdown(&mut self) {
        let Cache {
            entries,
            memory,
            ttl,
            usage,
            counters,
            ..
        } = self;
        ttl.flush_pending(|key| purge_expired(entries, memory, usage, counters, key));
    }

    /// One active expiration cycle: up to [`ACTIVE_MAX_ROUNDS`] rounds
    /// of TTL sampling, continuing only while more than a quarter of
    /// each sample was stale. Returns the number of expired sightings.
    pub fn run_active_expiration(&mut self) -> usize {
        let Cache {
            entries,
            memory,
            ttl,
            usage,
            counters,
            ..
        } = self;
        let mut total = 0;
        for _ in 0..ACTIVE_MAX_ROUNDS {
            let expired = ttl.sample_and_purge(ACTIVE_SAMPLE_SIZE, |key| {
                purge_expired(entries, memory, usage, counters, key)
            });
            total += expired;
            if expired * 4 <= ACTIVE_SAMPLE_SIZE {
                break;
            }
        }
        total
    }

    /// One LFU decay pass. A no-op under LRU (no counters to age).
    pub fn run_decay_tick(&mut self) -> usize {
        self.usage.decay_tick()
    }

    /// Common prologue for every public operation: count it, and every
    /// [`LAZY_EXPIRE_FREQ`] operations run a small TTL sample so
    /// expired keys get reclaimed even when nothing reads them.
    fn begin_op(&mut self) {
        self.counters.operations += 1;
        if self.counters.operations % LAZY_EXPIRE_FREQ == 0 {
            let Cache {
                entries,
                memory,
                ttl,
                usage,
                counters,
                ..
            } = self;
            ttl.sample_and_purge(LAZY_SAMPLE_SIZE, |key| {
                purge_expired(entries, memory, usage, counters, key)
            });
        }
    }

    /// Passive expiration: if the key has a passed deadline, reclaim it
    /// now so no reader ever observes a stale value. Returns `true` if
    /// the key was expired.
    fn check_expired(&mut self, key: &str) -> bool {
        if self.ttl.is_expired(key) {
            self.delete_key(key, DeleteCause::Expired);
            true
        } else {
            false
        }
    }

    /// The single destruction primitive: removes the entry and every
    /// dependent row, and moves the stat counter named by `cause`.
    /// Returns `true` if the key existed.
    fn delete_key(&mut self, key: &str, cause: DeleteCause) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        self.memory.shrink(entry.memory_used);
        self.ttl.remove(key);
        self.usage.remove(key);
        match cause {
            DeleteCause::Explicit => {}
            DeleteCause::Expired => self.counters.expirations += 1,
            DeleteCause::Evicted => self.counters.evictions += 1,
        }
        true
    }

    /// Evicts entries until usage is back under the budget (or the
    /// cache is empty). Called at the top of every write.
    ///
    /// Victims come from a pool of pre-ranked candidates that survives
    /// across calls; each popped candidate is validated against the
    /// live dictionary first, since TTL purges and explicit deletes may
    /// have raced the pool.
    fn evict_if_needed(&mut self) {
        let Some(limit) = self.config.max_memory else {
            return;
        };
        while self.memory.used_bytes() > limit && !self.entries.is_empty() {
            if self.pool.is_empty() {
                self.refill_pool();
                if self.pool.is_empty() {
                    break;
                }
            }
            let victim = self.pool.remove(0);
            if !self.entries.contains_key(&victim) {
                // candidate died since sampling; not an eviction
                continue;
            }
            self.delete_key(&victim, DeleteCause::Evicted);
        }
    }

    /// Rebuilds the eviction pool: sample twice the configured number
    /// of keys without replacement, rank them by eviction quality, and
    /// keep the best victims up to a cap that scales with the keyspace.
    fn refill_pool(&mut self) {
        let key_count = self.entries.len();
        let pool_cap = if key_count < 1_000 {
            8
        } else if key_count < 10_000 {
            16
        } else if key_count < 100_000 {
            32
        } else {
            64
        };

        let want = (2 * self.config.eviction_sample_size).min(key_count);
        let mut candidates = self.entries.random_keys(want);
        candidates.sort_by_key(|key| self.usage.eviction_rank(key));
        candidates.truncate(pool_cap);
        self.pool = candidates;
    }

    /// Returns the shape name of the value at `key`, or `"none"`.
    pub fn value_type(&mut self, key: &str) -> &'static str {
        self.begin_op();
        if self.check_expired(key) {
            return "none";
        }
        match self.entries.get(key) {
            Some(entry) => type_name(&entry.value),
            None => "none",
        }
    }

    /// Returns `true` if the key exists and hasn't expired.
    pub fn exists(&mut self, key: &str) -> bool {
        self.begin_op();
        !self.check_expired(key) && self.entries.contains_key(key)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
