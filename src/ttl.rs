//! TTL bookkeeping: absolute deadlines, sampled scanning, batched
//! deletion.
//!
//! The manager owns a key→deadline map and nothing else — entries stay
//! in the dictionary, and a key without a row here simply never
//! expires. Active expiration advances a wraparound cursor over the
//! map a few keys at a time, parking expired keys in a pending buffer
//! that is flushed in batches through the owner's delete callback.
//!
//! Rust's hash maps invalidate iterators on mutation, so the cursor is
//! a numeric position rather than a live iterator. Map churn between
//! calls can make coverage slightly unfair; scan fairness is explicitly
//! not guaranteed.

use ahash::AHashMap;

use crate::time;

/// Pending-delete buffer size that triggers a flush mid-scan.
pub const PENDING_FLUSH_LIMIT: usize = 100;

/// How often the active expiration task fires.
pub const ACTIVE_INTERVAL_MS: u64 = 200;

/// Keys visited per active expiration round.
pub const ACTIVE_SAMPLE_SIZE: usize = 10;

/// Maximum rounds per active expiration cycle.
pub const ACTIVE_MAX_ROUNDS: usize = 2;

/// Tracks expiration deadlines for cache keys.
#[derive(Debug, Default)]
pub struct TtlManager {
    deadlines: AHashMap<Box<str>, u64>,
    /// Scan position into the deadline map, wrapping at the end.
    cursor: usize,
    /// Expired keys awaiting batched deletion. Rows stay in the
    /// deadline map until the flush, so passive checks keep shielding
    /// readers from keys that are buffered but not yet deleted.
    pending: Vec<Box<str>>,
}

impl TtlManager {
    /// Creates a manager with no deadlines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or overwrites the absolute deadline (monotonic ms) for a key.
    pub fn set(&mut self, key: &str, deadline_ms: u64) {
        self.deadlines.insert(Box::from(key), deadline_ms);
    }

    /// Drops the deadline for a key. Returns `true` if one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Returns the absolute deadline for a key, if it has one.
    pub fn deadline(&self, key: &str) -> Option<u64> {
        self.deadlines.get(key).copied()
    }

    /// Returns `true` iff the key has a deadline that has passed.
    pub fn is_expired(&self, key: &str) -> bool {
        match self.deadlines.get(key) {
            Some(&deadline) => time::now_ms() >= deadline,
            None => false,
        }
    }

    /// Returns the number of keys with a deadline.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Returns `true` if no key has a deadline.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Advances the scan cursor up to `k` keys, buffering any whose
    /// deadline has passed. If the cursor falls off the end of the map
    /// it wraps to a fresh pass and takes one more step. When the
    /// pending buffer reaches [`PENDING_FLUSH_LIMIT`], it is flushed
    /// through `on_expire`.
    ///
    /// Returns the number of expired keys seen by this call. A key can
    /// be counted again by a later call if it is still awaiting its
    /// flush; the owner's delete path treats the second delete as a
    /// no-op.
    pub fn sample_and_purge(&mut self, k: usize, on_expire: impl FnMut(&str)) -> usize {
        if self.deadlines.is_empty() {
            return 0;
        }

        let now = time::now_ms();
        let len = self.deadlines.len();
        if self.cursor >= len {
            self.cursor = 0;
        }

        let mut expired = 0;
        let steps = k.min(len - self.cursor);
        for (key, &deadline) in self.deadlines.iter().skip(self.cursor).take(steps) {
            if now >= deadline {
                self.pending.push(key.clone());
                expired += 1;
            }
        }
        self.cursor += steps;

        if steps < k {
            // wrapped: restart the scan and take one more step
            self.cursor = 0;
            if let Some((key, &deadline)) = self.deadlines.iter().next() {
                if now >= deadline {
                    self.pending.push(key.clone());
                    expired += 1;
                }
                self.cursor = 1;
            }
        }

        if self.pending.len() >= PENDING_FLUSH_LIMIT {
            self.flush_pending(on_expire);
        }
        expired
    }

    /// Drains the pending-delete buffer unconditionally, removing each
    /// key's deadline row and then invoking `on_expire` for it. Used at
    /// shutdown, at cycle boundaries, and when the buffer fills.
    pub fn flush_pending(&mut self, mut on_expire: impl FnMut(&str)) {
        for key in self.pending.drain(..) {
            self.deadlines.remove(&key);
            on_expire(&key);
        }
    }

    /// Number of keys currently awaiting batched deletion.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
