//! Dictionary with incremental rehash.
//!
//! Two hash tables: `front` receives all inserts, `back` (when present)
//! is an older table being drained. Every mutating operation migrates a
//! bounded number of entries from `back` to `front`, so a resize never
//! stalls a single operation; lookups probe both tables until the
//! migration finishes.
//!
//! Growth is triggered by a power-of-two capacity watermark rather than
//! the underlying tables' own load factor — the tables resize
//! themselves just fine, but the watermark is what gives us a
//! deterministic moment to start (and therefore to amortize) the
//! migration.

use ahash::AHashMap;
use rand::seq::IteratorRandom;

/// Starting capacity watermark.
const INITIAL_CAPACITY: usize = 16;

/// Entries migrated from the old table per mutating operation.
const REHASH_BATCH: usize = 16;

/// A string-keyed map with amortized table migration.
#[derive(Debug)]
pub struct Dict<V> {
    front: AHashMap<Box<str>, V>,
    back: Option<AHashMap<Box<str>, V>>,
    capacity: usize,
}

impl<V> Dict<V> {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self {
            front: AHashMap::new(),
            back: None,
            capacity: INITIAL_CAPACITY,
        }
    }

    /// Returns the number of live entries across both tables.
    pub fn len(&self) -> usize {
        self.front.len() + self.back.as_ref().map_or(0, |b| b.len())
    }

    /// Returns `true` if the dictionary holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` while a migration is in progress.
    pub fn is_rehashing(&self) -> bool {
        self.back.is_some()
    }

    /// Moves up to [`REHASH_BATCH`] entries from the old table into the
    /// new one, retiring the old table once it drains.
    fn rehash_step(&mut self) {
        let Some(back) = self.back.as_mut() else {
            return;
        };
        for _ in 0..REHASH_BATCH {
            let Some(key) = back.keys().next().cloned() else {
                break;
            };
            let value = back.remove(&key).expect("key just observed in table");
            self.front.insert(key, value);
        }
        if back.is_empty() {
            self.back = None;
        }
    }

    /// Starts a migration if the entry count has reached the capacity
    /// watermark.
    fn maybe_grow(&mut self) {
        if self.back.is_none() && self.front.len() >= self.capacity {
            self.capacity *= 2;
            let old = std::mem::replace(&mut self.front, AHashMap::with_capacity(self.capacity));
            self.back = Some(old);
        }
    }

    /// Looks up an entry, probing both tables.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.front
            .get(key)
            .or_else(|| self.back.as_ref()?.get(key))
    }

    /// Looks up an entry mutably, advancing the migration first.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.rehash_step();
        if self.front.contains_key(key) {
            return self.front.get_mut(key);
        }
        self.back.as_mut()?.get_mut(key)
    }

    /// Returns `true` if the key is present in either table.
    pub fn contains_key(&self, key: &str) -> bool {
        self.front.contains_key(key) || self.back.as_ref().is_some_and(|b| b.contains_key(key))
    }

    /// Inserts an entry, returning the previous value for the key if
    /// one existed.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        self.rehash_step();
        // evict any stale copy from the old table so the key lives in
        // exactly one table
        let displaced = self.back.as_mut().and_then(|b| b.remove(key));
        let previous = self.front.insert(Box::from(key), value).or(displaced);
        self.maybe_grow();
        previous
    }

    /// Removes an entry, returning its value if the key was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.rehash_step();
        self.front
            .remove(key)
            .or_else(|| self.back.as_mut()?.remove(key))
    }

    /// Iterates all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.front
            .iter()
            .chain(self.back.iter().flat_map(|b| b.iter()))
            .map(|(k, v)| (&**k, v))
    }

    /// Samples up to `n` distinct keys uniformly, without replacement.
    pub fn random_keys(&self, n: usize) -> Vec<Box<str>> {
        let mut rng = rand::rng();
        self.front
            .keys()
            .chain(self.back.iter().flat_map(|b| b.keys()))
            .choose_multiple(&mut rng, n)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}
