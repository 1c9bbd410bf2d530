use bytes::Bytes;

use super::{Cache, DeleteCause, Entry};
use crate::error::WrongType;
use crate::memory;
use crate::time;
use crate::types::Value;

impl Cache {
    /// Stores a scalar value, replacing whatever the key held before
    /// (any shape). `ttl_ms` sets a fresh TTL; `None` clears any
    /// existing one.
    pub fn set(&mut self, key: &str, value: impl Into<Bytes>, ttl_ms: Option<u64>) {
        self.begin_op();
        self.evict_if_needed();

        let value = Value::Scalar(value.into());
        let size = memory::entry_size(key, &value);
        let replaced = self.entries.insert(
            key,
            Entry {
                value,
                memory_used: size,
            },
        );
        if let Some(old) = replaced {
            self.memory.shrink(old.memory_used);
        }
        self.memory.grow(size);

        match ttl_ms {
            Some(ms) => self.ttl.set(key, time::deadline_after_ms(ms)),
            None => {
                self.ttl.remove(key);
            }
        }
        self.usage.touch(key);
    }

    /// Retrieves the scalar value for `key`, or `None` if missing or
    /// expired. Returns `Err(WrongType)` if the key holds a collection.
    /// Updates hit/miss counters.
    pub fn get(&mut self, key: &str) -> Result<Option<Bytes>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            self.counters.misses += 1;
            return Ok(None);
        }
        match self.entries.get(key) {
            None => {
                self.counters.misses += 1;
                Ok(None)
            }
            Some(entry) => match &entry.value {
                Value::Scalar(data) => {
                    let data = data.clone();
                    self.counters.hits += 1;
                    self.usage.touch(key);
                    Ok(Some(data))
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Removes a key of any shape. Returns `true` if it existed.
    pub fn del(&mut self, key: &str) -> bool {
        self.begin_op();
        if self.check_expired(key) {
            return false;
        }
        self.delete_key(key, DeleteCause::Explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn set_and_get() {
        let mut cache = Cache::new();
        cache.set("foo", "bar", None);
        assert_eq!(cache.get("foo").unwrap(), Some(Bytes::from("bar")));
    }

    #[test]
    fn get_missing_key() {
        let mut cache = Cache::new();
        assert_eq!(cache.get("nope").unwrap(), None);
    }

    #[test]
    fn overwrite_replaces_value() {
        let mut cache = Cache::new();
        cache.set("key", "first", None);
        cache.set("key", "second", None);
        assert_eq!(cache.get("key").unwrap(), Some(Bytes::from("second")));
        assert_eq!(cache.key_count(), 1);
    }

    #[test]
    fn overwrite_adjusts_memory() {
        let mut cache = Cache::new();
        cache.set("key", "short", None);
        let small = cache.memory_used();
        cache.set("key", "a much longer value here", None);
        assert!(cache.memory_used() > small);

        cache.set("key", "s", None);
        // back below the original usage, no residue from old values
        assert!(cache.memory_used() < small);
    }

    #[test]
    fn overwrite_clears_old_ttl() {
        let mut cache = Cache::new();
        cache.set("key", "v1", Some(10));
        cache.set("key", "v2", None);
        thread::sleep(Duration::from_millis(20));
        // old deadline must not apply to the new value
        assert_eq!(cache.get("key").unwrap(), Some(Bytes::from("v2")));
    }

    #[test]
    fn del_existing() {
        let mut cache = Cache::new();
        cache.set("key", "val", None);
        assert!(cache.del("key"));
        assert_eq!(cache.get("key").unwrap(), None);
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn del_missing() {
        let mut cache = Cache::new();
        assert!(!cache.del("nope"));
    }

    #[test]
    fn del_is_idempotent() {
        let mut cache = Cache::new();
        cache.set("key", "val", None);
        assert!(cache.del("key"));
        assert!(!cache.del("key"));
        assert_eq!(cache.key_count(), 0);
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn passive_expiration_on_get() {
        let mut cache = Cache::new();
        cache.set("temp", "v", Some(20));
        assert_eq!(cache.get("temp").unwrap(), Some(Bytes::from("v")));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("temp").unwrap(), None);
        // the entry was reclaimed, not just hidden
        assert_eq!(cache.key_count(), 0);
        assert_eq!(cache.get_stats().expirations, 1);
    }

    #[test]
    fn expired_get_counts_as_miss() {
        let mut cache = Cache::new();
        cache.set("temp", "v", Some(1));
        thread::sleep(Duration::from_millis(5));
        let _ = cache.get("temp");
        assert_eq!(cache.get_stats().misses, 1);
    }

    #[test]
    fn del_of_expired_key_reports_missing() {
        let mut cache = Cache::new();
        cache.set("temp", "v", Some(1));
        thread::sleep(Duration::from_millis(5));
        assert!(!cache.del("temp"));
        // reclaimed via the expiration path, so the stat moved there
        assert_eq!(cache.get_stats().expirations, 1);
    }

    #[test]
    fn get_on_collection_is_wrongtype() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "m").unwrap();
        assert_eq!(cache.get("z"), Err(WrongType));
    }

    #[test]
    fn set_overwrites_collection() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "m").unwrap();
        cache.set("z", "scalar now", None);
        assert_eq!(cache.get("z").unwrap(), Some(Bytes::from("scalar now")));
    }

    #[test]
    fn empty_key_and_value_are_legal() {
        let mut cache = Cache::new();
        cache.set("", "", None);
        assert_eq!(cache.get("").unwrap(), Some(Bytes::new()));
        assert!(cache.del(""));
    }
}
