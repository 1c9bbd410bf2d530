use super::{Cache, DeleteCause, Entry};
use crate::error::WrongType;
use crate::memory;
use crate::types::sorted_set::{SortedSet, ZAddOutcome};
use crate::types::Value;

impl Cache {
    /// Adds a member to a sorted collection, creating it if the key is
    /// missing. Returns `Ok(true)` if a new member was added,
    /// `Ok(false)` if an existing member's score was (possibly) updated.
    pub fn zadd(&mut self, key: &str, score: f64, member: &str) -> Result<bool, WrongType> {
        self.begin_op();
        self.evict_if_needed();
        self.check_expired(key);

        match self.entries.get_mut(key) {
            None => {
                let mut ss = SortedSet::new();
                ss.add(member, score);
                let value = Value::Sorted(ss);
                let size = memory::entry_size(key, &value);
                self.entries.insert(
                    key,
                    Entry {
                        value,
                        memory_used: size,
                    },
                );
                self.memory.grow(size);
                self.usage.touch(key);
                Ok(true)
            }
            Some(entry) => match &mut entry.value {
                Value::Sorted(ss) => {
                    let added = ss.add(member, score) == ZAddOutcome::Added;
                    if added {
                        let delta = memory::sorted_member_cost(member);
                        entry.memory_used += delta;
                        self.memory.grow(delta);
                    }
                    self.usage.touch(key);
                    Ok(added)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Removes a member from a sorted collection. Returns `Ok(true)` if
    /// the member existed. An emptied collection is removed entirely.
    pub fn zrem(&mut self, key: &str, member: &str) -> Result<bool, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(false);
        }
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        match &mut entry.value {
            Value::Sorted(ss) => {
                if !ss.remove(member) {
                    return Ok(false);
                }
                let emptied = ss.is_empty();
                let delta = memory::sorted_member_cost(member);
                entry.memory_used = entry.memory_used.saturating_sub(delta);
                self.memory.shrink(delta);
                self.usage.touch(key);
                if emptied {
                    self.delete_key(key, DeleteCause::Explicit);
                }
                Ok(true)
            }
            _ => Err(WrongType),
        }
    }

    /// Returns the score of a member, or `None` if the key or member is
    /// missing.
    pub fn zscore(&mut self, key: &str, member: &str) -> Result<Option<f64>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(None);
        }
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Sorted(ss) => {
                    let score = ss.score(member);
                    self.usage.touch(key);
                    Ok(score)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Returns the 0-based rank of a member under (score, member)
    /// ordering, or `None` if the key or member is missing.
    pub fn zrank(&mut self, key: &str, member: &str) -> Result<Option<usize>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(None);
        }
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Sorted(ss) => {
                    let rank = ss.rank(member);
                    self.usage.touch(key);
                    Ok(rank)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Returns up to `limit` (member, score) pairs with scores in
    /// `[min, max]` inclusive, in rank order. A missing key yields an
    /// empty vec.
    pub fn zrange_by_score(
        &mut self,
        key: &str,
        min: f64,
        max: f64,
        limit: Option<usize>,
    ) -> Result<Vec<(String, f64)>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(vec![]);
        }
        match self.entries.get(key) {
            None => Ok(vec![]),
            Some(entry) => match &entry.value {
                Value::Sorted(ss) => {
                    let items = ss
                        .range_by_score(min, max, limit.unwrap_or(usize::MAX))
                        .into_iter()
                        .map(|(m, s)| (m.to_owned(), s))
                        .collect();
                    self.usage.touch(key);
                    Ok(items)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Returns the number of members, or 0 if the key is missing.
    pub fn zcard(&mut self, key: &str) -> Result<usize, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(0);
        }
        match self.entries.get(key) {
            None => Ok(0),
            Some(entry) => match &entry.value {
                Value::Sorted(ss) => Ok(ss.len()),
                _ => Err(WrongType),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zadd_creates_collection() {
        let mut cache = Cache::new();
        assert_eq!(cache.zadd("z", 1.0, "a"), Ok(true));
        assert_eq!(cache.zcard("z"), Ok(1));
        assert_eq!(cache.value_type("z"), "sorted");
    }

    #[test]
    fn zadd_score_update_returns_false() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "a").unwrap();
        assert_eq!(cache.zadd("z", 5.0, "a"), Ok(false));
        assert_eq!(cache.zscore("z", "a").unwrap(), Some(5.0));
        assert_eq!(cache.zcard("z"), Ok(1));
    }

    #[test]
    fn zadd_same_score_is_a_noop_update() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "a").unwrap();
        let before = cache.memory_used();
        assert_eq!(cache.zadd("z", 1.0, "a"), Ok(false));
        assert_eq!(cache.memory_used(), before);
    }

    #[test]
    fn ranks_follow_score_updates() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "a").unwrap();
        cache.zadd("z", 2.0, "b").unwrap();
        cache.zadd("z", 3.0, "c").unwrap();
        assert_eq!(cache.zadd("z", 4.0, "b"), Ok(false));

        assert_eq!(cache.zrank("z", "a").unwrap(), Some(0));
        assert_eq!(cache.zrank("z", "c").unwrap(), Some(1));
        assert_eq!(cache.zrank("z", "b").unwrap(), Some(2));
    }

    #[test]
    fn zrem_removes_then_reports_missing() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "a").unwrap();
        cache.zadd("z", 2.0, "b").unwrap();
        assert_eq!(cache.zrem("z", "b"), Ok(true));
        assert_eq!(cache.zrem("z", "b"), Ok(false));
        assert_eq!(cache.zscore("z", "b").unwrap(), None);
    }

    #[test]
    fn zrem_last_member_removes_key() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "only").unwrap();
        assert_eq!(cache.zrem("z", "only"), Ok(true));
        assert_eq!(cache.key_count(), 0);
        assert_eq!(cache.memory_used(), 0);
    }

    #[test]
    fn zscore_missing_key_and_member() {
        let mut cache = Cache::new();
        assert_eq!(cache.zscore("nope", "m").unwrap(), None);
        cache.zadd("z", 1.0, "a").unwrap();
        assert_eq!(cache.zscore("z", "ghost").unwrap(), None);
    }

    #[test]
    fn zrank_missing_returns_none() {
        let mut cache = Cache::new();
        assert_eq!(cache.zrank("nope", "m").unwrap(), None);
    }

    #[test]
    fn zrange_by_score_inclusive_and_limited() {
        let mut cache = Cache::new();
        for (score, member) in [(1.0, "a"), (2.0, "b"), (3.0, "c"), (4.0, "d")] {
            cache.zadd("z", score, member).unwrap();
        }

        let all = cache.zrange_by_score("z", 2.0, 4.0, None).unwrap();
        assert_eq!(
            all,
            vec![
                ("b".to_owned(), 2.0),
                ("c".to_owned(), 3.0),
                ("d".to_owned(), 4.0),
            ]
        );

        let capped = cache.zrange_by_score("z", 2.0, 4.0, Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].0, "b");
    }

    #[test]
    fn zrange_by_score_missing_key_is_empty() {
        let mut cache = Cache::new();
        assert!(cache.zrange_by_score("nope", 0.0, 10.0, None).unwrap().is_empty());
    }

    #[test]
    fn same_score_members_rank_lexicographically() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "bravo").unwrap();
        cache.zadd("z", 1.0, "alpha").unwrap();
        assert_eq!(cache.zrank("z", "alpha").unwrap(), Some(0));
        assert_eq!(cache.zrank("z", "bravo").unwrap(), Some(1));
    }

    #[test]
    fn wrongtype_on_scalar_key() {
        let mut cache = Cache::new();
        cache.set("s", "x", None);
        assert_eq!(cache.zadd("s", 1.0, "m"), Err(WrongType));
        assert_eq!(cache.zrem("s", "m"), Err(WrongType));
        assert_eq!(cache.zscore("s", "m"), Err(WrongType));
        assert_eq!(cache.zrank("s", "m"), Err(WrongType));
        assert_eq!(cache.zrange_by_score("s", 0.0, 1.0, None), Err(WrongType));
        assert_eq!(cache.zcard("s"), Err(WrongType));
    }

    #[test]
    fn wrongtype_does_not_mutate() {
        let mut cache = Cache::new();
        cache.set("s", "x", None);
        let before = cache.memory_used();
        let _ = cache.zadd("s", 1.0, "m");
        assert_eq!(cache.memory_used(), before);
        assert_eq!(cache.value_type("s"), "scalar");
    }

    #[test]
    fn memory_tracks_member_churn() {
        let mut cache = Cache::new();
        cache.zadd("z", 1.0, "alice").unwrap();
        let one = cache.memory_used();
        cache.zadd("z", 2.0, "bob").unwrap();
        let two = cache.memory_used();
        assert!(two > one);
        cache.zrem("z", "alice").unwrap();
        assert!(cache.memory_used() < two);
    }
}
