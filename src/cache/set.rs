use super::{Cache, DeleteCause, Entry};
use crate::error::WrongType;
use crate::memory;
use crate::types::int_set::MemberSet;
use crate::types::Value;

impl Cache {
    /// Adds members to a set, creating it (in the compact encoding) if
    /// the key is missing. Members that don't fit the compact form
    /// upgrade the encoding in place before the add completes. Returns
    /// the number of members that were new.
    pub fn sadd(&mut self, key: &str, members: &[&str]) -> Result<usize, WrongType> {
        self.begin_op();
        self.evict_if_needed();
        self.check_expired(key);
        if members.is_empty() {
            return Ok(0);
        }

        let is_new = match self.entries.get(key) {
            None => true,
            Some(entry) => match &entry.value {
                Value::Members(_) => false,
                _ => return Err(WrongType),
            },
        };
        if is_new {
            let value = Value::Members(MemberSet::new());
            let size = memory::entry_size(key, &value);
            self.memory.grow(size);
            self.entries.insert(
                key,
                Entry {
                    value,
                    memory_used: size,
                },
            );
        }

        let Some(entry) = self.entries.get_mut(key) else {
            unreachable!("entry inserted or verified above");
        };
        let Value::Members(set) = &mut entry.value else {
            unreachable!("shape verified above");
        };

        let mut added = 0;
        let mut grown = 0usize;
        for member in members {
            let before = memory::member_set_size(set);
            if set.add(member) {
                added += 1;
            }
            // the size can jump on an encoding upgrade, not just by the
            // one member, so measure rather than assume a flat delta
            grown += memory::member_set_size(set) - before;
        }
        entry.memory_used += grown;
        self.memory.grow(grown);
        self.usage.touch(key);
        Ok(added)
    }

    /// Removes members from a set. Returns the number actually removed.
    /// An emptied set is removed entirely.
    pub fn srem(&mut self, key: &str, members: &[&str]) -> Result<usize, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(0);
        }
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(0);
        };
        match &mut entry.value {
            Value::Members(set) => {
                let mut removed = 0;
                let mut freed = 0usize;
                for member in members {
                    let before = memory::member_set_size(set);
                    if set.remove(member) {
                        removed += 1;
                    }
                    freed += before - memory::member_set_size(set);
                }
                let emptied = set.is_empty();
                entry.memory_used = entry.memory_used.saturating_sub(freed);
                self.memory.shrink(freed);
                self.usage.touch(key);
                if emptied {
                    self.delete_key(key, DeleteCause::Explicit);
                }
                Ok(removed)
            }
            _ => Err(WrongType),
        }
    }

    /// Returns all members. Compact sets list ascending numeric order;
    /// general sets are unordered. A missing key yields an empty vec.
    pub fn smembers(&mut self, key: &str) -> Result<Vec<String>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(vec![]);
        }
        match self.entries.get(key) {
            None => Ok(vec![]),
            Some(entry) => match &entry.value {
                Value::Members(set) => {
                    let members = set.members();
                    self.usage.touch(key);
                    Ok(members)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Returns `true` if the member is in the set.
    pub fn sismember(&mut self, key: &str, member: &str) -> Result<bool, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(false);
        }
        match self.entries.get(key) {
            None => Ok(false),
            Some(entry) => match &entry.value {
                Value::Members(set) => {
                    let present = set.contains(member);
                    self.usage.touch(key);
                    Ok(present)
                }
                _ => Err(WrongType),
            },
        }
    }

    /// Returns the number of members, or 0 if the key is missing.
    pub fn scard(&mut self, key: &str) -> Result<usize, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(0);
        }
        match self.entries.get(key) {
            None => Ok(0),
            Some(entry) => match &entry.value {
                Value::Members(set) => Ok(set.len()),
                _ => Err(WrongType),
            },
        }
    }

    /// Returns the encoding tag of a set (`"compact"` or `"general"`),
    /// or `None` if the key is missing.
    pub fn set_encoding(&mut self, key: &str) -> Result<Option<&'static str>, WrongType> {
        self.begin_op();
        if self.check_expired(key) {
            return Ok(None);
        }
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Members(set) => Ok(Some(set.encoding())),
                _ => Err(WrongType),
            },
        }
    }
}
