//! Member sets: a compact integer encoding with an upgrade protocol.
//!
//! A set whose members all look like integers is stored as a sorted
//! `Vec<i64>` — 8 bytes per member instead of a heap string plus hash
//! bucket. The first non-integer member, or growth past the cap,
//! upgrades the set in place to a general hash set of strings. The
//! transition is one-way: sets never downgrade.

use std::collections::HashSet;

/// Maximum number of entries a compact set holds before it upgrades.
pub const COMPACT_SET_CAP: usize = 512;

/// Outcome of adding a value to an [`IntSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSetAdd {
    /// The value was inserted.
    Added,
    /// The value was already present.
    Present,
    /// The set is at capacity; the caller must upgrade before retrying.
    UpgradeRequired,
}

/// A sorted array of unique integers with a fixed capacity.
#[derive(Debug, Clone)]
pub struct IntSet {
    values: Vec<i64>,
    cap: usize,
}

impl IntSet {
    /// Creates an empty set with the default capacity.
    pub fn new() -> Self {
        Self::with_cap(COMPACT_SET_CAP)
    }

    /// Creates an empty set with a custom capacity.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            values: Vec::new(),
            cap,
        }
    }

    /// Inserts a value, keeping the array sorted.
    pub fn add(&mut self, value: i64) -> IntSetAdd {
        match self.values.binary_search(&value) {
            Ok(_) => IntSetAdd::Present,
            Err(pos) => {
                if self.values.len() >= self.cap {
                    return IntSetAdd::UpgradeRequired;
                }
                self.values.insert(pos, value);
                IntSetAdd::Added
            }
        }
    }

    /// Returns `true` if the value is present.
    pub fn contains(&self, value: i64) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Removes a value. Returns `true` if it was present.
    pub fn remove(&mut self, value: i64) -> bool {
        match self.values.binary_search(&value) {
            Ok(pos) => {
                self.values.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.values.iter().copied()
    }
}

impl Default for IntSet {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of string members in one of two encodings: compact (integers
/// only, bounded) or general (arbitrary strings).
#[derive(Debug, Clone)]
pub enum MemberSet {
    /// Sorted integer array; every member parses as `i64`.
    Compact(IntSet),
    /// Hash set of arbitrary members.
    General(HashSet<String>),
}

impl MemberSet {
    /// Creates an empty set in the compact encoding.
    pub fn new() -> Self {
        MemberSet::Compact(IntSet::new())
    }

    /// Returns the encoding tag: `"compact"` or `"general"`.
    pub fn encoding(&self) -> &'static str {
        match self {
            MemberSet::Compact(_) => "compact",
            MemberSet::General(_) => "general",
        }
    }

    /// Adds a member, upgrading the encoding when the compact form
    /// can't hold it (non-integer member or capacity reached). Returns
    /// `true` if the member was newly added.
    pub fn add(&mut self, member: &str) -> bool {
        match self {
            MemberSet::Compact(ints) => match member.parse::<i64>() {
                Ok(value) => match ints.add(value) {
                    IntSetAdd::Added => true,
                    IntSetAdd::Present => false,
                    IntSetAdd::UpgradeRequired => {
                        self.upgrade();
                        self.add(member)
                    }
                },
                Err(_) => {
                    self.upgrade();
                    self.add(member)
                }
            },
            MemberSet::General(set) => set.insert(member.to_owned()),
        }
    }

    /// Returns `true` if the member is present.
    pub fn contains(&self, member: &str) -> bool {
        match self {
            MemberSet::Compact(ints) => member
                .parse::<i64>()
                .map(|v| ints.contains(v))
                .unwrap_or(false),
            MemberSet::General(set) => set.contains(member),
        }
    }

    /// Removes a member. Returns `true` if it was present.
    pub fn remove(&mut self, member: &str) -> bool {
        match self {
            MemberSet::Compact(ints) => member
                .parse::<i64>()
                .map(|v| ints.remove(v))
                .unwrap_or(false),
            MemberSet::General(set) => set.remove(member),
        }
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        match self {
            MemberSet::Compact(ints) => ints.len(),
            MemberSet::General(set) => set.len(),
        }
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all members as strings. Compact sets yield ascending
    /// numeric order; general sets are unordered.
    pub fn members(&self) -> Vec<String> {
        match self {
            MemberSet::Compact(ints) => ints.iter().map(|v| v.to_string()).collect(),
            MemberSet::General(set) => set.iter().cloned().collect(),
        }
    }

    /// Rebuilds the set in the general encoding from its current
    /// contents.
    fn upgrade(&mut self) {
        if let MemberSet::Compact(ints) = self {
            let general: HashSet<String> = ints.iter().map(|v| v.to_string()).collect();
            *self = MemberSet::General(general);
        }
    }
}

impl Default for MemberSet {
    fn default() -> Self {
        Self::new()
    }
}
