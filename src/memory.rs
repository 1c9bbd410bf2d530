//! Memory accounting for cache entries.
//!
//! Provides byte-level estimates of what each entry costs and a running
//! counter the coordinator updates on every mutation, so the eviction
//! check never has to scan the keyspace.
//!
//! The estimates are deliberately coarse: string payloads are charged
//! at two bytes per byte (a blunt stand-in for allocator overhead and
//! wide-character hosts), and each shape carries a flat per-entry or
//! per-member overhead. Precision isn't the point — the numbers only
//! need to be stable and move monotonically with the data so the
//! budget check fires reliably.

use crate::types::{int_set::MemberSet, Value};

/// Fixed overhead charged to every scalar entry.
pub const SCALAR_OVERHEAD: usize = 48;

/// Per-member overhead of a sorted collection: skip-list node, links,
/// and the member→score map slot.
pub const SORTED_MEMBER_OVERHEAD: usize = 80;

/// Bytes charged per member of a compact (integer array) set.
pub const COMPACT_MEMBER_BYTES: usize = 8;

/// Bytes charged per member of a general (hash) set.
pub const GENERAL_MEMBER_BYTES: usize = 40;

/// Estimated cost of one sorted-collection member.
pub fn sorted_member_cost(member: &str) -> usize {
    member.len() * 2 + SORTED_MEMBER_OVERHEAD
}

/// Estimated payload cost of a member set under its current encoding.
pub fn member_set_size(set: &MemberSet) -> usize {
    match set {
        MemberSet::Compact(ints) => ints.len() * COMPACT_MEMBER_BYTES,
        MemberSet::General(s) => s.len() * GENERAL_MEMBER_BYTES,
    }
}

/// Estimates the total memory footprint of a single entry.
pub fn entry_size(key: &str, value: &Value) -> usize {
    let key_cost = key.len() * 2;
    match value {
        Value::Scalar(data) => key_cost + data.len() * 2 + SCALAR_OVERHEAD,
        Value::Sorted(ss) => {
            key_cost + ss.iter().map(|(m, _)| sorted_member_cost(m)).sum::<usize>()
        }
        Value::Members(set) => key_cost + member_set_size(set),
    }
}

/// Running total of estimated memory used by live entries.
///
/// All updates are explicit — the coordinator calls `grow` / `shrink`
/// with the same deltas it applies to each entry's own `memory_used`.
/// Subtraction saturates at zero so small accounting drift can never
/// underflow the counter.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    used_bytes: usize,
}

impl MemoryTracker {
    /// Creates a tracker with zero usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current estimated usage in bytes.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Records `delta` additional bytes.
    pub fn grow(&mut self, delta: usize) {
        self.used_bytes = self.used_bytes.saturating_add(delta);
    }

    /// Releases `delta` bytes.
    pub fn shrink(&mut self, delta: usize) {
        self.used_bytes = self.used_bytes.saturating_sub(delta);
    }
}
