//! Data type representations for stored values.
//!
//! Each entry holds exactly one of three shapes. The enum tag doubles
//! as the type check: an operation against the wrong variant is a
//! WRONGTYPE failure, decided by a single `matches!` before anything
//! mutates.

pub mod int_set;
pub mod skiplist;
pub mod sorted_set;

use bytes::Bytes;

use int_set::MemberSet;
use sorted_set::SortedSet;

/// A stored value in the cache.
#[derive(Debug)]
pub enum Value {
    /// Opaque byte-string. `Bytes` gives cheap clones and binary safety.
    Scalar(Bytes),

    /// Unique string members ordered by (score, member).
    Sorted(SortedSet),

    /// Unordered unique members; the variant inside carries the
    /// compact/general encoding.
    Members(MemberSet),
}

/// Returns the shape name for a value, for introspection and logs.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Scalar(_) => "scalar",
        Value::Sorted(_) => "sorted",
        Value::Members(_) => "set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(type_name(&Value::Scalar(Bytes::from("x"))), "scalar");
        assert_eq!(type_name(&Value::Sorted(SortedSet::new())), "sorted");
        assert_eq!(type_name(&Value::Members(MemberSet::new())), "set");
    }
}
