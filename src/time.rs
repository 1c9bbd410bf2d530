//! Compact monotonic time utilities.
//!
//! All timestamps in the cache (TTL deadlines, access times, decay
//! stamps) are `u64` milliseconds on a process-local monotonic clock.
//! Consumers only ever compare or subtract them, so the origin doesn't
//! matter — and unlike wall-clock time, this clock can't go backwards.

use std::sync::OnceLock;
use std::time::Instant;

/// Returns current monotonic time in milliseconds since process start.
#[inline]
pub fn now_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_millis() as u64
}

/// Converts a relative TTL into an absolute deadline.
#[inline]
pub fn deadline_after_ms(ttl_ms: u64) -> u64 {
    now_ms().saturating_add(ttl_ms)
}
