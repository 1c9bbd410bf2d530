//! cinder: an in-process, memory-bounded key-value cache.
//!
//! Three value shapes (opaque scalars, score-ordered member collections,
//! member sets with a compact integer encoding), a bounded memory budget
//! enforced by pool-based approximate eviction, and TTL expiration both
//! passive (on access) and active (background sampling).
//!
//! The [`Cache`] itself is single-threaded and lock-free; hosts that need
//! parallelism wrap it in `Arc<Mutex<_>>` and drive the background work
//! through [`tasks`].

pub mod cache;
pub mod config;
pub mod dict;
pub mod error;
pub mod memory;
pub mod tasks;
pub mod time;
pub mod ttl;
pub mod types;
pub mod usage;

pub use cache::{Cache, CacheStats};
pub use config::CacheConfig;
pub use error::WrongType;
pub use tasks::{BackgroundTasks, SharedCache};
pub use types::int_set::MemberSet;
pub use types::sorted_set::SortedSet;
pub use types::Value;
pub use usage::EvictionPolicy;
