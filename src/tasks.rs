//! Background periodic work: active TTL expiration and LFU decay.
//!
//! The cache itself is single-threaded; these tasks interleave with
//! normal operations by taking the same mutex, so a cycle never
//! preempts an in-progress operation. Both tasks are plain tokio loops
//! with explicit handles — the owner aborts them at shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::usage::EvictionPolicy;

/// A cache shared between the caller and the background tasks.
pub type SharedCache = Arc<Mutex<Cache>>;

/// Spawns the active expiration task: every `interval`, run one
/// sampling cycle against keys nobody is reading.
pub fn spawn_expiration_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "expiration task started");
        loop {
            tokio::time::sleep(interval).await;
            let expired = cache.lock().await.run_active_expiration();
            if expired > 0 {
                debug!(expired, "active expiration cycle");
            }
        }
    })
}

/// Spawns the LFU decay task: every `interval`, age frequency counters
/// so formerly-hot keys stop outranking the current working set.
pub fn spawn_decay_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "decay task started");
        loop {
            tokio::time::sleep(interval).await;
            let decayed = cache.lock().await.run_decay_tick();
            if decayed > 0 {
                debug!(decayed, "frequency decay pass");
            }
        }
    })
}

/// Handles to the running background tasks.
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    expire: Option<JoinHandle<()>>,
    decay: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Starts the expiration task, and the decay task when the policy
    /// is LFU (LRU has no counters to age).
    pub fn start(cache: &SharedCache, config: &CacheConfig) -> Self {
        let expire = Some(spawn_expiration_task(cache.clone(), config.expire_interval));
        let decay = (config.eviction_policy == EvictionPolicy::Lfu)
            .then(|| spawn_decay_task(cache.clone(), config.decay_interval));
        Self { expire, decay }
    }

    /// Stops both tasks and flushes any pending TTL deletions.
    /// Idempotent — a second call finds nothing to stop.
    pub async fn shutdown(&mut self, cache: &SharedCache) {
        for handle in [self.expire.take(), self.decay.take()].into_iter().flatten() {
            handle.abort();
        }
        cache.lock().await.shutdown();
    }
}
