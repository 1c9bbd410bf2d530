//! Cache configuration.
//!
//! A plain struct with defaults, an environment-variable constructor
//! for hosts that configure through the process environment, and
//! parsing helpers for CLI-friendly strings ("64M", "lfu").

use std::env;
use std::time::Duration;

use crate::ttl::ACTIVE_INTERVAL_MS;
use crate::usage::{EvictionPolicy, DECAY_INTERVAL_MS};

/// Configuration for a [`crate::Cache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Memory budget in bytes. `None` means unbounded.
    pub max_memory: Option<usize>,
    /// Which usage signal picks eviction victims.
    pub eviction_policy: EvictionPolicy,
    /// Keys sampled per eviction-pool refill (the pool draws twice this
    /// many candidates).
    pub eviction_sample_size: usize,
    /// How often the active expiration task fires.
    pub expire_interval: Duration,
    /// How often the LFU decay task fires. Ignored under LRU.
    pub decay_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory: None,
            eviction_policy: EvictionPolicy::Lru,
            eviction_sample_size: 8,
            expire_interval: Duration::from_millis(ACTIVE_INTERVAL_MS),
            decay_interval: Duration::from_millis(DECAY_INTERVAL_MS),
        }
    }
}

impl CacheConfig {
    /// Builds a config from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    ///
    /// # Environment variables
    /// - `CINDER_MAX_MEMORY` — byte budget, plain or suffixed ("64M")
    /// - `CINDER_EVICTION_POLICY` — "lru" or "lfu"
    /// - `CINDER_EVICTION_SAMPLE_SIZE` — keys sampled per pool refill
    /// - `CINDER_EXPIRE_INTERVAL_MS` — active expiration period
    /// - `CINDER_DECAY_INTERVAL_MS` — LFU decay period
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_memory: env::var("CINDER_MAX_MEMORY")
                .ok()
                .and_then(|v| parse_byte_size(&v).ok()),
            eviction_policy: env::var("CINDER_EVICTION_POLICY")
                .ok()
                .and_then(|v| parse_eviction_policy(&v).ok())
                .unwrap_or(defaults.eviction_policy),
            eviction_sample_size: env::var("CINDER_EVICTION_SAMPLE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.eviction_sample_size),
            expire_interval: env::var("CINDER_EXPIRE_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.expire_interval),
            decay_interval: env::var("CINDER_DECAY_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.decay_interval),
        }
    }
}

/// Parses a human-readable byte size string into a number of bytes.
///
/// Supports suffixes: K/KB (kibibytes), M/MB (mebibytes), G/GB
/// (gibibytes). Plain numbers are treated as bytes. Case insensitive.
pub fn parse_byte_size(input: &str) -> Result<usize, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty byte size string".into());
    }

    let upper = input.to_ascii_uppercase();

    let (num_str, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = upper.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix('K') {
        (n, 1024)
    } else {
        (upper.as_str(), 1)
    };

    let num: usize = num_str
        .parse()
        .map_err(|_| format!("invalid byte size: '{input}'"))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("byte size overflow: '{input}'"))
}

/// Parses an eviction policy name.
pub fn parse_eviction_policy(input: &str) -> Result<EvictionPolicy, String> {
    match input.to_ascii_lowercase().as_str() {
        "lru" => Ok(EvictionPolicy::Lru),
        "lfu" => Ok(EvictionPolicy::Lfu),
        _ => Err(format!(
            "unknown eviction policy '{input}'. valid options: lru, lfu"
        )),
    }
}
