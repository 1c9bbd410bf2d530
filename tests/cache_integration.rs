//! End-to-end scenarios against the public cache API.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;

use cinder::{
    tasks::spawn_expiration_task, BackgroundTasks, Cache, CacheConfig, EvictionPolicy, WrongType,
};

#[test]
fn scalar_lifecycle() {
    let mut cache = Cache::new();

    cache.set("foo", "bar", None);
    assert_eq!(cache.get("foo").unwrap(), Some(Bytes::from("bar")));

    assert!(cache.del("foo"));
    assert_eq!(cache.get("foo").unwrap(), None);
}

#[test]
fn passive_expiration_on_read() {
    let mut cache = Cache::new();

    cache.set("temp", "v", Some(100));
    std::thread::sleep(Duration::from_millis(150));

    assert_eq!(cache.get("temp").unwrap(), None);
    assert_eq!(cache.key_count(), 0);
}

#[tokio::test]
async fn active_expiration_without_reads() {
    let cache = Arc::new(Mutex::new(Cache::new()));
    {
        let mut c = cache.lock().await;
        for i in 0..10 {
            c.set(&format!("k{i}"), Bytes::from(format!("v{i}")), Some(50));
        }
    }

    let handle = spawn_expiration_task(cache.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    let mut c = cache.lock().await;
    c.shutdown();
    for i in 0..10 {
        assert_eq!(c.get(&format!("k{i}")).unwrap(), None, "k{i} survived");
    }
}

#[test]
fn wrongtype_in_both_directions() {
    let mut cache = Cache::new();

    cache.set("s", "x", None);
    assert_eq!(cache.zadd("s", 1.0, "m"), Err(WrongType));

    cache.zadd("z", 1.0, "m").unwrap();
    assert_eq!(cache.get("z"), Err(WrongType));
}

#[test]
fn sorted_collection_scenario() {
    let mut cache = Cache::new();

    assert_eq!(cache.zadd("z", 1.0, "a"), Ok(true));
    assert_eq!(cache.zadd("z", 2.0, "b"), Ok(true));
    assert_eq!(cache.zadd("z", 3.0, "c"), Ok(true));
    // score update, not an add
    assert_eq!(cache.zadd("z", 4.0, "b"), Ok(false));

    assert_eq!(cache.zrank("z", "a").unwrap(), Some(0));
    assert_eq!(cache.zrank("z", "c").unwrap(), Some(1));
    assert_eq!(cache.zrank("z", "b").unwrap(), Some(2));

    assert_eq!(cache.zrem("z", "b"), Ok(true));
    assert_eq!(cache.zrem("z", "b"), Ok(false));
    assert_eq!(cache.zscore("z", "b").unwrap(), None);
}

#[test]
fn eviction_under_memory_budget() {
    let config = CacheConfig {
        max_memory: Some(640),
        eviction_policy: EvictionPolicy::Lru,
        ..CacheConfig::default()
    };
    let mut cache = Cache::with_config(config);

    for i in 0..20 {
        cache.set(&format!("key{i}"), Bytes::from(format!("value{i}")), None);
    }

    let stats = cache.get_stats();
    assert!(stats.key_count < 20, "expected evictions, kept everything");
    assert!(stats.key_count > 0, "evicted everything");
    assert!(stats.evictions > 0);
}

#[test]
fn member_set_upgrade_scenario() {
    let mut cache = Cache::new();

    cache.sadd("s", &["1", "2", "3"]).unwrap();
    assert_eq!(cache.set_encoding("s").unwrap(), Some("compact"));

    cache.sadd("s", &["string"]).unwrap();
    assert_eq!(cache.set_encoding("s").unwrap(), Some("general"));
    assert_eq!(cache.smembers("s").unwrap().len(), 4);
}

#[test]
fn stats_snapshot_is_consistent() {
    let mut cache = Cache::new();

    cache.set("a", "1", None);
    let _ = cache.get("a");
    let _ = cache.get("missing");
    cache.zadd("z", 1.0, "m").unwrap();
    cache.sadd("s", &["1"]).unwrap();

    let stats = cache.get_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate, 0.5);
    assert_eq!(stats.key_count, 3);
    assert_eq!(stats.operations, 5);
    assert!(stats.memory_used > 0);
}

#[tokio::test]
async fn full_shutdown_leaves_a_quiescent_cache() {
    let config = CacheConfig {
        eviction_policy: EvictionPolicy::Lfu,
        expire_interval: Duration::from_millis(10),
        decay_interval: Duration::from_millis(10),
        ..CacheConfig::default()
    };
    let cache = Arc::new(Mutex::new(Cache::with_config(config.clone())));
    let mut tasks = BackgroundTasks::start(&cache, &config);

    cache
        .lock()
        .await
        .set("k", Bytes::from("v"), Some(60_000));

    tasks.shutdown(&cache).await;
    tasks.shutdown(&cache).await;

    // still answers reads and writes after shutdown
    let mut c = cache.lock().await;
    assert_eq!(c.get("k").unwrap(), Some(Bytes::from("v")));
    c.set("later", Bytes::from("w"), None);
    assert!(c.exists("later"));
}

#[test]
fn mixed_shapes_share_one_keyspace() {
    let mut cache = Cache::new();

    cache.set("scalar", "v", None);
    cache.zadd("sorted", 1.0, "m").unwrap();
    cache.sadd("members", &["1"]).unwrap();
    assert_eq!(cache.key_count(), 3);

    // deleting each shape goes through the same path
    assert!(cache.del("scalar"));
    assert!(cache.del("sorted"));
    assert!(cache.del("members"));
    assert_eq!(cache.key_count(), 0);
    assert_eq!(cache.memory_used(), 0);
}
