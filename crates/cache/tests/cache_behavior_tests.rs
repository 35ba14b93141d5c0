//! Behavioral tests for the cache through its public API.
//!
//! These tests verify the contracts callers rely on:
//! - TTL expiry and file invalidation are observed on read
//! - Overlapping writers never corrupt an entry
//! - Namespaces are isolated from one another

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::TimeDelta;
use monorail_cache::{Cache, CacheConfig, ManualClock};
use proptest::prelude::*;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[test]
fn test_ttl_entry_absent_after_simulated_elapse() {
    let clock = Arc::new(ManualClock::default());
    let cache = Cache::with_clock(CacheConfig::default(), clock.clone());

    cache.set("k", &"v", Duration::from_secs(1)).unwrap();
    assert_eq!(cache.get::<String>("k").as_deref(), Some("v"));

    let entry = cache.entry("k").unwrap();
    clock.set(entry.expires_at + TimeDelta::milliseconds(1));
    assert_eq!(cache.get::<String>("k"), None);
}

#[test]
fn test_file_invalidated_entry_absent_after_touch() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("pnpm-workspace.yaml");
    fs::write(&file, "packages:\n  - 'packages/*'\n").unwrap();

    let cache = Cache::default();
    cache
        .set_with_file("k", &"v", &file, Duration::from_secs(300))
        .unwrap();
    assert_eq!(cache.get_with_file::<String>("k", &file).as_deref(), Some("v"));

    let later = SystemTime::now() + Duration::from_secs(30);
    fs::File::options()
        .write(true)
        .open(&file)
        .unwrap()
        .set_modified(later)
        .unwrap();
    assert_eq!(cache.get_with_file::<String>("k", &file), None);
}

#[test]
fn test_concurrent_writers_leave_a_whole_value() {
    let cache = Arc::new(Cache::new(
        CacheConfig::default().with_lock_retries(10_000, Duration::from_micros(50)),
    ));

    let handles: Vec<_> = (0..8)
        .map(|writer| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let value: Vec<u32> = vec![writer; 64];
                let mut failures = 0;
                for _ in 0..50 {
                    if cache.set("shared", &value, Duration::from_secs(60)).is_err() {
                        failures += 1;
                    }
                }
                failures
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stored: Vec<u32> = cache.get("shared").unwrap();
    assert_eq!(stored.len(), 64);
    assert!(stored.iter().all(|v| *v == stored[0]));
}

#[test]
fn test_stats_track_activity() {
    let cache = Cache::default();
    cache.set("a", &1, Duration::from_secs(60)).unwrap();
    let _ = cache.get::<i32>("a");
    let _ = cache.get::<i32>("missing");

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.sets, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}".prop_map(String::from)
}

proptest! {
    #[test]
    fn namespaced_reads_match_prefixed_reads(ns in segment(), key in segment(), value in any::<u32>()) {
        let cache = Cache::default();
        cache.namespace(&ns).set(&key, &value, Duration::from_secs(60)).unwrap();

        let direct: Option<u32> = cache.get(&format!("{ns}:{key}"));
        prop_assert_eq!(direct, Some(value));
    }

    #[test]
    fn clearing_one_namespace_spares_others(a in segment(), b in segment(), key in segment()) {
        prop_assume!(a != b);
        let cache = Cache::default();
        cache.namespace(&a).set(&key, &1_u8, Duration::from_secs(60)).unwrap();
        cache.namespace(&b).set(&key, &2_u8, Duration::from_secs(60)).unwrap();

        cache.namespace(&a).clear().unwrap();
        prop_assert_eq!(cache.namespace(&a).get::<u8>(&key), None);
        prop_assert_eq!(cache.namespace(&b).get::<u8>(&key), Some(2));
    }
}
