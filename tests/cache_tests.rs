use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::tempdir;

use breach_lens::cache::{CacheStore, Clock, FreshnessCache, MemoryStore, RocksStore};
use breach_lens::{BreachRecord, Error, FetchError};

const TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        })
    }

    fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Store that reads nothing and rejects every write.
struct FailingStore;

impl CacheStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &[u8]) -> Result<(), Error> {
        Err(Error::Cache("disk full".to_string()))
    }

    fn count_keys(&self) -> Result<usize, Error> {
        Ok(0)
    }

    fn clear_all(&self) -> Result<(), Error> {
        Ok(())
    }
}

fn records(entity: &str, exposed: u64) -> Vec<BreachRecord> {
    vec![BreachRecord {
        entity: entity.to_string(),
        records_exposed: exposed,
        ..BreachRecord::default()
    }]
}

#[test]
fn test_fresh_entry_skips_fetch() {
    let clock = ManualClock::new();
    let cache = FreshnessCache::new(MemoryStore::new()).with_clock(clock.clone());
    let calls = AtomicUsize::new(0);
    let fetch = || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, FetchError>(records("Acme", 100))
    };

    let first = cache.get_or_fetch("entities", fetch, TTL).unwrap();
    clock.advance(chrono::Duration::hours(23));
    let second = cache.get_or_fetch("entities", fetch, TTL).unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_expired_entry_is_refetched_and_overwritten() {
    let clock = ManualClock::new();
    let cache = FreshnessCache::new(MemoryStore::new()).with_clock(clock.clone());

    cache
        .get_or_fetch("entities", || Ok(records("Old", 1)), TTL)
        .unwrap();
    clock.advance(chrono::Duration::hours(25));

    let calls = AtomicUsize::new(0);
    let refreshed = cache
        .get_or_fetch(
            "entities",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(records("New", 2))
            },
            TTL,
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(refreshed[0].entity, "New");
    let stored = cache.stored("entities").unwrap();
    assert_eq!(stored.records[0].entity, "New");
    assert_eq!(stored.fetched_at, clock.now());
}

#[test]
fn test_failed_refresh_keeps_stale_entry() {
    let clock = ManualClock::new();
    let cache = FreshnessCache::new(MemoryStore::new()).with_clock(clock.clone());

    cache
        .get_or_fetch("entities", || Ok(records("Stale", 7)), TTL)
        .unwrap();
    clock.advance(chrono::Duration::days(2));

    let err = cache
        .get_or_fetch(
            "entities",
            || {
                Err(FetchError::Network {
                    source_id: "entities".to_string(),
                    reason: "connection refused".to_string(),
                })
            },
            TTL,
        )
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }));
    let stored = cache.stored("entities").unwrap();
    assert_eq!(stored.records, records("Stale", 7));
}

#[test]
fn test_write_failure_still_returns_data() {
    let cache = FreshnessCache::new(FailingStore);
    let data = cache
        .get_or_fetch("entities", || Ok(records("Acme", 5)), TTL)
        .unwrap();
    assert_eq!(data, records("Acme", 5));
    assert!(cache.stored("entities").is_none());
}

#[test]
fn test_sources_are_cached_independently() {
    let cache = FreshnessCache::new(MemoryStore::new());
    cache
        .get_or_fetch("a", || Ok(records("A", 1)), TTL)
        .unwrap();
    let b = cache
        .get_or_fetch("b", || Ok(records("B", 2)), TTL)
        .unwrap();
    assert_eq!(b[0].entity, "B");
    assert_eq!(cache.store().count_keys().unwrap(), 4);
}

#[test]
fn test_unreadable_entry_counts_as_absent() {
    let store = Arc::new(MemoryStore::new());
    store.put("entities:fetched_at", b"not a number").unwrap();
    store.put("entities:payload", b"[]").unwrap();
    let cache = FreshnessCache::new(store.clone());

    let calls = AtomicUsize::new(0);
    cache
        .get_or_fetch(
            "entities",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(records("Acme", 1))
            },
            TTL,
        )
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_callers_fetch_once() {
    let cache = FreshnessCache::new(MemoryStore::new());
    let calls = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let data = cache
                    .get_or_fetch(
                        "entities",
                        || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(records("Acme", 1))
                        },
                        TTL,
                    )
                    .unwrap();
                assert_eq!(data.len(), 1);
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rocks_store_persists_across_opens() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cache.db");

    {
        let cache = FreshnessCache::new(RocksStore::open(&path).unwrap());
        cache
            .get_or_fetch("entities", || Ok(records("Acme", 42)), TTL)
            .unwrap();
    }

    let cache = FreshnessCache::new(RocksStore::open(&path).unwrap());
    let data = cache
        .get_or_fetch(
            "entities",
            || panic!("fresh entry should not be refetched"),
            TTL,
        )
        .unwrap();
    assert_eq!(data, records("Acme", 42));

    assert_eq!(cache.store().count_keys().unwrap(), 2);
    cache.store().clear_all().unwrap();
    assert_eq!(cache.store().count_keys().unwrap(), 0);
}

#[test]
fn test_rocks_store_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("cache.db");
    let store = RocksStore::open(&path).unwrap();
    store.put("k", b"v").unwrap();
    assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
}

#[test]
fn test_rocks_store_parent_that_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let result = RocksStore::open(blocker.join("sub").join("cache.db"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_changed_origin_is_a_miss() {
    let cache = FreshnessCache::new(MemoryStore::new());
    let calls = AtomicUsize::new(0);
    let counter = &calls;
    let fetch = move |entity: &'static str| {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, FetchError>(records(entity, 1))
        }
    };

    cache
        .get_or_fetch_from("entities", Some("file:a.json"), fetch("A"), TTL)
        .unwrap();
    let same = cache
        .get_or_fetch_from("entities", Some("file:a.json"), fetch("unused"), TTL)
        .unwrap();
    assert_eq!(same[0].entity, "A");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let moved = cache
        .get_or_fetch_from("entities", Some("file:b.json"), fetch("B"), TTL)
        .unwrap();
    assert_eq!(moved[0].entity, "B");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        cache.stored("entities").unwrap().origin.as_deref(),
        Some("file:b.json")
    );
}
