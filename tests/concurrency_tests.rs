//! Concurrency Tests
//!
//! Many threads hammering one shared cache must never break its invariants.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use sized_lru::LruCache;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

fn value_for(thread: usize, i: usize) -> String {
    "x".repeat((thread * 31 + i * 7) % 64 + 1)
}

#[test]
fn test_concurrent_mixed_operations_keep_cache_consistent() {
    let cache = Arc::new(LruCache::new(2_048));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = format!("key{}", (t * 13 + i) % 97);
                    match i % 6 {
                        0 | 1 => cache.set(key, value_for(t, i)),
                        2 => {
                            cache.set_if_absent(key, value_for(t, i));
                        }
                        3 => {
                            if let Some(value) = cache.get(&key) {
                                assert!(value.chars().all(|c| c == 'x'), "torn value read");
                            }
                        }
                        4 => {
                            cache.delete(&key);
                        }
                        _ => {
                            let stats = cache.stats();
                            assert!(stats.length <= 1 || stats.size <= stats.capacity);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let items = cache.items();
    let stats = cache.stats();
    let summed: usize = items.iter().map(|item| item.value.len()).sum();
    let unique: HashSet<_> = items.iter().map(|item| item.key.clone()).collect();

    assert_eq!(stats.length, items.len());
    assert_eq!(stats.size, summed);
    assert_eq!(unique.len(), items.len());
    assert!(stats.size <= stats.capacity);
}

#[test]
fn test_concurrent_capacity_changes() {
    let cache = Arc::new(LruCache::new(1_000));

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..1_000 {
                    cache.set(format!("w{}-{}", t, i % 50), vec![0u8; 20]);
                }
            })
        })
        .collect();

    let resizer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..500 {
                cache.set_capacity(100 + (i % 10) * 100);
            }
            cache.set_capacity(300);
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    resizer.join().unwrap();

    cache.set_capacity(300);
    let stats = cache.stats();
    assert_eq!(stats.capacity, 300);
    assert!(stats.size <= 300);
    assert_eq!(stats.size, stats.length * 20);
}

#[test]
fn test_save_while_writing() {
    let cache = Arc::new(LruCache::new(10_000));
    for i in 0..100 {
        cache.set(format!("seed{}", i), format!("value{}", i));
    }

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..2_000 {
                cache.set(format!("live{}", i % 200), format!("v{}", i));
            }
        })
    };

    let mut snapshots = Vec::new();
    for _ in 0..20 {
        let mut buf = Vec::new();
        cache.save(&mut buf).unwrap();
        snapshots.push(buf);
    }
    writer.join().unwrap();

    for bytes in snapshots {
        let restored: LruCache<String> = LruCache::new(10_000);
        let count = restored.load(Cursor::new(&bytes)).unwrap();
        assert_eq!(restored.len(), count);
    }
}
