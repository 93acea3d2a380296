//! Concurrency tests for publishing while readers are active

use super::cache::SnapshotCache;
use super::snapshot::Snapshot;
use crate::roster::UserRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const USERS: usize = 25;

/// Every record in generation `n` has `git_frontend_blog == (n % 2 == 0)`
fn generation(n: usize) -> Snapshot {
    let records = (0..USERS)
        .map(|i| {
            let mut record = UserRecord::new(&format!("user{:02}", i));
            record.git_frontend_blog = n % 2 == 0;
            record.errors.insert("generation".to_string(), n.to_string());
            record
        })
        .collect();
    Snapshot::from_records(records)
}

#[test]
fn test_readers_never_observe_mixed_snapshots() {
    let cache = Arc::new(SnapshotCache::new());
    cache.publish(generation(0));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut reads = 0usize;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    let snapshot = cache.current();
                    assert_eq!(snapshot.len(), USERS, "partial snapshot observed");

                    let first = &snapshot.records()[0];
                    let marker = first.errors["generation"].clone();
                    for record in snapshot.records() {
                        assert_eq!(record.errors["generation"], marker);
                        assert_eq!(record.git_frontend_blog, first.git_frontend_blog);
                    }
                    reads += 1;
                    if finished {
                        break;
                    }
                }
                reads
            })
        })
        .collect();

    for n in 1..=500 {
        cache.publish(generation(n));
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        let reads = reader.join().expect("reader thread panicked");
        assert!(reads > 0);
    }
    assert_eq!(cache.current().records()[0].errors["generation"], "500");
}

#[tokio::test]
async fn test_async_readers_during_publish() {
    let cache = Arc::new(SnapshotCache::new());

    let writer = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            for n in 0..200 {
                cache.publish(generation(n));
                tokio::task::yield_now().await;
            }
        })
    };

    let mut observed = 0;
    while !writer.is_finished() {
        let snapshot = cache.current();
        assert!(snapshot.is_empty() || snapshot.len() == USERS);
        observed += 1;
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();

    assert!(observed > 0);
    assert_eq!(cache.current().len(), USERS);
}
