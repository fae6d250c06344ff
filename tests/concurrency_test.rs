//! Serialization tests: concurrent callers on one logical database never hold
//! more than one connection at a time.

mod common;

use common::{CREATE_TABLE, TABLE};
use sqlhelper::db::{EmbeddedStore, LockRegistry, Store};
use sqlhelper::models::EmbeddedConfig;
use sqlhelper::{Record, SelectQuery, Value};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const INSERTS_PER_THREAD: usize = 10;

fn team(thread: usize, round: usize) -> Record {
    Record::new()
        .with("Pos", (thread * INSERTS_PER_THREAD + round) as i64)
        .with("Team", format!("Team {thread}-{round}"))
        .with("Pld", 0i64)
        .with("W", 0i64)
        .with("D", 0i64)
        .with("L", 0i64)
        .with("GF", 0i64)
        .with("GA", 0i64)
        .with("GD", 0i64)
        .with("Pts", 0i64)
}

#[test]
fn test_separate_handles_on_one_file_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("league.db");
    let registry = Arc::new(LockRegistry::new());

    EmbeddedStore::open(EmbeddedConfig::new(&path), &registry)
        .unwrap()
        .execute_raw(CREATE_TABLE)
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let path = path.clone();
            thread::spawn(move || {
                // Each thread owns its own adapter instance
                let store = EmbeddedStore::open(EmbeddedConfig::new(&path), &registry).unwrap();
                let mut ids = Vec::new();
                for round in 0..INSERTS_PER_THREAD {
                    ids.push(store.insert(TABLE, &team(t, round)).unwrap());
                    store
                        .update(
                            TABLE,
                            &Record::new().with("Pts", round as i64),
                            "Team",
                            &Value::from(format!("Team {t}-{round}")),
                        )
                        .unwrap();
                }
                ids
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), THREADS * INSERTS_PER_THREAD);

    let store = EmbeddedStore::open(EmbeddedConfig::new(&path), &registry).unwrap();
    let rows = store.select(&SelectQuery::new(TABLE).columns(["Team"])).unwrap();
    assert_eq!(rows.len(), THREADS * INSERTS_PER_THREAD);

    let stats = store.lock().stats();
    assert_eq!(stats.peak_connections, 1);
    assert_eq!(stats.open_connections, 0);
    // create + (insert + update) per round + final select
    assert_eq!(
        stats.acquisitions,
        (2 + 2 * THREADS * INSERTS_PER_THREAD) as u64
    );
}

#[test]
fn test_handles_share_lock_per_database_only() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LockRegistry::new();

    let first = EmbeddedStore::open(EmbeddedConfig::new(dir.path().join("a.db")), &registry).unwrap();
    let again = EmbeddedStore::open(EmbeddedConfig::new(dir.path().join("a.db")), &registry).unwrap();
    let other = EmbeddedStore::open(EmbeddedConfig::new(dir.path().join("b.db")), &registry).unwrap();

    assert!(first.lock().same_lock(again.lock()));
    assert!(!first.lock().same_lock(other.lock()));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_different_databases_proceed_independently() {
    let dir = tempfile::tempdir().unwrap();
    let registry = LockRegistry::new();
    let busy = EmbeddedStore::open(EmbeddedConfig::new(dir.path().join("busy.db")), &registry).unwrap();
    let free = EmbeddedStore::open(EmbeddedConfig::new(dir.path().join("free.db")), &registry).unwrap();

    // Holding one database's lock must not block the other database.
    let _held = busy.lock().acquire();
    let worker = thread::spawn(move || {
        free.execute_raw("CREATE TABLE t (x INTEGER)").unwrap();
        free.insert("t", &Record::new().with("x", 1)).unwrap()
    });
    assert_eq!(worker.join().unwrap(), 1);
}
