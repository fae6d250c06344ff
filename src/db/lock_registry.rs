//! Per-database mutual exclusion.
//!
//! A [`LockRegistry`] maps a logical-database name to exactly one
//! [`DatabaseLock`]. Every adapter naming the same database shares that lock,
//! so no two operations against it ever hold a connection at the same time.
//! Different databases proceed without any coordination.
//!
//! Entries are created on first reference and live as long as the registry.
//! There is no removal.
//!
//! The lock is not re-entrant. Each public operation acquires it exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

static GLOBAL: LazyLock<LockRegistry> = LazyLock::new(LockRegistry::new);

/// Snapshot of a lock's instrumentation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStats {
    /// Times the lock has been acquired.
    pub acquisitions: u64,
    /// Connections currently open against the database.
    pub open_connections: usize,
    /// Highest number of simultaneously open connections ever observed.
    pub peak_connections: usize,
}

#[derive(Debug)]
struct LockEntry {
    name: String,
    mutex: Mutex<()>,
    acquisitions: AtomicU64,
    open_connections: AtomicUsize,
    peak_connections: AtomicUsize,
}

/// Shared handle to one logical database's lock.
#[derive(Debug, Clone)]
pub struct DatabaseLock {
    entry: Arc<LockEntry>,
}

/// Held for the full duration of one operation.
#[derive(Debug)]
pub struct DatabaseLockGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl DatabaseLock {
    fn new(name: &str) -> Self {
        Self {
            entry: Arc::new(LockEntry {
                name: name.to_string(),
                mutex: Mutex::new(()),
                acquisitions: AtomicU64::new(0),
                open_connections: AtomicUsize::new(0),
                peak_connections: AtomicUsize::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Block until the database is free.
    ///
    /// A poisoned mutex is recovered: it guards no data, only the right to
    /// hold a connection.
    pub fn acquire(&self) -> DatabaseLockGuard<'_> {
        let guard = match self.entry.mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(database = %self.entry.name, "Database lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        self.entry.acquisitions.fetch_add(1, Ordering::Relaxed);
        DatabaseLockGuard { _guard: guard }
    }

    pub fn stats(&self) -> LockStats {
        LockStats {
            acquisitions: self.entry.acquisitions.load(Ordering::Relaxed),
            open_connections: self.entry.open_connections.load(Ordering::Acquire),
            peak_connections: self.entry.peak_connections.load(Ordering::Acquire),
        }
    }

    /// Whether both handles refer to the same registry entry.
    pub fn same_lock(&self, other: &DatabaseLock) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }

    pub(crate) fn connection_opened(&self) {
        let open = self.entry.open_connections.fetch_add(1, Ordering::AcqRel) + 1;
        self.entry.peak_connections.fetch_max(open, Ordering::AcqRel);
    }

    pub(crate) fn connection_closed(&self) {
        // Saturate at 0
        let _ = self.entry.open_connections.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |n| n.checked_sub(1),
        );
    }
}

/// Registry of per-database locks.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: RwLock<HashMap<String, DatabaseLock>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, for use at the program boundary.
    pub fn global() -> &'static LockRegistry {
        &GLOBAL
    }

    /// Get the lock for `name`, creating it on first reference.
    pub fn lock_for(&self, name: &str) -> DatabaseLock {
        {
            let locks = self.locks.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(lock) = locks.get(name) {
                return lock.clone();
            }
        }

        // Re-check under the write lock; another thread may have inserted it
        let mut locks = self
            .locks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(database = %name, "Registered database lock");
                DatabaseLock::new(name)
            })
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Number of registered databases.
    pub fn len(&self) -> usize {
        self.locks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_name_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.lock_for("league.db");
        let b = registry.lock_for("league.db");
        let c = registry.lock_for("other.db");
        assert!(a.same_lock(&b));
        assert!(!a.same_lock(&c));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("league.db"));
        assert!(!registry.contains("missing.db"));
    }

    #[test]
    fn test_registries_are_independent() {
        let one = LockRegistry::new();
        let two = LockRegistry::new();
        assert!(!one.lock_for("db").same_lock(&two.lock_for("db")));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = LockRegistry::global().lock_for("lock_registry::global_test");
        let b = LockRegistry::global().lock_for("lock_registry::global_test");
        assert!(a.same_lock(&b));
    }

    #[test]
    fn test_concurrent_creation_yields_one_lock() {
        let registry = Arc::new(LockRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.lock_for("contended"))
            })
            .collect();
        let locks: Vec<DatabaseLock> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(locks.iter().all(|l| l.same_lock(&locks[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_acquire_serializes_holders() {
        let registry = LockRegistry::new();
        let lock = registry.lock_for("serial");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        let _held = lock.acquire();
                        lock.connection_opened();
                        thread::sleep(Duration::from_micros(200));
                        lock.connection_closed();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = lock.stats();
        assert_eq!(stats.acquisitions, 40);
        assert_eq!(stats.open_connections, 0);
        assert_eq!(stats.peak_connections, 1);
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let lock = LockRegistry::new().lock_for("poison");
        let cloned = lock.clone();
        let _ = thread::spawn(move || {
            let _held = cloned.acquire();
            panic!("poison the lock");
        })
        .join();
        let _held = lock.acquire();
        assert_eq!(lock.stats().acquisitions, 2);
    }

    #[test]
    fn test_connection_closed_saturates() {
        let lock = LockRegistry::new().lock_for("saturate");
        lock.connection_closed();
        assert_eq!(lock.stats().open_connections, 0);
    }
}
