//! Database abstraction layer.
//!
//! This module provides the four-operation contract and its two backends:
//! - Per-database lock registry
//! - Connection bracketing around every operation
//! - Parameterized statement construction
//! - Row decoding and parameter binding
//! - Embedded (SQLite) and networked (MySQL) adapters
//!
//! Every operation follows the same path: acquire the database's lock, open a
//! connection, build and run one statement, collect rows if any, close the
//! connection, release the lock.

pub(crate) mod blocking;
pub mod embedded;
pub mod guard;
pub mod lock_registry;
pub(crate) mod params;
pub mod server;
pub mod statement;
pub mod types;

pub use embedded::EmbeddedStore;
pub use guard::ConnectionGuard;
pub use lock_registry::{DatabaseLock, DatabaseLockGuard, LockRegistry, LockStats};
pub use server::ServerStore;
pub use statement::{PlaceholderStyle, Statement, StatementBuilder};

use crate::error::DbResult;
use crate::models::{DatabaseType, Operation, Outcome, Record, Row, SelectQuery, StoreConfig, Value};

/// The uniform CRUD contract, identical across backends.
///
/// All methods block the calling thread until the operation has finished and
/// its connection is closed. Table and column names are trusted identifiers
/// and are not escaped.
pub trait Store: Send + Sync + std::fmt::Debug {
    fn database_type(&self) -> DatabaseType;

    /// The lock shared by every handle on this logical database.
    fn lock(&self) -> &DatabaseLock;

    /// Insert one row and return the identifier the backend assigned to it.
    fn insert(&self, table: &str, values: &Record) -> DbResult<i64>;

    /// Set `values` on every row where `key_name = key_value`.
    fn update(&self, table: &str, values: &Record, key_name: &str, key_value: &Value) -> DbResult<()>;

    /// Rows holding exactly the requested columns, in requested order.
    fn select(&self, query: &SelectQuery) -> DbResult<Vec<Row>>;

    /// Run trusted statement text verbatim, without parameters.
    fn execute_raw(&self, sql: &str) -> DbResult<()>;

    /// Dispatch an [`Operation`].
    fn apply(&self, operation: &Operation) -> DbResult<Outcome> {
        match operation {
            Operation::Insert { table, values } => self.insert(table, values).map(Outcome::Inserted),
            Operation::Update {
                table,
                values,
                key_name,
                key_value,
            } => self
                .update(table, values, key_name, key_value)
                .map(|()| Outcome::Updated),
            Operation::Select(query) => self.select(query).map(Outcome::Rows),
            Operation::ExecuteRaw { sql } => self.execute_raw(sql).map(|()| Outcome::Executed),
        }
    }
}

/// Construct the adapter for `config`, running the server bootstrap if needed.
pub fn open_store(config: &StoreConfig, registry: &LockRegistry) -> DbResult<Box<dyn Store>> {
    match config {
        StoreConfig::Embedded(embedded) => {
            Ok(Box::new(EmbeddedStore::open(embedded.clone(), registry)?))
        }
        StoreConfig::Server(server) => Ok(Box::new(ServerStore::connect(server.clone(), registry)?)),
    }
}
