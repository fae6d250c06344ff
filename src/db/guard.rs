//! Connection bracketing.
//!
//! A [`ConnectionGuard`] owns the single session of one operation. It is opened
//! right before the statement runs and closed right after, on success and on
//! error alike. Sessions are never shared, cached or reused.
//!
//! # Usage
//!
//! ```ignore
//! let mut guard = ConnectionGuard::open(&lock, DatabaseType::SQLite, connect).await?;
//! let outcome = run_statement(guard.connection()).await;
//! guard.close(outcome).await
//! ```
//!
//! If a guard is dropped without [`ConnectionGuard::close`] (a panic in the body),
//! the driver tears the session down on drop and the open-connection count is
//! still decremented.

use crate::db::lock_registry::DatabaseLock;
use crate::error::{DbError, DbResult};
use crate::models::DatabaseType;
use sqlx::Connection;
use std::future::Future;
use tracing::{debug, warn};

/// Counts one open connection against its database for as long as it lives.
#[derive(Debug)]
struct OpenSlot {
    lock: DatabaseLock,
}

impl OpenSlot {
    fn new(lock: &DatabaseLock) -> Self {
        lock.connection_opened();
        Self { lock: lock.clone() }
    }
}

impl Drop for OpenSlot {
    fn drop(&mut self) {
        self.lock.connection_closed();
    }
}

pub struct ConnectionGuard<C: Connection> {
    conn: C,
    db_type: DatabaseType,
    slot: OpenSlot,
}

impl<C: Connection> std::fmt::Debug for ConnectionGuard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("db_type", &self.db_type)
            .field("database", &self.slot.lock.name())
            .finish_non_exhaustive()
    }
}

impl<C: Connection> ConnectionGuard<C> {
    /// Open a session. Any failure is a [`DbError::Connection`]; nothing is retried.
    pub async fn open<F>(lock: &DatabaseLock, db_type: DatabaseType, connect: F) -> DbResult<Self>
    where
        F: Future<Output = Result<C, sqlx::Error>>,
    {
        let conn = connect
            .await
            .map_err(|e| DbError::connect_failed(db_type, &e))?;
        debug!(database = %lock.name(), db_type = %db_type, "Connection opened");
        Ok(Self {
            conn,
            db_type,
            slot: OpenSlot::new(lock),
        })
    }

    /// The session for the statement.
    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Close the session and hand back the operation's outcome.
    ///
    /// An error from the operation always wins over a close error, which is
    /// then only logged. A close error after a successful operation is returned.
    pub async fn close<T>(self, outcome: DbResult<T>) -> DbResult<T> {
        let ConnectionGuard {
            conn,
            db_type,
            slot,
        } = self;
        let closed = conn.close().await;
        let database = slot.lock.name().to_string();
        drop(slot);
        debug!(database = %database, db_type = %db_type, "Connection closed");

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(DbError::connection(
                format!("Failed to close connection: {}", e),
                "The statement completed; check the server or file state before retrying",
            )),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(
                    database = %database,
                    error = %close_err,
                    "Failed to close connection after statement error"
                );
                Err(e)
            }
        }
    }
}
