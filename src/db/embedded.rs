//! Embedded (file-based) backend on SQLite.

use crate::db::Store;
use crate::db::blocking::BlockingRuntime;
use crate::db::guard::ConnectionGuard;
use crate::db::lock_registry::{DatabaseLock, LockRegistry};
use crate::db::params::sqlite_query;
use crate::db::statement::{PlaceholderStyle, Statement, StatementBuilder};
use crate::db::types::decode_rows;
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseType, EmbeddedConfig, Record, Row, SelectQuery, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Executor, SqliteConnection};
use tracing::debug;

const PLACEHOLDERS: PlaceholderStyle = PlaceholderStyle::Numbered;

/// Handle to one SQLite database file.
///
/// Holds connection parameters only. Every operation opens its own connection
/// under the database's lock and closes it before returning.
#[derive(Debug, Clone)]
pub struct EmbeddedStore {
    config: EmbeddedConfig,
    lock: DatabaseLock,
    runtime: BlockingRuntime,
}

impl EmbeddedStore {
    /// Create a handle. The file itself is created by the first operation.
    pub fn open(config: EmbeddedConfig, registry: &LockRegistry) -> DbResult<Self> {
        let lock = registry.lock_for(&config.lock_key());
        let runtime = BlockingRuntime::new()?;
        debug!(database = %lock.name(), "Embedded store ready");
        Ok(Self {
            config,
            lock,
            runtime,
        })
    }

    pub fn config(&self) -> &EmbeddedConfig {
        &self.config
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(self.config.path())
            .create_if_missing(true)
    }

    async fn open_connection(&self) -> DbResult<ConnectionGuard<SqliteConnection>> {
        let options = self.connect_options();
        ConnectionGuard::open(
            &self.lock,
            DatabaseType::SQLite,
            SqliteConnection::connect_with(&options),
        )
        .await
    }
}

impl Store for EmbeddedStore {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn lock(&self) -> &DatabaseLock {
        &self.lock
    }

    fn insert(&self, table: &str, values: &Record) -> DbResult<i64> {
        let statement = StatementBuilder::insert(PLACEHOLDERS, table, values);
        let _held = self.lock.acquire();
        self.runtime.run(async {
            let mut guard = self.open_connection().await?;
            let outcome = execute_insert(guard.connection(), &statement).await;
            guard.close(outcome).await
        })
    }

    fn update(&self, table: &str, values: &Record, key_name: &str, key_value: &Value) -> DbResult<()> {
        let statement = StatementBuilder::update(PLACEHOLDERS, table, values, key_name, key_value);
        let _held = self.lock.acquire();
        self.runtime.run(async {
            let mut guard = self.open_connection().await?;
            let outcome = execute_statement(guard.connection(), &statement).await;
            guard.close(outcome).await
        })
    }

    fn select(&self, query: &SelectQuery) -> DbResult<Vec<Row>> {
        let statement = StatementBuilder::select(PLACEHOLDERS, query);
        let _held = self.lock.acquire();
        self.runtime.run(async {
            let mut guard = self.open_connection().await?;
            let outcome = fetch_rows(guard.connection(), &statement).await;
            guard.close(outcome).await
        })
    }

    fn execute_raw(&self, sql: &str) -> DbResult<()> {
        let _held = self.lock.acquire();
        self.runtime.run(async {
            let mut guard = self.open_connection().await?;
            debug!(sql = %sql, "Executing raw statement");
            let outcome = guard
                .connection()
                .execute(sql)
                .await
                .map(|_| ())
                .map_err(DbError::from);
            guard.close(outcome).await
        })
    }
}

async fn execute_insert(conn: &mut SqliteConnection, statement: &Statement) -> DbResult<i64> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing insert");
    let result = sqlite_query(statement).execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

async fn execute_statement(conn: &mut SqliteConnection, statement: &Statement) -> DbResult<()> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");
    let result = sqlite_query(statement).execute(&mut *conn).await?;
    debug!(rows_affected = result.rows_affected(), "Statement executed");
    Ok(())
}

async fn fetch_rows(conn: &mut SqliteConnection, statement: &Statement) -> DbResult<Vec<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing select");
    let rows = sqlite_query(statement).fetch_all(&mut *conn).await?;
    decode_rows(&rows)
}
