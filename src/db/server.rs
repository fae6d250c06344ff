//! Networked (server-based) backend on MySQL.
//!
//! Construction bootstraps the database: under the database's lock, an
//! administrative connection with no database selected issues
//! `CREATE DATABASE IF NOT EXISTS`. This runs once per handle, so repeated
//! construction against an existing database costs one round trip.

use crate::db::Store;
use crate::db::blocking::BlockingRuntime;
use crate::db::guard::ConnectionGuard;
use crate::db::lock_registry::{DatabaseLock, LockRegistry};
use crate::db::params::mysql_query;
use crate::db::statement::{PlaceholderStyle, Statement, StatementBuilder};
use crate::db::types::decode_rows;
use crate::error::{DbError, DbResult};
use crate::models::{DatabaseType, Record, Row, SelectQuery, ServerConfig, Value};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, Executor, MySqlConnection};
use tracing::{debug, info};

const PLACEHOLDERS: PlaceholderStyle = PlaceholderStyle::Anonymous;

/// Handle to one database on a MySQL server.
#[derive(Debug, Clone)]
pub struct ServerStore {
    config: ServerConfig,
    lock: DatabaseLock,
    runtime: BlockingRuntime,
}

impl ServerStore {
    /// Create a handle, making sure the database exists on the server.
    pub fn connect(config: ServerConfig, registry: &LockRegistry) -> DbResult<Self> {
        if config.database.is_empty() {
            return Err(DbError::config("MySQL database name cannot be empty"));
        }
        let lock = registry.lock_for(&config.lock_key());
        let runtime = BlockingRuntime::new()?;
        let store = Self {
            config,
            lock,
            runtime,
        };
        store.ensure_database()?;
        Ok(store)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Options for a session with no database selected.
    fn server_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .charset("utf8mb4")
    }

    fn database_options(&self) -> MySqlConnectOptions {
        self.server_options().database(&self.config.database)
    }

    fn ensure_database(&self) -> DbResult<()> {
        let sql = format!("CREATE DATABASE IF NOT EXISTS {}", self.config.database);
        let _held = self.lock.acquire();
        self.runtime.run(async {
            let options = self.server_options();
            let mut guard = ConnectionGuard::open(
                &self.lock,
                DatabaseType::MySQL,
                MySqlConnection::connect_with(&options),
            )
            .await?;
            let outcome = guard
                .connection()
                .execute(sql.as_str())
                .await
                .map(|_| ())
                .map_err(DbError::from);
            guard.close(outcome).await
        })?;
        info!(
            host = %self.config.host,
            database = %self.config.database,
            "Database ensured"
        );
        Ok(())
    }

    async fn open_connection(&self) -> DbResult<ConnectionGuard<MySqlConnection>> {
        let options = self.database_options();
        ConnectionGuard::open(
            &self.lock,
            DatabaseType::MySQL,
            MySqlConnection::connect_with(&options),
        )
        .await
    }
}

impl Store for ServerStore {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySQL
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
            // Unprepared: DDL such as CREATE PROCEDURE cannot be prepared
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

async fn execute_insert(conn: &mut MySqlConnection, statement: &Statement) -> DbResult<i64> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing insert");
    let result = mysql_query(statement).execute(&mut *conn).await?;
    let id = result.last_insert_id();
    i64::try_from(id)
        .map_err(|_| DbError::internal(format!("Inserted row id {} exceeds i64 range", id)))
}

async fn execute_statement(conn: &mut MySqlConnection, statement: &Statement) -> DbResult<()> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing statement");
    let result = mysql_query(statement).execute(&mut *conn).await?;
    debug!(rows_affected = result.rows_affected(), "Statement executed");
    Ok(())
}

async fn fetch_rows(conn: &mut MySqlConnection, statement: &Statement) -> DbResult<Vec<Row>> {
    debug!(sql = %statement.sql, params = statement.params.len(), "Executing select");
    let rows = mysql_query(statement).fetch_all(&mut *conn).await?;
    decode_rows(&rows)
}
