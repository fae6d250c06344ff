//! Error types for the data-access layer.
//!
//! Every operation surfaces exactly one `DbError` to its caller. Errors are never
//! retried or buffered; the per-database lock and the connection are already
//! released by the time a caller sees one.

use crate::models::DatabaseType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Backend unreachable, credentials rejected, or database file inaccessible.
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    /// The backend rejected the statement (syntax, unknown table, constraint).
    #[error("Statement failed: {message}")]
    Statement {
        message: String,
        /// e.g., "42S02" for an unknown table on MySQL
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a statement error with optional SQL state.
    pub fn statement(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Statement {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify a failure to open a session. Whatever the driver reports while
    /// connecting is a connection problem from the caller's point of view.
    pub fn connect_failed(db_type: DatabaseType, err: &sqlx::Error) -> Self {
        Self::connection(
            format!("Failed to connect: {}", err),
            connection_suggestion(db_type, err),
        )
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Statement { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Statement { .. })
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(db_type: DatabaseType, error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return format!(
            "Check that the {} server is running and accessible",
            db_type
        );
    }

    if error_str.contains("access denied") || error_str.contains("password") {
        return "Verify the user name and password".to_string();
    }

    if error_str.contains("unknown database") {
        return "Check that the database exists on the server".to_string();
    }

    match db_type {
        DatabaseType::MySQL => "Verify the host, port and credentials of the server".to_string(),
        DatabaseType::SQLite => {
            "Verify the database file's directory exists and is writable".to_string()
        }
    }
}

/// Convert sqlx errors raised after a session is open.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::statement(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced tables and columns",
                )
            }
            sqlx::Error::Configuration(msg) => DbError::config(msg.to_string()),
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
