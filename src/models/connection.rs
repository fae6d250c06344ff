//! Connection-related data models.
//!
//! Adapters keep these parameters and open a fresh session from them for every
//! operation. No live connection is stored anywhere.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default MySQL server port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// Includes MariaDB
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }

    /// Get the default port for this database type.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::MySQL => Some(DEFAULT_MYSQL_PORT),
            Self::SQLite => None,
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Parameters of the embedded (file-based) backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedConfig {
    /// Database file, created on first connection if missing.
    pub path: PathBuf,
}

impl EmbeddedConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the logical database in the lock registry.
    pub fn lock_key(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Parameters of the networked (server-based) backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: String,
}

impl ServerConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_MYSQL_PORT,
            database: database.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Name of the logical database in the lock registry. Credentials are not
    /// part of the key.
    pub fn lock_key(&self) -> String {
        format!("mysql://{}:{}/{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

/// Either backend's construction-time configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Embedded(EmbeddedConfig),
    Server(ServerConfig),
}

impl StoreConfig {
    pub fn db_type(&self) -> DatabaseType {
        match self {
            Self::Embedded(_) => DatabaseType::SQLite,
            Self::Server(_) => DatabaseType::MySQL,
        }
    }

    pub fn lock_key(&self) -> String {
        match self {
            Self::Embedded(config) => config.lock_key(),
            Self::Server(config) => config.lock_key(),
        }
    }
}
