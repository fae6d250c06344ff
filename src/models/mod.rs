//! Data models for the data-access layer.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod query;
pub mod request;

// Re-export commonly used types
pub use connection::{
    DEFAULT_MYSQL_PORT, DatabaseType, EmbeddedConfig, ServerConfig, StoreConfig,
};
pub use query::{Record, Row, Value};
pub use request::{Operation, Outcome, SelectQuery};
