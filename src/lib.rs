//! sqlhelper Library
//!
//! A minimal data-access layer with one CRUD contract (insert, update, select,
//! raw execute) over an embedded SQLite file and a networked MySQL server.
//! Operations against the same logical database are serialized, and every
//! operation runs on its own short-lived connection.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::{EmbeddedStore, LockRegistry, ServerStore, Store, open_store};
pub use error::{DbError, DbResult};
pub use models::{Record, Row, SelectQuery, Value};
