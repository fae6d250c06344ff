//! Parameterized statement construction.
//!
//! Identifiers (table and column names) are written into the SQL text as given;
//! callers must only pass names from a fixed, trusted vocabulary. Values are
//! never written into the text. The only way to add a value is [`StatementBuilder::bind`],
//! which appends a placeholder token and records the value in the parameter list.
//!
//! One algorithm serves every backend; they differ only in [`PlaceholderStyle`].

use crate::models::{Record, SelectQuery, Value};
use tracing::debug;

/// Backend-specific token marking a bound-parameter position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` for every parameter (MySQL).
    Anonymous,
    /// `?1`, `?2`, ... (SQLite).
    Numbered,
}

impl PlaceholderStyle {
    /// Token for the parameter at 1-based `position`.
    fn token(self, position: usize) -> String {
        match self {
            Self::Anonymous => "?".to_string(),
            Self::Numbered => format!("?{}", position),
        }
    }
}

/// SQL text plus its ordered parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug)]
pub struct StatementBuilder {
    style: PlaceholderStyle,
    sql: String,
    params: Vec<Value>,
}

impl StatementBuilder {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Append keywords or trusted identifiers.
    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append a placeholder and bind `value` to it.
    fn bind(&mut self, value: Value) -> &mut Self {
        self.params.push(value);
        let token = self.style.token(self.params.len());
        self.sql.push_str(&token);
        self
    }

    fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<placeholders>)`
    ///
    /// An empty record yields a statement with no columns, which the backend
    /// rejects or interprets on its own terms.
    pub fn insert(style: PlaceholderStyle, table: &str, values: &Record) -> Statement {
        let mut builder = Self::new(style);
        let columns = values.columns().collect::<Vec<_>>().join(", ");
        builder
            .push("INSERT INTO ")
            .push(table)
            .push(" (")
            .push(&columns)
            .push(") VALUES (");
        for (idx, value) in values.values().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.bind(value.clone());
        }
        builder.push(")");
        builder.build()
    }

    /// `UPDATE <table> SET <col> = <ph>, ... WHERE <key_name> = <ph>`
    ///
    /// Parameters are the record's values in order, then `key_value`.
    pub fn update(
        style: PlaceholderStyle,
        table: &str,
        values: &Record,
        key_name: &str,
        key_value: &Value,
    ) -> Statement {
        let mut builder = Self::new(style);
        builder.push("UPDATE ").push(table).push(" SET ");
        for (idx, (column, value)) in values.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.push(column).push(" = ").bind(value.clone());
        }
        builder
            .push(" WHERE ")
            .push(key_name)
            .push(" = ")
            .bind(key_value.clone());
        builder.build()
    }

    /// `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...] [LIMIT n]`
    ///
    /// The limit is written as a literal integer. Half-specified filters and
    /// orderings are dropped.
    pub fn select(style: PlaceholderStyle, query: &SelectQuery) -> Statement {
        let mut builder = Self::new(style);
        let columns = if query.columns.is_empty() {
            "*".to_string()
        } else {
            query.columns.join(", ")
        };
        builder
            .push("SELECT ")
            .push(&columns)
            .push(" FROM ")
            .push(&query.table);

        match query.effective_filter() {
            Some((key_name, key_value)) => {
                builder
                    .push(" WHERE ")
                    .push(key_name)
                    .push(" = ")
                    .bind(key_value.clone());
            }
            None if query.key_name.is_some() || query.key_value.is_some() => {
                debug!(table = %query.table, "Incomplete filter ignored");
            }
            None => {}
        }

        match query.effective_order() {
            Some((column, direction)) => {
                builder
                    .push(" ORDER BY ")
                    .push(column)
                    .push(" ")
                    .push(direction);
            }
            None if query.order_column.is_some() || query.direction.is_some() => {
                debug!(table = %query.table, "Incomplete ordering ignored");
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            builder.push(&format!(" LIMIT {}", limit));
        }

        builder.build()
    }
}
