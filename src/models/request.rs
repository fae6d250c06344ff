//! Operation requests and their outcomes.

use super::query::{Record, Row, Value};

/// Description of a SELECT.
///
/// Optional parts are independent on purpose: a filter needs both a key name
/// and a non-null key value, an ordering needs both a column and a direction.
/// A half-specified part is treated as not requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    /// Empty means every column.
    pub columns: Vec<String>,
    pub key_name: Option<String>,
    pub key_value: Option<Value>,
    pub order_column: Option<String>,
    /// Passed through verbatim, normally `ASC` or `DESC`.
    pub direction: Option<String>,
    pub limit: Option<u64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to rows where `key_name = key_value`.
    pub fn filter(mut self, key_name: impl Into<String>, key_value: impl Into<Value>) -> Self {
        self.key_name = Some(key_name.into());
        self.key_value = Some(key_value.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_column = Some(column.into());
        self.direction = Some(direction.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The filter actually applied, if both halves are present.
    pub fn effective_filter(&self) -> Option<(&str, &Value)> {
        match (&self.key_name, &self.key_value) {
            (Some(name), Some(value)) if !value.is_null() => Some((name, value)),
            _ => None,
        }
    }

    /// The ordering actually applied, if both halves are present.
    pub fn effective_order(&self) -> Option<(&str, &str)> {
        match (&self.order_column, &self.direction) {
            (Some(column), Some(direction)) => Some((column, direction)),
            _ => None,
        }
    }
}

/// One unit of work against a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert {
        table: String,
        values: Record,
    },
    Update {
        table: String,
        values: Record,
        key_name: String,
        key_value: Value,
    },
    Select(SelectQuery),
    /// Trusted statement text executed verbatim, typically DDL.
    ExecuteRaw { sql: String },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Select(_) => "select",
            Self::ExecuteRaw { .. } => "execute",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Row identifier assigned by the backend.
    Inserted(i64),
    Updated,
    Rows(Vec<Row>),
    Executed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_query_builder() {
        let query = SelectQuery::new("epl_03_04")
            .columns(["Team"])
            .filter("Pos", 1)
            .order_by("GA", "ASC")
            .limit(3);
        assert_eq!(query.columns, vec!["Team".to_string()]);
        assert_eq!(query.effective_filter(), Some(("Pos", &Value::Int(1))));
        assert_eq!(query.effective_order(), Some(("GA", "ASC")));
        assert_eq!(query.limit, Some(3));
    }

    #[test]
    fn test_half_specified_parts_are_ignored() {
        let mut query = SelectQuery::new("t");
        query.key_name = Some("Pos".to_string());
        query.order_column = Some("GA".to_string());
        assert!(query.effective_filter().is_none());
        assert!(query.effective_order().is_none());

        query.key_name = None;
        query.key_value = Some(Value::Int(1));
        query.direction = Some("DESC".to_string());
        query.order_column = None;
        assert!(query.effective_filter().is_none());
        assert!(query.effective_order().is_none());
    }

    #[test]
    fn test_null_key_value_means_no_filter() {
        let query = SelectQuery::new("t").filter("Pos", Value::Null);
        assert!(query.effective_filter().is_none());
    }

    #[test]
    fn test_operation_kind() {
        let op = Operation::ExecuteRaw {
            sql: "DROP TABLE t".to_string(),
        };
        assert_eq!(op.kind(), "execute");
        assert_eq!(Operation::Select(SelectQuery::new("t")).kind(), "select");
    }
}
