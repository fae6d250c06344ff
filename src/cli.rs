//! Command-line operations.
//!
//! Each subcommand maps onto exactly one store operation.

use crate::models::{Operation, Outcome, Record, SelectQuery, Value};
use clap::Subcommand;
use std::io::Write;

/// Parse a `column=value` assignment.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{s}'"));
    }
    Ok((column.to_string(), Value::parse_literal(value)))
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Execute a trusted SQL statement verbatim (e.g. CREATE TABLE)
    Exec {
        /// Statement text
        sql: String,
    },

    /// Insert one row and print its row id
    Insert {
        /// Target table
        #[arg(long)]
        table: String,

        /// Column value, repeatable: --set Team=Arsenal --set Pos=1
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true, value_parser = parse_assignment)]
        values: Vec<(String, Value)>,
    },

    /// Update the rows matching one column
    Update {
        /// Target table
        #[arg(long)]
        table: String,

        /// Column value, repeatable
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true, value_parser = parse_assignment)]
        values: Vec<(String, Value)>,

        /// Match condition
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        key: (String, Value),
    },

    /// Select rows and print one JSON array per row
    Select {
        /// Source table
        #[arg(long)]
        table: String,

        /// Column to return, repeatable (default: all columns)
        #[arg(long = "column", value_name = "COLUMN")]
        columns: Vec<String>,

        /// Match condition
        #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        key: Option<(String, Value)>,

        /// Column to order by (ignored without --direction)
        #[arg(long)]
        order_by: Option<String>,

        /// Order direction, ASC or DESC (ignored without --order-by)
        #[arg(long)]
        direction: Option<String>,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<u64>,
    },
}

impl Command {
    pub fn into_operation(self) -> Operation {
        match self {
            Command::Exec { sql } => Operation::ExecuteRaw { sql },
            Command::Insert { table, values } => Operation::Insert {
                table,
                values: values.into_iter().collect::<Record>(),
            },
            Command::Update { table, values, key } => Operation::Update {
                table,
                values: values.into_iter().collect::<Record>(),
                key_name: key.0,
                key_value: key.1,
            },
            Command::Select {
                table,
                columns,
                key,
                order_by,
                direction,
                limit,
            } => {
                let (key_name, key_value) = match key {
                    Some((name, value)) => (Some(name), Some(value)),
                    None => (None, None),
                };
                Operation::Select(SelectQuery {
                    table,
                    columns,
                    key_name,
                    key_value,
                    order_column: order_by,
                    direction,
                    limit,
                })
            }
        }
    }
}

/// Write an outcome for a human or a pipe.
pub fn render_outcome(outcome: &Outcome, out: &mut impl Write) -> std::io::Result<()> {
    match outcome {
        Outcome::Inserted(id) => writeln!(out, "{}", id),
        Outcome::Rows(rows) => {
            for row in rows {
                serde_json::to_writer(&mut *out, row)?;
                writeln!(out)?;
            }
            Ok(())
        }
        Outcome::Updated | Outcome::Executed => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::Parser;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["sqlhelper", "-d", "sqlite:example.db"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("Team=Leeds United").unwrap(),
            ("Team".to_string(), Value::Text("Leeds United".to_string()))
        );
        assert_eq!(
            parse_assignment("GD=-39").unwrap(),
            ("GD".to_string(), Value::Int(-39))
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), Value::Text("a=b".to_string()))
        );
        assert!(parse_assignment("no-equals").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_insert_command_keeps_column_order() {
        let op = command(&[
            "insert", "--table", "epl", "--set", "Pos=1", "--set", "Team=Arsenal",
        ])
        .into_operation();
        match op {
            Operation::Insert { table, values } => {
                assert_eq!(table, "epl");
                assert_eq!(values.columns().collect::<Vec<_>>(), vec!["Pos", "Team"]);
            }
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn test_update_command() {
        let op = command(&[
            "update", "--table", "epl", "--set", "Pos=20", "--where", "Team=Tottenham",
        ])
        .into_operation();
        assert_eq!(
            op,
            Operation::Update {
                table: "epl".to_string(),
                values: Record::new().with("Pos", 20),
                key_name: "Team".to_string(),
                key_value: Value::from("Tottenham"),
            }
        );
    }

    #[test]
    fn test_select_command() {
        let op = command(&[
            "select", "--table", "epl", "--column", "Team", "--order-by", "GA",
            "--direction", "ASC", "--limit", "3",
        ])
        .into_operation();
        assert_eq!(
            op,
            Operation::Select(
                SelectQuery::new("epl")
                    .columns(["Team"])
                    .order_by("GA", "ASC")
                    .limit(3)
            )
        );
    }

    #[test]
    fn test_select_order_without_direction_is_accepted() {
        let op = command(&["select", "--table", "epl", "--order-by", "GA"]).into_operation();
        match op {
            Operation::Select(query) => {
                assert_eq!(query.order_column.as_deref(), Some("GA"));
                assert!(query.effective_order().is_none());
            }
            other => panic!("expected select, got {:?}", other),
        }
    }

    #[test]
    fn test_render_outcome() {
        let mut out = Vec::new();
        render_outcome(&Outcome::Inserted(7), &mut out).unwrap();
        render_outcome(
            &Outcome::Rows(vec![
                vec![Value::from("Arsenal"), Value::from(26)],
                vec![Value::from("Chelsea"), Value::from(30)],
            ]),
            &mut out,
        )
        .unwrap();
        render_outcome(&Outcome::Executed, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "7\n[\"Arsenal\",26]\n[\"Chelsea\",30]\n"
        );
    }
}
