//! Row decoding into [`Value`]s.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies a type name into a logical category
//! 2. Database-specific decoders handle the actual value extraction
//!
//! SQLite is classified by each value's runtime storage class, since a
//! column's declared type does not constrain what it holds. MySQL is classified
//! by the column type reported in the result set.
//!
//! Both backends return the same shapes: booleans come back as `Int` 0/1 and
//! temporal values as `Text` in ISO form (`2004-05-15 15:00:00`).

use crate::error::{DbError, DbResult};
use crate::models::{Row, Value};
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::types::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{Decode, Row as _, Type, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Null,
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Text,
    Binary,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower == "null" {
        return TypeCategory::Null;
    }

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    // Boolean - before integers, MySQL reports TINYINT(1) as BOOLEAN
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if matches!(lower.as_str(), "datetime" | "timestamp" | "date" | "time") {
        return TypeCategory::Temporal;
    }

    if lower.contains("int") {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    // Everything else decodes as text (varchar, text, char, json, enum, ...)
    TypeCategory::Text
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Trait for converting database rows into ordered values.
pub trait RowToValues {
    fn to_values(&self) -> DbResult<Row>;
}

impl RowToValues for SqliteRow {
    fn to_values(&self) -> DbResult<Row> {
        (0..self.len())
            .map(|idx| sqlite::decode_column(self, idx))
            .collect()
    }
}

impl RowToValues for MySqlRow {
    fn to_values(&self) -> DbResult<Row> {
        (0..self.len())
            .map(|idx| mysql::decode_column(self, idx))
            .collect()
    }
}

/// Decode every row of a result set.
pub fn decode_rows<R: RowToValues>(rows: &[R]) -> DbResult<Vec<Row>> {
    rows.iter().map(RowToValues::to_values).collect()
}

fn undecodable(idx: usize, type_name: &str) -> DbError {
    DbError::internal(format!(
        "Failed to decode column {} of type {}",
        idx, type_name
    ))
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod sqlite {
    use super::*;
    use sqlx::Row as _;

    pub fn decode_column(row: &SqliteRow, idx: usize) -> DbResult<Value> {
        let type_name = {
            let raw = row.try_get_raw(idx)?;
            if raw.is_null() {
                return Ok(Value::Null);
            }
            raw.type_info().name().to_string()
        };

        match categorize_type(&type_name) {
            TypeCategory::Null => Ok(Value::Null),
            TypeCategory::Integer | TypeCategory::Boolean => {
                Ok(Value::Int(row.try_get::<i64, _>(idx)?))
            }
            TypeCategory::Float | TypeCategory::Decimal => {
                Ok(Value::Float(row.try_get::<f64, _>(idx)?))
            }
            TypeCategory::Binary => Ok(Value::Bytes(row.try_get::<Vec<u8>, _>(idx)?)),
            TypeCategory::Temporal | TypeCategory::Text => row
                .try_get::<String, _>(idx)
                .map(Value::Text)
                .map_err(|_| undecodable(idx, &type_name)),
        }
    }
}

mod mysql {
    use super::*;
    use sqlx::Row as _;

    pub fn decode_column(row: &MySqlRow, idx: usize) -> DbResult<Value> {
        let type_name = {
            let raw = row.try_get_raw(idx)?;
            if raw.is_null() {
                return Ok(Value::Null);
            }
            raw.type_info().name().to_string()
        };

        match categorize_type(&type_name) {
            TypeCategory::Null => Ok(Value::Null),
            // TINYINT(1) reads back as 0/1, as SQLite does
            TypeCategory::Integer | TypeCategory::Boolean => decode_integer(row, idx, &type_name),
            TypeCategory::Temporal => decode_temporal(row, idx, &type_name),
            TypeCategory::Float => decode_float(row, idx, &type_name),
            TypeCategory::Decimal => Ok(Value::Text(row.try_get::<RawDecimal, _>(idx)?.0)),
            TypeCategory::Binary => Ok(Value::Bytes(row.try_get::<Vec<u8>, _>(idx)?)),
            TypeCategory::Text => decode_text(row, idx, &type_name),
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<Value> {
        if let Ok(v) = row.try_get::<i64, _>(idx) {
            return Ok(Value::Int(v));
        }
        // Unsigned columns
        match row.try_get::<u64, _>(idx) {
            Ok(v) => Ok(i64::try_from(v)
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Text(v.to_string()))),
            Err(_) => row
                .try_get::<bool, _>(idx)
                .map(|v| Value::Int(i64::from(v)))
                .map_err(|_| undecodable(idx, type_name)),
        }
    }

    fn decode_temporal(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<Value> {
        let text = match type_name.to_lowercase().as_str() {
            "date" => row
                .try_get::<NaiveDate, _>(idx)
                .map(|v| v.format("%Y-%m-%d").to_string()),
            // TIME values outside 00:00:00-23:59:59 (durations) do not decode
            "time" => row
                .try_get::<NaiveTime, _>(idx)
                .map(|v| v.format("%H:%M:%S%.f").to_string()),
            _ => row
                .try_get::<NaiveDateTime, _>(idx)
                .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        };
        text.map(Value::Text)
            .map_err(|_| undecodable(idx, type_name))
    }

    fn decode_float(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<Value> {
        if let Ok(v) = row.try_get::<f64, _>(idx) {
            return Ok(Value::Float(v));
        }
        row.try_get::<f32, _>(idx)
            .map(|v| Value::Float(f64::from(v)))
            .map_err(|_| undecodable(idx, type_name))
    }

    fn decode_text(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<Value> {
        if let Ok(v) = row.try_get::<String, _>(idx) {
            return Ok(Value::Text(v));
        }
        // Types without a text decoding, e.g. BIT
        row.try_get_unchecked::<Vec<u8>, _>(idx)
            .map(Value::Bytes)
            .map_err(|_| undecodable(idx, type_name))
    }
}
