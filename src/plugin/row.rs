//! Typed cell values and output rows

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::column::ColumnType;
use crate::application::errors::TableError;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl ColumnValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ColumnValue::Null,
            Value::Bool(b) => ColumnValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ColumnValue::Int(i),
                None => n
                    .as_f64()
                    .map(ColumnValue::Double)
                    .unwrap_or_else(|| ColumnValue::Json(value.clone())),
            },
            Value::String(s) => ColumnValue::String(s.clone()),
            other => ColumnValue::Json(other.clone()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::Null => Value::Null,
            ColumnValue::String(s) => Value::String(s.clone()),
            ColumnValue::Int(i) => Value::from(*i),
            ColumnValue::Double(d) => Value::from(*d),
            ColumnValue::Bool(b) => Value::Bool(*b),
            ColumnValue::Timestamp(ts) => {
                Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            ColumnValue::Json(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Zero value of the underlying type (0, 0.0, "", false or null)
    pub fn is_zero(&self) -> bool {
        match self {
            ColumnValue::Null => true,
            ColumnValue::String(s) => s.is_empty(),
            ColumnValue::Int(i) => *i == 0,
            ColumnValue::Double(d) => *d == 0.0,
            ColumnValue::Bool(b) => !*b,
            ColumnValue::Timestamp(ts) => ts.timestamp_millis() == 0,
            ColumnValue::Json(v) => v.is_null(),
        }
    }

    /// Short description used in type mismatch errors
    pub fn kind(&self) -> String {
        match self {
            ColumnValue::Null => "null".to_string(),
            ColumnValue::String(s) => format!("string {:?}", s),
            ColumnValue::Int(i) => format!("int {}", i),
            ColumnValue::Double(d) => format!("double {}", d),
            ColumnValue::Bool(b) => format!("bool {}", b),
            ColumnValue::Timestamp(ts) => format!("timestamp {}", ts.to_rfc3339()),
            ColumnValue::Json(_) => "json".to_string(),
        }
    }

    /// Convert into a value of the given column type
    pub fn coerce(self, column: &str, column_type: ColumnType) -> Result<Self, TableError> {
        let mismatch = |value: &ColumnValue| TableError::TypeMismatch {
            column: column.to_string(),
            expected: column_type,
            found: value.kind(),
        };

        let coerced = match (column_type, self) {
            (_, ColumnValue::Null) => ColumnValue::Null,
            (ColumnType::Json, value) => ColumnValue::Json(value.to_json()),

            (ColumnType::String, ColumnValue::String(s)) => ColumnValue::String(s),
            (ColumnType::String, ColumnValue::Int(i)) => ColumnValue::String(i.to_string()),
            (ColumnType::String, ColumnValue::Double(d)) => ColumnValue::String(d.to_string()),
            (ColumnType::String, ColumnValue::Bool(b)) => ColumnValue::String(b.to_string()),

            (ColumnType::Int, ColumnValue::Int(i)) => ColumnValue::Int(i),
            (ColumnType::Int, ColumnValue::Double(d)) if d.fract() == 0.0 => {
                ColumnValue::Int(d as i64)
            }
            (ColumnType::Int, ColumnValue::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => ColumnValue::Int(i),
                Err(_) => return Err(mismatch(&ColumnValue::String(s))),
            },

            (ColumnType::Double, ColumnValue::Double(d)) => ColumnValue::Double(d),
            (ColumnType::Double, ColumnValue::Int(i)) => ColumnValue::Double(i as f64),
            (ColumnType::Double, ColumnValue::String(s)) => match s.trim().parse::<f64>() {
                Ok(d) => ColumnValue::Double(d),
                Err(_) => return Err(mismatch(&ColumnValue::String(s))),
            },

            (ColumnType::Bool, ColumnValue::Bool(b)) => ColumnValue::Bool(b),
            (ColumnType::Bool, ColumnValue::String(s)) => match s.trim().parse::<bool>() {
                Ok(b) => ColumnValue::Bool(b),
                Err(_) => return Err(mismatch(&ColumnValue::String(s))),
            },

            (ColumnType::Timestamp, ColumnValue::Timestamp(ts)) => ColumnValue::Timestamp(ts),
            (ColumnType::Timestamp, ColumnValue::String(s)) => {
                match DateTime::parse_from_rfc3339(s.trim()) {
                    Ok(dt) => ColumnValue::Timestamp(dt.with_timezone(&Utc)),
                    Err(_) => return Err(mismatch(&ColumnValue::String(s))),
                }
            }

            (_, value) => return Err(mismatch(&value)),
        };

        Ok(coerced)
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// One output row, cells in column declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, ColumnValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: ColumnValue) {
        self.cells.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.cells
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
