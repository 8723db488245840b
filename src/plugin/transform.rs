//! Declarative column transforms
//!
//! A transform reads a raw value from a source (a qual or a field path in the
//! hydrated item), then runs it through zero or more steps in order.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

use super::query_data::QueryData;
use super::row::ColumnValue;
use crate::application::errors::TableError;
use crate::plugin::ColumnType;

/// Where a column value comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformSource {
    /// Value of the equality qual on the named column
    Qual(String),
    /// Dot-separated path into the hydrated item
    Field(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStep {
    NullIfZeroValue,
    UnixMsToTimestamp,
}

impl TransformStep {
    fn apply(self, column: &str, value: ColumnValue) -> Result<ColumnValue, TableError> {
        match self {
            TransformStep::NullIfZeroValue => {
                if value.is_zero() {
                    Ok(ColumnValue::Null)
                } else {
                    Ok(value)
                }
            }
            TransformStep::UnixMsToTimestamp => unix_ms_to_timestamp(column, value),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TransformStep::NullIfZeroValue => "null_if_zero_value",
            TransformStep::UnixMsToTimestamp => "unix_ms_to_timestamp",
        }
    }
}

fn unix_ms_to_timestamp(column: &str, value: ColumnValue) -> Result<ColumnValue, TableError> {
    let millis = match &value {
        ColumnValue::Null => return Ok(ColumnValue::Null),
        ColumnValue::Timestamp(_) => return Ok(value),
        ColumnValue::Int(ms) => Some(*ms),
        ColumnValue::Double(ms) if ms.fract() == 0.0 => Some(*ms as i64),
        ColumnValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(ColumnValue::Timestamp)
        .ok_or_else(|| TableError::TypeMismatch {
            column: column.to_string(),
            expected: ColumnType::Timestamp,
            found: value.kind(),
        })
}

/// A source plus an ordered chain of steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    source: TransformSource,
    steps: Vec<TransformStep>,
}

impl Transform {
    pub fn from_qual(column: impl Into<String>) -> Self {
        Self {
            source: TransformSource::Qual(column.into()),
            steps: Vec::new(),
        }
    }

    pub fn from_field(path: impl Into<String>) -> Self {
        Self {
            source: TransformSource::Field(path.into()),
            steps: Vec::new(),
        }
    }

    /// Append a step to the chain
    pub fn transform(mut self, step: TransformStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn null_if_zero_value(self) -> Self {
        self.transform(TransformStep::NullIfZeroValue)
    }

    pub fn unix_ms_to_timestamp(self) -> Self {
        self.transform(TransformStep::UnixMsToTimestamp)
    }

    pub fn source(&self) -> &TransformSource {
        &self.source
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Resolve the value for `column` from a hydrated item
    pub fn apply(
        &self,
        column: &str,
        item: &Value,
        query_data: &QueryData,
    ) -> Result<ColumnValue, TableError> {
        let mut value = match &self.source {
            TransformSource::Qual(name) => query_data
                .qual(name)
                .map(|v| ColumnValue::String(v.to_string()))
                .unwrap_or(ColumnValue::Null),
            TransformSource::Field(path) => lookup_path(item, path)
                .map(ColumnValue::from_json)
                .unwrap_or(ColumnValue::Null),
        };

        for step in &self.steps {
            value = step.apply(column, value)?;
        }

        Ok(value)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            TransformSource::Qual(name) => write!(f, "from_qual({})", name)?,
            TransformSource::Field(path) => write!(f, "from_field({})", path)?,
        }
        for step in &self.steps {
            write!(f, " | {}", step.name())?;
        }
        Ok(())
    }
}

/// Walk a dot-separated path through nested objects
fn lookup_path<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(item, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn query_data(quals: &[(&str, &str)]) -> QueryData {
        let quals: HashMap<String, String> = quals
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryData::new("test_table", quals).0
    }

    #[test]
    fn test_from_field_nested_path() {
        let item = json!({"urgent": {"vulnerability_count": 7, "asset_count": 3}});
        let d = query_data(&[]);

        let value = Transform::from_field("urgent.vulnerability_count")
            .apply("c", &item, &d)
            .unwrap();
        assert_eq!(value, ColumnValue::Int(7));
    }

    #[test]
    fn test_from_field_missing_path_is_null() {
        let item = json!({"urgent": {"vulnerability_count": 7}});
        let d = query_data(&[]);

        let value = Transform::from_field("patchable.asset_count")
            .apply("c", &item, &d)
            .unwrap();
        assert!(value.is_null());

        let value = Transform::from_field("urgent.vulnerability_count.deeper")
            .apply("c", &item, &d)
            .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_from_qual_reads_query_qualifier() {
        let d = query_data(&[("asset_type", "host")]);
        let value = Transform::from_qual("asset_type")
            .apply("asset_type", &json!({}), &d)
            .unwrap();
        assert_eq!(value, ColumnValue::String("host".to_string()));

        let missing = Transform::from_qual("life_cycle")
            .apply("life_cycle", &json!({}), &d)
            .unwrap();
        assert!(missing.is_null());
    }

    #[test]
    fn test_null_if_zero_then_timestamp() {
        let transform = Transform::from_field("last_updated_date_time")
            .null_if_zero_value()
            .unix_ms_to_timestamp();
        let d = query_data(&[]);

        let zero = transform
            .apply("c", &json!({"last_updated_date_time": 0}), &d)
            .unwrap();
        assert!(zero.is_null());

        let set = transform
            .apply("c", &json!({"last_updated_date_time": 1_700_000_000_000i64}), &d)
            .unwrap();
        assert_eq!(
            set,
            ColumnValue::Timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
        );
    }

    #[test]
    fn test_unix_ms_to_timestamp_rejects_non_numeric() {
        let d = query_data(&[]);
        let err = Transform::from_field("t")
            .unix_ms_to_timestamp()
            .apply("t", &json!({"t": "yesterday"}), &d)
            .unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { column, .. } if column == "t"));
    }

    #[test]
    fn test_display_describes_chain() {
        let transform = Transform::from_field("last_updated_date_time")
            .null_if_zero_value()
            .unix_ms_to_timestamp();
        assert_eq!(
            transform.to_string(),
            "from_field(last_updated_date_time) | null_if_zero_value | unix_ms_to_timestamp"
        );
    }
}
