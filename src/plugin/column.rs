//! Column definitions

use serde::Serialize;
use std::fmt;

use super::transform::Transform;

/// Value type of a column as reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Double,
    Bool,
    Timestamp,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Double => "double",
            ColumnType::Bool => "bool",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Json => "json",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single output column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub description: String,
    pub column_type: ColumnType,
    transform: Option<Transform>,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            column_type,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Declared transform, or a lookup of the field named like the column
    pub fn transform(&self) -> Transform {
        self.transform
            .clone()
            .unwrap_or_else(|| Transform::from_field(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::TransformSource;

    #[test]
    fn test_default_transform_reads_field_named_like_column() {
        let column = Column::new("total_vulnerabilities", ColumnType::Int, "Total.");
        assert_eq!(
            column.transform().source(),
            &TransformSource::Field("total_vulnerabilities".to_string())
        );
        assert!(column.transform().steps().is_empty());
    }

    #[test]
    fn test_explicit_transform_wins() {
        let column = Column::new("asset_type", ColumnType::String, "Asset type.")
            .with_transform(Transform::from_qual("asset_type"));
        assert_eq!(
            column.transform().source(),
            &TransformSource::Qual("asset_type".to_string())
        );
    }

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::Timestamp.to_string(), "timestamp");
        assert_eq!(
            serde_json::to_string(&ColumnType::Int).unwrap(),
            "\"int\""
        );
    }
}
