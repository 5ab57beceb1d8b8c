//! Catalog field descriptors and the numeric-type heuristic
//!
//! Fields arrive from the schema browser as `(name, type, table)` triples
//! where `type` is the backend's type name string. Whether a field counts as
//! numeric decides which side of the query it lands on when assigned to a
//! shelf, so the heuristic lives behind a single function that every call
//! site goes through.

use serde::{Deserialize, Serialize};

use crate::spec::Aggregate;

/// A column as described by the backend catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,
    /// Backend type name (e.g. "varchar", "decimal(10,2)", "timestamp")
    #[serde(rename = "type")]
    pub dtype: String,
    /// Table the column belongs to
    pub table: String,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        dtype: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype: dtype.into(),
            table: table.into(),
        }
    }

    /// Whether this field is treated as numeric when assigned to a shelf
    pub fn is_numeric(&self) -> bool {
        is_numeric_type(&self.dtype)
    }
}

/// Substrings that mark a type name as numeric
const NUMERIC_MARKERS: [&str; 6] = ["int", "decimal", "float", "numeric", "number", "money"];

/// Classify a backend type name as numeric or categorical/temporal
///
/// Substring matching on the lowercased type name. Crude, but it is the
/// contract other components rely on; swap the implementation here, not at
/// call sites.
pub fn is_numeric_type(type_name: &str) -> bool {
    let lowered = type_name.to_ascii_lowercase();
    NUMERIC_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Default aggregate for a field dropped on a measure shelf
///
/// Numeric fields sum; anything else counts.
pub fn default_aggregate(type_name: &str) -> Aggregate {
    if is_numeric_type(type_name) {
        Aggregate::Sum
    } else {
        Aggregate::Count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_type_names() {
        for name in [
            "int",
            "INTEGER",
            "bigint",
            "smallint",
            "decimal(10,2)",
            "DOUBLE FLOAT",
            "float8",
            "numeric",
            "number",
            "money",
        ] {
            assert!(is_numeric_type(name), "{} should be numeric", name);
        }
    }

    #[test]
    fn test_categorical_and_temporal_type_names() {
        for name in ["varchar", "text", "char(32)", "timestamp", "date", "boolean", "uuid"] {
            assert!(!is_numeric_type(name), "{} should not be numeric", name);
        }
    }

    #[test]
    fn test_default_aggregate() {
        assert_eq!(default_aggregate("decimal(10,2)"), Aggregate::Sum);
        assert_eq!(default_aggregate("varchar"), Aggregate::Count);
    }

    #[test]
    fn test_field_serde_uses_type_key() {
        let field = Field::new("amount", "decimal", "invoices");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "decimal");
        let back: Field = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }
}
