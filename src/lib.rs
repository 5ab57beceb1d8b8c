/*!
# chartspec - Declarative Chart Specifications

A chart specification describes what to query and how to map the results onto
a visual encoding. This crate provides the specification model, the shelf
mutators that keep it consistent as fields are assigned and removed, the
chart-type transition rules, and the row transformer that reshapes query
results into renderer-ready data.

## Example

```rust
use chartspec::{ChartSpec, ChartType, Field, Slot, transform_rows};

// Drop fields onto shelves; the query stays consistent with the encodings
let spec = ChartSpec::new(ChartType::Bar)
    .assign(&Field::new("month", "varchar", "sales"), Slot::X)
    .assign(&Field::new("revenue", "decimal(12,2)", "sales"), Slot::Y);
assert_eq!(spec.query.source, "sales");

// Reshape fetched rows for the rendering layer
let rows = serde_json::from_value(serde_json::json!([
    {"month": "Jan", "revenue": 10},
    {"month": "Feb", "revenue": 7},
])).unwrap();
let data = transform_rows(&spec, rows);
assert_eq!(data.x_key.as_deref(), Some("month"));
```

## Architecture

Three stages, composed linearly: mutators build a spec, the transition rules
keep it valid when the chart family changes, and the transformer turns
`(spec, rows)` into chart data. All three are pure and total — they never
mutate their inputs and never fail. Fetching rows and storing dashboards are
capabilities at the edges:

- [`spec`] - Specification schema, shelf mutators, type transitions
- [`schema`] - Catalog field descriptors and the numeric-type heuristic
- [`transform`] - Row reshaping (pivot, pie list, passthrough)
- [`source`] - Pluggable row fetching (`RowSource`)
- [`store`] - Dashboard/card persistence (`Repository`)
*/

pub mod schema;
pub mod source;
pub mod spec;
pub mod store;
pub mod transform;

// Re-export key types for convenience
pub use schema::{default_aggregate, is_numeric_type, Field};
pub use source::{MemorySource, QueryMeta, QueryResult, RowSource};
pub use spec::{
    Aggregate, ChartSpec, ChartType, DataQuery, DimensionRef, Encodings, FieldRef, MeasureRef,
    Slot, TimeUnit, YEncoding, SPEC_VERSION,
};
pub use store::{Card, Dashboard, MemoryRepository, Repository};
pub use transform::{transform_rows, Row, TransformedData};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error("Spec error: {0}")]
    SpecError(String),

    #[error("Data source error: {0}")]
    SourceError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
