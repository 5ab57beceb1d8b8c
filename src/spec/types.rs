//! Chart specification types
//!
//! This module defines the typed structures that represent a declarative chart
//! specification: what to fetch (`DataQuery`) and how to map the results onto
//! visual roles (`Encodings`). Specifications are plain values with a lossless
//! JSON representation; mutation happens through the builder and transition
//! modules, which always return new values.
//!
//! # Structure
//!
//! ```text
//! ChartSpec
//! ├─ v: u8                    (spec version, only v=1 defined)
//! ├─ chart_type: ChartType    (bar | line | pie | table | scatter)
//! ├─ query: DataQuery         (source, dimensions, measures, filters, ...)
//! ├─ encodings: Encodings     (x, y, series, category, value, columns, ...)
//! └─ options: ChartOptions    (presentation only, no bearing on data)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ChartError, Result};

/// Current specification version. Serialized as the `v` field.
pub const SPEC_VERSION: u8 = 1;

// ============================================================================
// Enumerations
// ============================================================================

/// Closed set of supported chart families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Table,
    Scatter,
}

impl ChartType {
    /// All chart families, in declaration order
    pub const ALL: [ChartType; 5] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Table,
        ChartType::Scatter,
    ];

    /// Lowercase name as used in the JSON representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Table => "table",
            ChartType::Scatter => "scatter",
        }
    }

    /// Encoding slots that are meaningful for this chart family
    ///
    /// After a type transition, the occupied slots of a specification are
    /// always a subset of this set.
    pub fn valid_slots(&self) -> &'static [Slot] {
        match self {
            ChartType::Bar | ChartType::Line => &[Slot::X, Slot::Y, Slot::Series],
            ChartType::Pie => &[Slot::Category, Slot::Value],
            ChartType::Table => &[Slot::Columns],
            ChartType::Scatter => &[Slot::X, Slot::Y, Slot::Series],
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "table" => Ok(ChartType::Table),
            "scatter" => Ok(ChartType::Scatter),
            other => Err(ChartError::SpecError(format!(
                "Unknown chart type '{}' (expected bar, line, pie, table, or scatter)",
                other
            ))),
        }
    }
}

/// Named encoding slot a field can be assigned to
///
/// The slot determines which side of the query a field lands on: grouping
/// slots feed `dimensions`, measure slots feed `measures`. Mutators match on
/// this exhaustively so every chart family is handled by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    X,
    Y,
    Series,
    Category,
    Value,
    Columns,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::X => "x",
            Slot::Y => "y",
            Slot::Series => "series",
            Slot::Category => "category",
            Slot::Value => "value",
            Slot::Columns => "columns",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate function applied to a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Aggregate {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    CountDistinct,
}

/// Time bucketing unit for temporal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    None,
}

/// Comparison operator for query filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Contains,
    StartsWith,
    Between,
    IsNull,
    NotNull,
}

/// Sort direction for dimensions and orderBy entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Legend placement (presentation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    None,
    Top,
    Right,
    Bottom,
    Left,
}

// ============================================================================
// Field References
// ============================================================================

/// Bare reference to a query output field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Column name (e.g. "amount", "created_at")
    pub field: String,
    /// Optional human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldRef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: None,
        }
    }
}

/// Reference to a numerically aggregated field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRef {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Aggregate function; defaults to sum for numeric fields, count otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    /// Display format string (handled by the rendering layer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl MeasureRef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: None,
            aggregate: None,
            format: None,
        }
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Reference to a grouping/categorical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRef {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Time bucketing applied if the field is a timestamp/date
    #[serde(rename = "timeUnit", skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirection>,
}

impl DimensionRef {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: None,
            time_unit: None,
            sort: None,
        }
    }
}

// ============================================================================
// Data Query
// ============================================================================

/// Filter predicate on a query field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    /// Array for in/notIn/between; omitted for isNull/notNull
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Result ordering entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub dir: SortDirection,
}

/// The aggregation request: what to fetch from the data source
///
/// `source` is a logical table/view identifier, opaque to this crate. An empty
/// string means "not yet set"; the first field assigned to any slot fills it
/// in with that field's table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionRef>,
    #[serde(default)]
    pub measures: Vec<MeasureRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
}

impl DataQuery {
    /// Whether a source table has been assigned yet
    pub fn has_source(&self) -> bool {
        !self.source.is_empty()
    }

    pub fn has_dimension(&self, field: &str) -> bool {
        self.dimensions.iter().any(|d| d.field == field)
    }

    pub fn has_measure(&self, field: &str) -> bool {
        self.measures.iter().any(|m| m.field == field)
    }

    /// Remove a field from both the dimension and measure lists
    pub fn remove_field(&mut self, field: &str) {
        self.dimensions.retain(|d| d.field != field);
        self.measures.retain(|m| m.field != field);
    }
}

// ============================================================================
// Encodings
// ============================================================================

/// One or more measures on the y shelf
///
/// The JSON form is either a single object or an array of objects, so this is
/// an untagged union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YEncoding {
    Single(MeasureRef),
    Multiple(Vec<MeasureRef>),
}

impl YEncoding {
    /// First (primary) measure, if any
    pub fn first(&self) -> Option<&MeasureRef> {
        match self {
            YEncoding::Single(m) => Some(m),
            YEncoding::Multiple(ms) => ms.first(),
        }
    }

    /// All measures in shelf order
    pub fn measures(&self) -> Vec<&MeasureRef> {
        match self {
            YEncoding::Single(m) => vec![m],
            YEncoding::Multiple(ms) => ms.iter().collect(),
        }
    }
}

/// Mapping from semantic slots to field references
///
/// Which slots are meaningful depends on the chart family (see
/// [`ChartType::valid_slots`]); unknown combinations are representable and
/// tolerated, the downstream transformer copes with them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Encodings {
    /// Primary category / time axis (bar, line, scatter)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<DimensionRef>,
    /// One or more measures (bars/lines)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<YEncoding>,
    /// Splits y into multiple series by the distinct values of a dimension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<DimensionRef>,
    /// Slice label dimension (pie)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DimensionRef>,
    /// Slice size measure (pie)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<MeasureRef>,
    /// Ordered column list (table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<FieldRef>>,
    /// Palette override (presentation only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<String>>,
    /// Show data labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<bool>,
    /// Bar/area stacking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<bool>,
    /// Line smoothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    /// Numeric X axis for scatter (alias of x)
    #[serde(rename = "xValue", skip_serializing_if = "Option::is_none")]
    pub x_value: Option<MeasureRef>,
    /// Numeric Y axis for scatter (alias of y)
    #[serde(rename = "yValue", skip_serializing_if = "Option::is_none")]
    pub y_value: Option<MeasureRef>,
    /// Bubble size measure (scatter)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<MeasureRef>,
}

impl Encodings {
    /// Whether no slot holds a field
    pub fn is_empty(&self) -> bool {
        self == &Encodings::default()
    }

    /// Occupied slots, in declaration order
    pub fn used_slots(&self) -> Vec<Slot> {
        let mut slots = Vec::new();
        if self.x.is_some() {
            slots.push(Slot::X);
        }
        if self.y.is_some() {
            slots.push(Slot::Y);
        }
        if self.series.is_some() {
            slots.push(Slot::Series);
        }
        if self.category.is_some() {
            slots.push(Slot::Category);
        }
        if self.value.is_some() {
            slots.push(Slot::Value);
        }
        if self.columns.as_ref().is_some_and(|c| !c.is_empty()) {
            slots.push(Slot::Columns);
        }
        slots
    }

    /// Every field name referenced by any slot
    pub fn referenced_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if let Some(x) = &self.x {
            fields.push(x.field.clone());
        }
        if let Some(y) = &self.y {
            fields.extend(y.measures().iter().map(|m| m.field.clone()));
        }
        for dim in [&self.series, &self.category] {
            if let Some(d) = dim {
                fields.push(d.field.clone());
            }
        }
        for measure in [&self.value, &self.x_value, &self.y_value, &self.size] {
            if let Some(m) = measure {
                fields.push(m.field.clone());
            }
        }
        if let Some(columns) = &self.columns {
            fields.extend(columns.iter().map(|c| c.field.clone()));
        }
        fields
    }
}

// ============================================================================
// Options and Root
// ============================================================================

/// Presentation settings with no bearing on data correctness
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendPosition>,
    #[serde(rename = "yAxisFormat", skip_serializing_if = "Option::is_none")]
    pub y_axis_format: Option<String>,
    #[serde(rename = "xAxisTickFormat", skip_serializing_if = "Option::is_none")]
    pub x_axis_tick_format: Option<String>,
    /// Extra fields to show in the tooltip
    #[serde(rename = "tooltipFields", skip_serializing_if = "Option::is_none")]
    pub tooltip_fields: Option<Vec<FieldRef>>,
    /// Chart height in px; width is the responsive container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Limit series cardinality
    #[serde(rename = "sampleTopNSeries", skip_serializing_if = "Option::is_none")]
    pub sample_top_n_series: Option<u32>,
    /// Persisted table column display order
    #[serde(rename = "columnOrder", skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
}

/// Root chart specification
///
/// Immutable by convention: the builder and transition functions return new
/// values and never touch their input. Serializes losslessly to JSON; the `v`
/// version tag is the forward-compatibility hook (only `v = 1` is defined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(default = "default_version")]
    pub v: u8,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub query: DataQuery,
    #[serde(default)]
    pub encodings: Encodings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChartOptions>,
}

fn default_version() -> u8 {
    SPEC_VERSION
}

impl ChartSpec {
    /// Create an empty specification with the given chart family
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            v: SPEC_VERSION,
            chart_type,
            query: DataQuery::default(),
            encodings: Encodings::default(),
            options: None,
        }
    }

    /// Serialize to the persisted JSON representation
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ChartError::SerializationError(format!("Failed to serialize spec: {}", e)))
    }

    /// Deserialize from the persisted JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChartError::SerializationError(format!("Failed to parse spec: {}", e)))
    }
}

impl Default for ChartSpec {
    /// A new, empty card starts as a table
    fn default() -> Self {
        Self::new(ChartType::Table)
    }
}
