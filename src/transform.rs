//! Row transformation for rendering
//!
//! Turns a finalized specification plus the flat rows its query returned into
//! the exact shape a chart-rendering primitive consumes: a pivoted series
//! table for line/bar, a category/value list for pie, raw passthrough for
//! scatter and table.
//!
//! The transformer never fails. Empty input yields empty output, missing
//! values coalesce to zero on measure positions, and unresolvable key names
//! come back as `None` — every lookup is an explicit `Option`, so the
//! "always produce something renderable" contract is checked by the compiler
//! rather than by convention. Live editing routinely feeds half-built specs
//! through here; introducing failure paths would regress that experience.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

use crate::spec::{ChartSpec, ChartType, MeasureRef};

/// A flat result row: field name to scalar, as returned by the data source
pub type Row = Map<String, Value>;

/// Renderer-ready output shape
///
/// `chart_data` is ordered; for pivoted line/bar output the order is
/// first-seen x-value order, otherwise input row order. `series_keys` is the
/// stable-deduplicated list of series the renderer should draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedData {
    pub chart_data: Vec<Row>,
    pub series_keys: Vec<String>,
    pub x_key: Option<String>,
    pub value_key: Option<String>,
}

/// Reshape query result rows according to the specification
///
/// Branches on `spec.chart_type`; see the module docs for the per-family
/// shapes. The specification is only read, never normalized or validated.
pub fn transform_rows(spec: &ChartSpec, rows: Vec<Row>) -> TransformedData {
    match spec.chart_type {
        ChartType::Scatter => transform_scatter(spec, rows),
        ChartType::Pie => transform_pie(spec, rows),
        ChartType::Table => transform_passthrough(spec, rows),
        ChartType::Bar | ChartType::Line => transform_series(spec, rows),
    }
}

/// Scatter plots need raw point pairs, not aggregated buckets
fn transform_scatter(spec: &ChartSpec, rows: Vec<Row>) -> TransformedData {
    let e = &spec.encodings;
    let x_key = e
        .x
        .as_ref()
        .map(|d| d.field.clone())
        .or_else(|| e.x_value.as_ref().map(|m| m.field.clone()));
    let value_key = e
        .y
        .as_ref()
        .and_then(|y| y.first())
        .map(|m| m.field.clone())
        .or_else(|| e.y_value.as_ref().map(|m| m.field.clone()));

    TransformedData {
        chart_data: rows,
        series_keys: Vec::new(),
        x_key,
        value_key,
    }
}

/// One output record per input row, value coalesced to zero
///
/// No grouping or dedup of repeated categories happens here; aggregation is
/// the query's responsibility, duplicates pass through.
fn transform_pie(spec: &ChartSpec, rows: Vec<Row>) -> TransformedData {
    let category_field = spec
        .encodings
        .category
        .as_ref()
        .map(|d| d.field.clone())
        .or_else(|| spec.query.dimensions.first().map(|d| d.field.clone()));
    let value_field = spec
        .encodings
        .value
        .as_ref()
        .map(|m| m.field.clone())
        .or_else(|| spec.query.measures.first().map(|m| m.field.clone()));

    let chart_data = rows
        .iter()
        .map(|row| {
            let mut record = Row::new();
            if let Some(category) = &category_field {
                record.insert(
                    category.clone(),
                    row.get(category).cloned().unwrap_or(Value::Null),
                );
            }
            if let Some(value) = &value_field {
                record.insert(
                    value.clone(),
                    non_null(row.get(value)).cloned().unwrap_or_else(|| json!(0)),
                );
            }
            record
        })
        .collect();

    TransformedData {
        chart_data,
        series_keys: value_field.clone().into_iter().collect(),
        x_key: category_field,
        value_key: value_field,
    }
}

/// Tables render rows as-is; keys are derived only for interface parity
fn transform_passthrough(spec: &ChartSpec, rows: Vec<Row>) -> TransformedData {
    let (x_key, _, value_key) = series_keys_for(spec);
    TransformedData {
        chart_data: rows,
        series_keys: Vec::new(),
        x_key,
        value_key: Some(value_key),
    }
}

/// Line/bar: pivot by series when one is set, else one record per row
fn transform_series(spec: &ChartSpec, rows: Vec<Row>) -> TransformedData {
    let (x_key, measure, value_key) = series_keys_for(spec);
    let series_field = spec.encodings.series.as_ref().map(|d| d.field.clone());

    let Some(series_field) = series_field else {
        // Single series: no grouping across rows sharing an x-value.
        let chart_data = rows
            .iter()
            .map(|row| {
                let mut record = Row::new();
                if let Some(x) = &x_key {
                    record.insert(x.clone(), row.get(x).cloned().unwrap_or(Value::Null));
                }
                record.insert(value_key.clone(), coalesce_value(row, &value_key, measure.as_ref()));
                record
            })
            .collect();
        return TransformedData {
            chart_data,
            series_keys: vec![value_key.clone()],
            x_key,
            value_key: Some(value_key),
        };
    };

    // Pivot: one output record per distinct x-value (first-seen order), one
    // column per distinct series value. Rows sharing the same (x, series)
    // pair overwrite: last write wins, no client-side aggregation.
    let mut grouped: Vec<Row> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut series_keys: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for row in &rows {
        let group = group_key(x_key.as_ref().and_then(|x| row.get(x)));
        let at = *index.entry(group).or_insert_with(|| {
            let mut record = Row::new();
            if let Some(x) = &x_key {
                record.insert(x.clone(), row.get(x).cloned().unwrap_or(Value::Null));
            }
            grouped.push(record);
            grouped.len() - 1
        });

        let series_value = group_key(row.get(&series_field));
        let value = coalesce_value(row, &value_key, measure.as_ref());
        grouped[at].insert(series_value.clone(), value);

        if seen.insert(series_value.clone()) {
            series_keys.push(series_value);
        }
    }

    TransformedData {
        chart_data: grouped,
        series_keys,
        x_key,
        value_key: Some(value_key),
    }
}

/// Shared key derivation for the bar/line/table branches
///
/// The output value key prefers the primary y measure's label over its field
/// name, falling back to the literal "value" when no measure is encoded.
fn series_keys_for(spec: &ChartSpec) -> (Option<String>, Option<MeasureRef>, String) {
    let x_key = spec
        .encodings
        .x
        .as_ref()
        .map(|d| d.field.clone())
        .or_else(|| spec.query.dimensions.first().map(|d| d.field.clone()));
    let measure = spec.encodings.y.as_ref().and_then(|y| y.first()).cloned();
    let value_key = measure
        .as_ref()
        .and_then(|m| m.label.clone().filter(|l| !l.is_empty()))
        .or_else(|| {
            measure
                .as_ref()
                .map(|m| m.field.clone())
                .filter(|f| !f.is_empty())
        })
        .unwrap_or_else(|| "value".to_string());
    (x_key, measure, value_key)
}

/// `row[value_key] ?? row[measure.field] ?? 0`, with null treated as missing
fn coalesce_value(row: &Row, value_key: &str, measure: Option<&MeasureRef>) -> Value {
    non_null(row.get(value_key))
        .or_else(|| measure.and_then(|m| non_null(row.get(&m.field))))
        .cloned()
        .unwrap_or_else(|| json!(0))
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Stringify a scalar for use as a grouping or pivot-column key
///
/// Strings keep their content, other scalars use their JSON rendering, and a
/// missing or null value becomes the literal key "null".
fn group_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use crate::spec::{DimensionRef, MeasureRef, Slot, YEncoding};

    fn rows_from(value: Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    fn line_spec() -> ChartSpec {
        ChartSpec::new(ChartType::Line)
            .assign(&Field::new("m", "varchar", "sales"), Slot::X)
            .assign(&Field::new("rev", "decimal", "sales"), Slot::Y)
    }

    #[test]
    fn test_pivot_by_series() {
        let spec = line_spec().assign(&Field::new("src", "varchar", "sales"), Slot::Series);
        let rows = rows_from(json!([
            {"m": "Jan", "src": "Web", "rev": 10},
            {"m": "Jan", "src": "Ref", "rev": 5},
            {"m": "Feb", "src": "Web", "rev": 7},
        ]));

        let out = transform_rows(&spec, rows);
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([
                {"m": "Jan", "Web": 10, "Ref": 5},
                {"m": "Feb", "Web": 7},
            ])
        );
        assert_eq!(out.series_keys, vec!["Web", "Ref"]);
        assert_eq!(out.x_key.as_deref(), Some("m"));
        assert_eq!(out.value_key.as_deref(), Some("rev"));
    }

    #[test]
    fn test_pivot_last_write_wins() {
        let spec = line_spec().assign(&Field::new("src", "varchar", "sales"), Slot::Series);
        let rows = rows_from(json!([
            {"m": "Jan", "src": "Web", "rev": 10},
            {"m": "Jan", "src": "Web", "rev": 99},
        ]));

        let out = transform_rows(&spec, rows);
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "Web": 99}])
        );
        assert_eq!(out.series_keys, vec!["Web"]);
    }

    #[test]
    fn test_pivot_numeric_series_values_become_keys() {
        let spec = line_spec().assign(&Field::new("year", "varchar", "sales"), Slot::Series);
        let rows = rows_from(json!([
            {"m": "Jan", "year": 2023, "rev": 4},
            {"m": "Jan", "year": 2024, "rev": 6},
        ]));

        let out = transform_rows(&spec, rows);
        assert_eq!(out.series_keys, vec!["2023", "2024"]);
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "2023": 4, "2024": 6}])
        );
    }

    #[test]
    fn test_single_series_keeps_duplicate_x_rows() {
        let out = transform_rows(
            &line_spec(),
            rows_from(json!([
                {"m": "Jan", "rev": 10},
                {"m": "Jan", "rev": 5},
            ])),
        );
        // No series: no grouping across rows sharing the same x-value
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "rev": 10}, {"m": "Jan", "rev": 5}])
        );
        assert_eq!(out.series_keys, vec!["rev"]);
    }

    #[test]
    fn test_single_series_coalesces_missing_value_to_zero() {
        let out = transform_rows(
            &line_spec(),
            rows_from(json!([{"m": "Jan"}, {"m": "Feb", "rev": null}])),
        );
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "rev": 0}, {"m": "Feb", "rev": 0}])
        );
    }

    #[test]
    fn test_value_key_prefers_label_over_field() {
        let mut spec = line_spec();
        spec.encodings.y = Some(YEncoding::Single(
            MeasureRef::new("rev").with_label("Revenue"),
        ));
        let out = transform_rows(&spec, rows_from(json!([{"m": "Jan", "rev": 10}])));
        assert_eq!(out.value_key.as_deref(), Some("Revenue"));
        // The labeled key is absent from the row, so the measure field backs it
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "Revenue": 10}])
        );
    }

    #[test]
    fn test_value_key_defaults_without_y_encoding() {
        let mut spec = ChartSpec::new(ChartType::Bar);
        spec.encodings.x = Some(DimensionRef::new("m"));
        let out = transform_rows(&spec, rows_from(json!([{"m": "Jan"}])));
        assert_eq!(out.value_key.as_deref(), Some("value"));
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "value": 0}])
        );
    }

    #[test]
    fn test_x_falls_back_to_first_query_dimension() {
        let mut spec = line_spec();
        spec.encodings.x = None;
        let out = transform_rows(&spec, rows_from(json!([{"m": "Jan", "rev": 3}])));
        assert_eq!(out.x_key.as_deref(), Some("m"));
    }

    #[test]
    fn test_missing_x_everywhere_yields_none_key() {
        let mut spec = ChartSpec::new(ChartType::Bar);
        spec.encodings.y = Some(YEncoding::Single(MeasureRef::new("rev")));
        let out = transform_rows(&spec, rows_from(json!([{"rev": 1}, {"rev": 2}])));
        assert_eq!(out.x_key, None);
        // Records carry only the value entry; no fabricated x key appears
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"rev": 1}, {"rev": 2}])
        );
    }

    #[test]
    fn test_pie_zero_coalescing() {
        let spec = ChartSpec::new(ChartType::Pie)
            .assign(&Field::new("bucket", "varchar", "funnel"), Slot::Category)
            .assign(&Field::new("amt", "numeric", "funnel"), Slot::Value);
        let out = transform_rows(
            &spec,
            rows_from(json!([{"bucket": "A"}, {"bucket": "B", "amt": 5}])),
        );
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"bucket": "A", "amt": 0}, {"bucket": "B", "amt": 5}])
        );
        assert_eq!(out.series_keys, vec!["amt"]);
        assert_eq!(out.x_key.as_deref(), Some("bucket"));
        assert_eq!(out.value_key.as_deref(), Some("amt"));
    }

    #[test]
    fn test_pie_duplicates_pass_through() {
        let spec = ChartSpec::new(ChartType::Pie)
            .assign(&Field::new("bucket", "varchar", "funnel"), Slot::Category)
            .assign(&Field::new("amt", "numeric", "funnel"), Slot::Value);
        let out = transform_rows(
            &spec,
            rows_from(json!([{"bucket": "A", "amt": 1}, {"bucket": "A", "amt": 2}])),
        );
        assert_eq!(out.chart_data.len(), 2);
    }

    #[test]
    fn test_pie_falls_back_to_query_lists() {
        let mut spec = ChartSpec::new(ChartType::Pie);
        spec.query.dimensions.push(DimensionRef::new("bucket"));
        spec.query.measures.push(MeasureRef::new("amt"));
        let out = transform_rows(&spec, rows_from(json!([{"bucket": "A", "amt": 3}])));
        assert_eq!(out.x_key.as_deref(), Some("bucket"));
        assert_eq!(out.value_key.as_deref(), Some("amt"));
    }

    #[test]
    fn test_pie_without_any_fields_degrades_to_empty_records() {
        let out = transform_rows(
            &ChartSpec::new(ChartType::Pie),
            rows_from(json!([{"anything": 1}])),
        );
        assert_eq!(out.x_key, None);
        assert_eq!(out.value_key, None);
        assert!(out.series_keys.is_empty());
        assert_eq!(out.chart_data, vec![Row::new()]);
    }

    #[test]
    fn test_scatter_passthrough_is_unmodified() {
        let mut spec = ChartSpec::new(ChartType::Scatter);
        spec.encodings.y = Some(YEncoding::Single(MeasureRef::new("amount")));
        let rows = rows_from(json!([
            {"amount": 10, "deals": 3, "junk": "kept"},
            {"amount": null},
        ]));
        let out = transform_rows(&spec, rows.clone());
        assert_eq!(out.chart_data, rows);
        assert!(out.series_keys.is_empty());
        assert_eq!(out.value_key.as_deref(), Some("amount"));
    }

    #[test]
    fn test_scatter_falls_back_to_value_aliases() {
        let mut spec = ChartSpec::new(ChartType::Scatter);
        spec.encodings.x_value = Some(MeasureRef::new("deals"));
        spec.encodings.y_value = Some(MeasureRef::new("amount"));
        let out = transform_rows(&spec, Vec::new());
        assert_eq!(out.x_key.as_deref(), Some("deals"));
        assert_eq!(out.value_key.as_deref(), Some("amount"));
    }

    #[test]
    fn test_table_passthrough() {
        let spec = ChartSpec::new(ChartType::Table)
            .assign(&Field::new("m", "varchar", "sales"), Slot::Columns)
            .assign(&Field::new("rev", "decimal", "sales"), Slot::Columns);
        let rows = rows_from(json!([{"m": "Jan", "rev": 10, "extra": true}]));
        let out = transform_rows(&spec, rows.clone());
        assert_eq!(out.chart_data, rows);
        assert!(out.series_keys.is_empty());
        // Keys derived for interface parity even though tables ignore them
        assert_eq!(out.x_key.as_deref(), Some("m"));
        assert_eq!(out.value_key.as_deref(), Some("value"));
    }

    #[test]
    fn test_empty_rows_yield_empty_chart_data_for_every_family() {
        for chart_type in ChartType::ALL {
            let out = transform_rows(&ChartSpec::new(chart_type), Vec::new());
            assert!(out.chart_data.is_empty(), "{} not empty", chart_type);
        }
    }

    #[test]
    fn test_null_series_values_group_under_null_key() {
        let spec = line_spec().assign(&Field::new("src", "varchar", "sales"), Slot::Series);
        let rows = rows_from(json!([
            {"m": "Jan", "src": null, "rev": 2},
            {"m": "Jan", "rev": 3},
        ]));
        let out = transform_rows(&spec, rows);
        // Null and missing series values coincide on the same pivot column
        assert_eq!(out.series_keys, vec!["null"]);
        assert_eq!(
            serde_json::to_value(&out.chart_data).unwrap(),
            json!([{"m": "Jan", "null": 3}])
        );
    }

    #[test]
    fn test_transformed_data_serializes_camel_case() {
        let out = transform_rows(&line_spec(), rows_from(json!([{"m": "Jan", "rev": 1}])));
        let value = serde_json::to_value(&out).unwrap();
        assert!(value.get("chartData").is_some());
        assert!(value.get("seriesKeys").is_some());
        assert_eq!(value["xKey"], "m");
        assert_eq!(value["valueKey"], "rev");
    }
}
