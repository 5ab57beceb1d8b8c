//! Shelf mutators
//!
//! Pure, total functions that assign or remove a field on an encoding slot,
//! keeping the query's dimension/measure lists consistent with the encodings.
//! Every function takes `&self` and returns a fresh `ChartSpec`; inputs are
//! never mutated, and no input combination fails. Invalid field/slot pairings
//! are accepted as-is — the transformer copes with inconsistent specs.
//!
//! The consistency rule maintained here: a field referenced by an encoding
//! slot appears in `query.dimensions` when it plays a grouping role and in
//! `query.measures` when it is aggregated, with de-duplication by field name.
//!
//! One asymmetry is deliberate and load-bearing: removing a single-value slot
//! only drops the field from the query when no other slot still references
//! it, while removing a table column drops the field unconditionally.

use crate::schema::{default_aggregate, Field};
use crate::spec::types::{
    ChartSpec, ChartType, DimensionRef, FieldRef, MeasureRef, Slot, YEncoding,
};

impl ChartSpec {
    /// Assign a catalog field to an encoding slot, returning the new spec
    ///
    /// The first field assigned to any slot also sets `query.source` to that
    /// field's table. Re-assigning the same field to the same slot is a no-op
    /// beyond the first call.
    pub fn assign(&self, field: &Field, slot: Slot) -> ChartSpec {
        let mut spec = self.clone();
        if !spec.query.has_source() {
            spec.query.source = field.table.clone();
        }

        match slot {
            Slot::X => {
                spec.encodings.x = Some(DimensionRef::new(&field.name));
                if field.is_numeric() {
                    // A numeric X only makes sense on a scatter axis, where it
                    // is itself an aggregated value rather than a grouping key.
                    if spec.chart_type == ChartType::Scatter {
                        push_measure(&mut spec, field);
                    }
                } else {
                    push_dimension(&mut spec, field);
                }
            }
            Slot::Y => {
                spec.encodings.y = Some(YEncoding::Single(MeasureRef::new(&field.name)));
                push_measure(&mut spec, field);
            }
            Slot::Series => {
                // The series split key is always categorical.
                spec.encodings.series = Some(DimensionRef::new(&field.name));
                push_dimension(&mut spec, field);
            }
            Slot::Category => {
                spec.encodings.category = Some(DimensionRef::new(&field.name));
                if !field.is_numeric() {
                    push_dimension(&mut spec, field);
                }
            }
            Slot::Value => {
                spec.encodings.value = Some(MeasureRef::new(&field.name));
                push_measure(&mut spec, field);
            }
            Slot::Columns => {
                let columns = spec.encodings.columns.get_or_insert_with(Vec::new);
                if !columns.iter().any(|c| c.field == field.name) {
                    columns.push(FieldRef::new(&field.name));
                }
                if field.is_numeric() {
                    push_measure(&mut spec, field);
                } else {
                    push_dimension(&mut spec, field);
                }
            }
        }

        spec
    }

    /// Clear an encoding slot, returning the new spec
    ///
    /// Fields the slot held are removed from `dimensions`/`measures` unless
    /// another slot still references them. Clearing `Slot::Columns` empties
    /// the whole column list and removes every cleared field from the query
    /// unconditionally (the table-columns asymmetry).
    pub fn unassign(&self, slot: Slot) -> ChartSpec {
        let mut spec = self.clone();

        let released: Vec<String> = match slot {
            Slot::X => spec.encodings.x.take().map(|d| d.field).into_iter().collect(),
            Slot::Y => match spec.encodings.y.take() {
                Some(YEncoding::Single(m)) => vec![m.field],
                Some(YEncoding::Multiple(ms)) => ms.into_iter().map(|m| m.field).collect(),
                None => Vec::new(),
            },
            Slot::Series => spec
                .encodings
                .series
                .take()
                .map(|d| d.field)
                .into_iter()
                .collect(),
            Slot::Category => spec
                .encodings
                .category
                .take()
                .map(|d| d.field)
                .into_iter()
                .collect(),
            Slot::Value => spec
                .encodings
                .value
                .take()
                .map(|m| m.field)
                .into_iter()
                .collect(),
            Slot::Columns => {
                let columns = spec.encodings.columns.take().unwrap_or_default();
                for column in &columns {
                    spec.query.remove_field(&column.field);
                }
                return spec;
            }
        };

        let remaining = spec.encodings.referenced_fields();
        for field in released {
            if !remaining.contains(&field) {
                spec.query.remove_field(&field);
            }
        }

        spec
    }

    /// Remove a single field from the table columns shelf, returning the new spec
    ///
    /// The field is removed from `dimensions` and `measures` unconditionally,
    /// without the shared-reference check that single-value slots get.
    pub fn unassign_column(&self, field_name: &str) -> ChartSpec {
        let mut spec = self.clone();
        if let Some(columns) = spec.encodings.columns.as_mut() {
            columns.retain(|c| c.field != field_name);
        }
        spec.query.remove_field(field_name);
        spec
    }
}

/// Append to dimensions, de-duplicated by field name
fn push_dimension(spec: &mut ChartSpec, field: &Field) {
    if !spec.query.has_dimension(&field.name) {
        spec.query.dimensions.push(DimensionRef::new(&field.name));
    }
}

/// Append to measures with the default aggregate, de-duplicated by field name
fn push_measure(spec: &mut ChartSpec, field: &Field) {
    if !spec.query.has_measure(&field.name) {
        spec.query.measures.push(
            MeasureRef::new(&field.name)
                .with_aggregate(default_aggregate(&field.dtype))
                .with_label(&field.name),
        );
    }
}
