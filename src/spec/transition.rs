//! Chart-type transitions
//!
//! Switching a specification to a new chart family remaps compatible slots
//! (category <-> x, value <-> y) and discards the rest, so the result only
//! carries encodings the target family understands. The rule is keyed by the
//! target type alone: the same input spec and target always produce the same
//! output, whatever path led there.
//!
//! Cleanup of the query lists is deliberately narrow. Only the scatter
//! transition sweeps the dropped `x` field out of `dimensions`; other drops
//! (the series a pie discards, for instance) leave their query entries
//! behind. That asymmetry matches the persisted-spec contract and is pinned
//! by tests below — do not "fix" it here.

use crate::spec::types::{ChartSpec, ChartType, Encodings, YEncoding};

impl ChartSpec {
    /// Produce a specification retargeted at a new chart family
    ///
    /// Total and always succeeding; the input is never mutated. Occupied
    /// slots of the result are a subset of [`ChartType::valid_slots`] for the
    /// target.
    pub fn with_chart_type(&self, target: ChartType) -> ChartSpec {
        let mut spec = self.clone();
        spec.chart_type = target;

        match target {
            ChartType::Pie => {
                // Pie uses category/value. Remap only when a conflicting slot
                // is occupied; a spec already in pie shape passes through.
                let e = &spec.encodings;
                if e.x.is_some() || e.y.is_some() || e.series.is_some() || has_columns(e) {
                    spec.encodings = Encodings {
                        category: e.x.clone().or_else(|| e.category.clone()),
                        value: e
                            .y
                            .as_ref()
                            .and_then(|y| y.first())
                            .cloned()
                            .or_else(|| e.value.clone()),
                        ..Default::default()
                    };
                }
            }
            ChartType::Table => {
                // Tables carry no shelf encodings; column assignment is a
                // separate, later user action. The query is left untouched.
                spec.encodings = Encodings::default();
            }
            ChartType::Scatter => {
                // Y is already numeric and carries over, as does the series
                // split. The old X was categorical: it cannot become a numeric
                // scatter axis, so it is dropped and swept from dimensions.
                let old_x = spec.encodings.x.as_ref().map(|d| d.field.clone());
                spec.encodings = Encodings {
                    y: spec
                        .encodings
                        .y
                        .clone()
                        .or_else(|| spec.encodings.value.clone().map(YEncoding::Single)),
                    series: spec.encodings.series.clone(),
                    ..Default::default()
                };
                if let Some(field) = old_x {
                    spec.query.dimensions.retain(|d| d.field != field);
                }
            }
            ChartType::Bar | ChartType::Line => {
                let e = &spec.encodings;
                if e.category.is_some() || e.value.is_some() || has_columns(e) {
                    spec.encodings = Encodings {
                        x: e.category.clone().or_else(|| e.x.clone()),
                        y: e
                            .value
                            .clone()
                            .map(YEncoding::Single)
                            .or_else(|| e.y.clone()),
                        series: e.series.clone(),
                        ..Default::default()
                    };
                }
            }
        }

        spec
    }
}

fn has_columns(encodings: &Encodings) -> bool {
    encodings.columns.as_ref().is_some_and(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use crate::spec::Slot;
    use proptest::prelude::*;

    fn bar_spec() -> ChartSpec {
        ChartSpec::new(ChartType::Bar)
            .assign(&Field::new("month", "varchar", "sales"), Slot::X)
            .assign(&Field::new("revenue", "decimal", "sales"), Slot::Y)
            .assign(&Field::new("region", "varchar", "sales"), Slot::Series)
    }

    fn pie_spec() -> ChartSpec {
        ChartSpec::new(ChartType::Pie)
            .assign(&Field::new("status", "varchar", "orders"), Slot::Category)
            .assign(&Field::new("amount", "numeric", "orders"), Slot::Value)
    }

    #[test]
    fn test_bar_to_pie_remaps_x_y_and_drops_series() {
        let pie = bar_spec().with_chart_type(ChartType::Pie);
        assert_eq!(pie.chart_type, ChartType::Pie);
        assert_eq!(pie.encodings.category.as_ref().unwrap().field, "month");
        assert_eq!(
            pie.encodings.value.as_ref().unwrap().field,
            "revenue",
        );
        assert!(pie.encodings.x.is_none());
        assert!(pie.encodings.y.is_none());
        assert!(pie.encodings.series.is_none());
    }

    #[test]
    fn test_bar_to_pie_leaves_series_dimension_behind() {
        // The dropped series encoding does NOT sweep its dimension entry.
        // Pinned: this mirrors the persisted contract, surprising as it is.
        let pie = bar_spec().with_chart_type(ChartType::Pie);
        assert!(pie.query.has_dimension("region"));
    }

    #[test]
    fn test_pie_to_bar_remaps_category_and_value() {
        let bar = pie_spec().with_chart_type(ChartType::Bar);
        assert_eq!(bar.encodings.x.as_ref().unwrap().field, "status");
        assert_eq!(
            bar.encodings.y.as_ref().unwrap().first().unwrap().field,
            "amount"
        );
        assert!(bar.encodings.category.is_none());
        assert!(bar.encodings.value.is_none());
    }

    #[test]
    fn test_bar_to_line_passes_encodings_through() {
        let line = bar_spec().with_chart_type(ChartType::Line);
        assert_eq!(line.chart_type, ChartType::Line);
        assert_eq!(line.encodings, bar_spec().encodings);
    }

    #[test]
    fn test_to_table_clears_encodings_but_not_query() {
        let table = bar_spec().with_chart_type(ChartType::Table);
        assert!(table.encodings.is_empty());
        assert!(table.query.has_dimension("month"));
        assert!(table.query.has_measure("revenue"));
    }

    #[test]
    fn test_table_columns_to_bar_clears_encodings() {
        let table = ChartSpec::new(ChartType::Table)
            .assign(&Field::new("month", "varchar", "accounts"), Slot::Columns)
            .assign(&Field::new("revenue", "decimal", "accounts"), Slot::Columns);
        let bar = table.with_chart_type(ChartType::Bar);
        assert!(bar.encodings.is_empty());
        // Only encodings are cleared; the columns' query entries survive
        assert!(bar.query.has_dimension("month"));
        assert!(bar.query.has_measure("revenue"));
    }

    #[test]
    fn test_to_scatter_drops_x_and_sweeps_its_dimension() {
        let scatter = bar_spec().with_chart_type(ChartType::Scatter);
        assert!(scatter.encodings.x.is_none());
        assert!(!scatter.query.has_dimension("month"));
        // Y and series carry over, and the series dimension stays
        assert_eq!(
            scatter.encodings.y.as_ref().unwrap().first().unwrap().field,
            "revenue"
        );
        assert_eq!(scatter.encodings.series.as_ref().unwrap().field, "region");
        assert!(scatter.query.has_dimension("region"));
    }

    #[test]
    fn test_pie_to_scatter_promotes_value_to_y() {
        let scatter = pie_spec().with_chart_type(ChartType::Scatter);
        assert_eq!(
            scatter.encodings.y.as_ref().unwrap().first().unwrap().field,
            "amount"
        );
        assert!(scatter.encodings.category.is_none());
        assert!(scatter.encodings.value.is_none());
    }

    #[test]
    fn test_transition_is_path_independent() {
        // bar -> pie -> scatter equals the same spec taken bar -> scatter
        // only where the rule says so; what must hold is that a second
        // application of the same target is a no-op.
        let once = bar_spec().with_chart_type(ChartType::Pie);
        assert_eq!(once.with_chart_type(ChartType::Pie), once);

        let once = bar_spec().with_chart_type(ChartType::Scatter);
        assert_eq!(once.with_chart_type(ChartType::Scatter), once);
    }

    #[test]
    fn test_transition_does_not_mutate_input() {
        let original = bar_spec();
        let snapshot = original.clone();
        let _ = original.with_chart_type(ChartType::Pie);
        assert_eq!(original, snapshot);
    }

    // ------------------------------------------------------------------
    // Property: totality — any mutator-built spec, any target, valid slots
    // ------------------------------------------------------------------

    fn spec_strategy() -> impl Strategy<Value = ChartSpec> {
        let start = prop_oneof![
            Just(ChartType::Bar),
            Just(ChartType::Line),
            Just(ChartType::Pie),
            Just(ChartType::Table),
            Just(ChartType::Scatter),
        ];
        let assignments = proptest::collection::vec(
            prop_oneof![
                Just((Field::new("month", "varchar", "sales"), Slot::X)),
                Just((Field::new("region", "varchar", "sales"), Slot::Series)),
                Just((Field::new("status", "varchar", "sales"), Slot::Category)),
                Just((Field::new("revenue", "decimal", "sales"), Slot::Y)),
                Just((Field::new("amount", "numeric", "sales"), Slot::Value)),
                Just((Field::new("owner", "varchar", "sales"), Slot::Columns)),
                Just((Field::new("quantity", "int", "sales"), Slot::Columns)),
            ],
            0..8,
        );
        let hops = proptest::collection::vec(start.clone(), 0..3);

        (start, assignments, hops).prop_map(|(start, assignments, hops)| {
            let mut spec = ChartSpec::new(start);
            for (field, slot) in assignments {
                spec = spec.assign(&field, slot);
            }
            for hop in hops {
                spec = spec.with_chart_type(hop);
            }
            spec
        })
    }

    proptest! {
        #[test]
        fn prop_transition_yields_only_valid_slots(
            spec in spec_strategy(),
            target in prop_oneof![
                Just(ChartType::Bar),
                Just(ChartType::Line),
                Just(ChartType::Pie),
                Just(ChartType::Table),
                Just(ChartType::Scatter),
            ]
        ) {
            let out = spec.with_chart_type(target);
            prop_assert_eq!(out.chart_type, target);
            let valid = target.valid_slots();
            for slot in out.encodings.used_slots() {
                prop_assert!(
                    valid.contains(&slot),
                    "slot {} invalid for {}",
                    slot,
                    target
                );
            }
        }
    }
}
