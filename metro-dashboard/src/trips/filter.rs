//! Composable filter stages over a [`TripTable`].
//!
//! Stages run in a fixed order (categorical, boolean, then each range in
//! turn) and each one sees only the rows its predecessor kept. A stage whose
//! column is missing from the table passes its input through untouched.

use serde::Serialize;
use tracing::debug;

use super::columns;
use super::table::{Cell, TripTable};

/// Categorical value that disables the categorical stage.
pub const ALL: &str = "All";

/// Error returned when range bounds are unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid range for {column:?}: low {low} must not exceed high {high}")]
pub struct InvalidRange {
    pub column: String,
    pub low: f64,
    pub high: f64,
}

/// Keep rows whose `column` equals `value` as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalFilter {
    pub column: String,
    pub value: String,
}

impl CategoricalFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether the filter selects every value.
    pub fn is_all(&self) -> bool {
        self.value == ALL
    }
}

/// Keep rows whose `column` is exactly the boolean `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanFilter {
    pub column: String,
    pub value: bool,
}

impl BooleanFilter {
    pub fn new(column: impl Into<String>, value: bool) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// Keep rows whose numeric `column` lies within inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    column: String,
    bounds: Option<(f64, f64)>,
}

impl RangeFilter {
    /// A range with explicit bounds.
    pub fn new(column: impl Into<String>, low: f64, high: f64) -> Result<Self, InvalidRange> {
        let column = column.into();
        if low.is_nan() || high.is_nan() || low > high {
            return Err(InvalidRange { column, low, high });
        }
        Ok(Self {
            column,
            bounds: Some((low, high)),
        })
    }

    /// A range spanning whatever the stage's input holds.
    ///
    /// The bounds are the column's min/max at the moment the stage runs,
    /// after every earlier stage has narrowed the rows.
    pub fn full(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            bounds: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Explicit bounds, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }
}

/// Selection criteria for one pass of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub categorical: Option<CategoricalFilter>,
    pub boolean: Option<BooleanFilter>,
    pub ranges: Vec<RangeFilter>,
}

impl FilterCriteria {
    /// Criteria with every stage disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categorical(mut self, filter: CategoricalFilter) -> Self {
        self.categorical = Some(filter);
        self
    }

    pub fn with_boolean(mut self, filter: BooleanFilter) -> Self {
        self.boolean = Some(filter);
        self
    }

    /// Append a range stage; ranges run in the order they were added.
    pub fn with_range(mut self, filter: RangeFilter) -> Self {
        self.ranges.push(filter);
        self
    }

    /// The dashboard's stage chain over the travel-time columns.
    ///
    /// `origin` may be [`ALL`]. A `None` range spans the stage input.
    pub fn dashboard(
        origin: &str,
        transit_is_faster: Option<bool>,
        distance_km: Option<(f64, f64)>,
        transit_pct_faster: Option<(f64, f64)>,
    ) -> Result<Self, InvalidRange> {
        let range = |column: &str, bounds: Option<(f64, f64)>| match bounds {
            Some((low, high)) => RangeFilter::new(column, low, high),
            None => Ok(RangeFilter::full(column)),
        };

        let mut criteria = Self::new()
            .with_categorical(CategoricalFilter::new(columns::ORIGIN, origin))
            .with_range(range(columns::DRIVING_DISTANCE_KM, distance_km)?)
            .with_range(range(columns::TRANSIT_PERCENTAGE_FASTER, transit_pct_faster)?);

        if let Some(value) = transit_is_faster {
            criteria = criteria.with_boolean(BooleanFilter::new(columns::TRANSIT_IS_FASTER, value));
        }

        Ok(criteria)
    }
}

/// Which kind of stage a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Categorical,
    Boolean,
    Range,
}

/// What one stage did to the rows passing through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub kind: StageKind,
    pub column: String,
    /// False when the stage passed its input through (missing column or "All").
    pub applied: bool,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Min/max of the stage input, for range stages on a present column.
    /// These are the default slider bounds for the stage.
    pub input_bounds: Option<(f64, f64)>,
    /// Bounds the stage actually filtered with.
    pub effective_bounds: Option<(f64, f64)>,
}

/// Rows remaining after every enabled stage, plus per-stage reports.
#[derive(Debug, Clone)]
pub struct FilteredDataset {
    table: TripTable,
    stages: Vec<StageReport>,
}

impl FilteredDataset {
    pub fn table(&self) -> &TripTable {
        &self.table
    }

    pub fn into_table(self) -> TripTable {
        self.table
    }

    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Report of the stage filtering `column`, if one ran.
    pub fn stage(&self, column: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.column == column)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Distinct values of `column` among the remaining rows.
    pub fn unique_text(&self, column: &str) -> Vec<String> {
        self.table.unique_text(column)
    }

    /// Choices for a categorical selector: [`ALL`] then each distinct value.
    pub fn category_options(&self, column: &str) -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain(self.table.unique_text(column))
            .collect()
    }
}

/// Run every enabled stage of `criteria` over `dataset`.
///
/// The input is never modified; the result is rebuilt from scratch.
pub fn apply_filters(dataset: &TripTable, criteria: &FilterCriteria) -> FilteredDataset {
    let mut table = dataset.clone();
    let mut stages = Vec::new();

    if let Some(filter) = &criteria.categorical {
        let (next, report) = categorical_stage(&table, filter);
        table = next;
        stages.push(report);
    }

    if let Some(filter) = &criteria.boolean {
        let (next, report) = boolean_stage(&table, filter);
        table = next;
        stages.push(report);
    }

    for filter in &criteria.ranges {
        let (next, report) = range_stage(&table, filter);
        table = next;
        stages.push(report);
    }

    for stage in &stages {
        debug!(
            kind = ?stage.kind,
            column = %stage.column,
            applied = stage.applied,
            rows_in = stage.rows_in,
            rows_out = stage.rows_out,
            "filter stage"
        );
    }

    FilteredDataset { table, stages }
}

fn passthrough(table: &TripTable, kind: StageKind, column: &str) -> (TripTable, StageReport) {
    let report = StageReport {
        kind,
        column: column.to_string(),
        applied: false,
        rows_in: table.len(),
        rows_out: table.len(),
        input_bounds: None,
        effective_bounds: None,
    };
    (table.clone(), report)
}

fn categorical_stage(table: &TripTable, filter: &CategoricalFilter) -> (TripTable, StageReport) {
    let Some(col) = table.column_index(&filter.column) else {
        return passthrough(table, StageKind::Categorical, &filter.column);
    };
    if filter.is_all() {
        return passthrough(table, StageKind::Categorical, &filter.column);
    }

    let next = table.retain_by(col, |cell| {
        cell.text().is_some_and(|text| text == filter.value)
    });
    let report = StageReport {
        kind: StageKind::Categorical,
        column: filter.column.clone(),
        applied: true,
        rows_in: table.len(),
        rows_out: next.len(),
        input_bounds: None,
        effective_bounds: None,
    };
    (next, report)
}

fn boolean_stage(table: &TripTable, filter: &BooleanFilter) -> (TripTable, StageReport) {
    let Some(col) = table.column_index(&filter.column) else {
        return passthrough(table, StageKind::Boolean, &filter.column);
    };

    let next = table.retain_by(col, |cell| cell.as_bool() == Some(filter.value));
    let report = StageReport {
        kind: StageKind::Boolean,
        column: filter.column.clone(),
        applied: true,
        rows_in: table.len(),
        rows_out: next.len(),
        input_bounds: None,
        effective_bounds: None,
    };
    (next, report)
}

fn range_stage(table: &TripTable, filter: &RangeFilter) -> (TripTable, StageReport) {
    let Some(col) = table.column_index(&filter.column) else {
        return passthrough(table, StageKind::Range, &filter.column);
    };

    // Defaults come from this stage's input, not the unfiltered table
    let input_bounds = table.numeric_bounds(&filter.column);
    let effective_bounds = filter.bounds.or(input_bounds);

    let next = match effective_bounds {
        Some((low, high)) => table.retain_by(col, |cell| {
            cell.as_number().is_some_and(|n| low <= n && n <= high)
        }),
        // No numbers to span: nothing can fall inside the range
        None => table.retain_by(col, |_: &Cell| false),
    };

    let report = StageReport {
        kind: StageKind::Range,
        column: filter.column.clone(),
        applied: true,
        rows_in: table.len(),
        rows_out: next.len(),
        input_bounds,
        effective_bounds,
    };
    (next, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::columns::*;

    fn table(rows: &[(&str, &str, bool, f64, f64)]) -> TripTable {
        TripTable::new(
            vec![
                ORIGIN.into(),
                DESTINATION.into(),
                TRANSIT_IS_FASTER.into(),
                DRIVING_DISTANCE_KM.into(),
                TRANSIT_PERCENTAGE_FASTER.into(),
            ],
            rows.iter()
                .map(|&(o, d, faster, km, pct)| {
                    vec![o.into(), d.into(), faster.into(), km.into(), pct.into()]
                })
                .collect(),
        )
        .unwrap()
    }

    fn sample() -> TripTable {
        table(&[
            ("A", "B", true, 10.0, 15.0),
            ("A", "C", false, 25.0, -10.0),
            ("B", "C", true, 40.0, 30.0),
            ("C", "A", true, 5.0, 50.0),
            ("A", "D", true, 60.0, 5.0),
        ])
    }

    fn origins(filtered: &FilteredDataset) -> Vec<String> {
        filtered
            .table()
            .rows()
            .iter()
            .map(|r| r.cells()[0].to_string())
            .collect()
    }

    #[test]
    fn boolean_filter_keeps_exact_matches() {
        let trips = TripTable::new(
            vec![
                ORIGIN.into(),
                TRANSIT_IS_FASTER.into(),
                DRIVING_DISTANCE_KM.into(),
            ],
            vec![
                vec!["A".into(), true.into(), Cell::from(10.0)],
                vec!["B".into(), false.into(), Cell::from(20.0)],
            ],
        )
        .unwrap();

        let criteria = FilterCriteria::new().with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, true));
        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(origins(&filtered), vec!["A"]);
    }

    #[test]
    fn categorical_matches_source_text_of_numbers() {
        let csv = "Origin,Destination\n007,A\n7,B\n1.50,C\n";
        let trips = TripTable::from_csv_reader(csv.as_bytes()).unwrap();

        let keep = |value: &str| {
            let criteria =
                FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, value));
            apply_filters(&trips, &criteria).unique_text(DESTINATION)
        };

        assert_eq!(keep("007"), vec!["A"]);
        assert_eq!(keep("7"), vec!["B"]);
        assert_eq!(keep("1.50"), vec!["C"]);
        assert!(keep("1.5").is_empty());
    }

    #[test]
    fn boolean_filter_is_not_truthiness() {
        let trips = TripTable::new(
            vec![TRANSIT_IS_FASTER.into()],
            vec![
                vec![Cell::from(1.0)],
                vec![Cell::Text("yes".into())],
                vec![Cell::Bool(true)],
                vec![Cell::Empty],
            ],
        )
        .unwrap();

        let criteria = FilterCriteria::new().with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, true));
        assert_eq!(apply_filters(&trips, &criteria).len(), 1);
    }

    #[test]
    fn categorical_all_is_noop() {
        let trips = sample();
        let criteria = FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, ALL));
        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(filtered.len(), trips.len());
        assert_eq!(filtered.table().rows(), trips.rows());
        assert!(!filtered.stages()[0].applied);
    }

    #[test]
    fn categorical_exact_match() {
        let trips = sample();
        let criteria = FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, "A"));
        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(origins(&filtered), vec!["A", "A", "A"]);

        let criteria = FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, "a"));
        assert!(apply_filters(&trips, &criteria).is_empty());
    }

    #[test]
    fn missing_columns_disable_stages() {
        let trips = TripTable::new(vec!["Other".into()], vec![vec!["x".into()]]).unwrap();
        let criteria = FilterCriteria::new()
            .with_categorical(CategoricalFilter::new(ORIGIN, "A"))
            .with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, false))
            .with_range(RangeFilter::new(DRIVING_DISTANCE_KM, 100.0, 200.0).unwrap());

        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.stages().len(), 3);
        assert!(filtered.stages().iter().all(|s| !s.applied));
    }

    #[test]
    fn range_is_inclusive() {
        let trips = sample();
        let criteria =
            FilterCriteria::new().with_range(RangeFilter::new(DRIVING_DISTANCE_KM, 10.0, 40.0).unwrap());
        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn range_defaults_are_progressive() {
        let trips = sample();
        let criteria = FilterCriteria::new()
            .with_categorical(CategoricalFilter::new(ORIGIN, "A"))
            .with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, true))
            .with_range(RangeFilter::full(DRIVING_DISTANCE_KM))
            .with_range(RangeFilter::full(TRANSIT_PERCENTAGE_FASTER));

        let filtered = apply_filters(&trips, &criteria);

        // Only A→B (10 km) and A→D (60 km) survive the first two stages
        let distance = filtered.stage(DRIVING_DISTANCE_KM).unwrap();
        assert_eq!(distance.input_bounds, Some((10.0, 60.0)));
        assert_eq!(distance.rows_out, 2);

        let pct = filtered.stage(TRANSIT_PERCENTAGE_FASTER).unwrap();
        assert_eq!(pct.input_bounds, Some((5.0, 15.0)));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn later_range_bounds_follow_earlier_range() {
        let trips = sample();
        assert_eq!(trips.numeric_bounds(TRANSIT_PERCENTAGE_FASTER), Some((-10.0, 50.0)));

        let criteria = FilterCriteria::new()
            .with_range(RangeFilter::new(DRIVING_DISTANCE_KM, 0.0, 12.0).unwrap())
            .with_range(RangeFilter::full(TRANSIT_PERCENTAGE_FASTER));
        let filtered = apply_filters(&trips, &criteria);

        // Only the 10 km and 5 km trips reach the second range
        let pct = filtered.stage(TRANSIT_PERCENTAGE_FASTER).unwrap();
        assert_eq!(pct.input_bounds, Some((15.0, 50.0)));
        assert_eq!(pct.effective_bounds, Some((15.0, 50.0)));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn range_at_input_bounds_keeps_everything() {
        let trips = sample();
        let (low, high) = trips.numeric_bounds(DRIVING_DISTANCE_KM).unwrap();
        let criteria =
            FilterCriteria::new().with_range(RangeFilter::new(DRIVING_DISTANCE_KM, low, high).unwrap());

        assert_eq!(apply_filters(&trips, &criteria).len(), trips.len());
    }

    #[test]
    fn range_drops_non_numeric_cells() {
        let trips = TripTable::new(
            vec![DRIVING_DISTANCE_KM.into()],
            vec![vec![Cell::from(3.0)], vec![Cell::Empty], vec![Cell::Text("far".into())]],
        )
        .unwrap();

        let criteria = FilterCriteria::new().with_range(RangeFilter::full(DRIVING_DISTANCE_KM));
        let filtered = apply_filters(&trips, &criteria);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.stages()[0].input_bounds, Some((3.0, 3.0)));
    }

    #[test]
    fn empty_dataset_flows_through() {
        let trips = sample();
        let criteria = FilterCriteria::new()
            .with_categorical(CategoricalFilter::new(ORIGIN, "Nowhere"))
            .with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, true))
            .with_range(RangeFilter::full(DRIVING_DISTANCE_KM));

        let filtered = apply_filters(&trips, &criteria);

        assert!(filtered.is_empty());
        assert_eq!(filtered.stages().len(), 3);
        assert_eq!(filtered.stages()[2].rows_in, 0);
        assert_eq!(filtered.stages()[2].input_bounds, None);
    }

    #[test]
    fn input_is_untouched() {
        let trips = sample();
        let criteria = FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, "B"));
        let _ = apply_filters(&trips, &criteria);
        assert_eq!(trips.len(), 5);
    }

    #[test]
    fn invalid_range() {
        let err = RangeFilter::new(DRIVING_DISTANCE_KM, 10.0, 5.0).unwrap_err();
        assert_eq!(err.low, 10.0);
        assert_eq!(
            err.to_string(),
            "invalid range for \"Driving Distance (KM)\": low 10 must not exceed high 5"
        );

        assert!(RangeFilter::new(DRIVING_DISTANCE_KM, f64::NAN, 5.0).is_err());
        assert!(RangeFilter::new(DRIVING_DISTANCE_KM, 5.0, 5.0).is_ok());
    }

    #[test]
    fn dashboard_criteria() {
        let criteria = FilterCriteria::dashboard("A", Some(true), Some((0.0, 50.0)), None).unwrap();

        assert_eq!(criteria.categorical, Some(CategoricalFilter::new(ORIGIN, "A")));
        assert_eq!(
            criteria.boolean,
            Some(BooleanFilter::new(TRANSIT_IS_FASTER, true))
        );
        assert_eq!(criteria.ranges.len(), 2);
        assert_eq!(criteria.ranges[0].bounds(), Some((0.0, 50.0)));
        assert_eq!(criteria.ranges[1].column(), TRANSIT_PERCENTAGE_FASTER);
        assert_eq!(criteria.ranges[1].bounds(), None);

        let filtered = apply_filters(&sample(), &criteria);
        assert_eq!(origins(&filtered), vec!["A"]);

        assert!(FilterCriteria::dashboard(ALL, None, Some((5.0, 1.0)), None).is_err());
    }

    #[test]
    fn category_options_start_with_all() {
        let filtered = apply_filters(&sample(), &FilterCriteria::new());
        assert_eq!(filtered.category_options(ORIGIN), vec!["All", "A", "B", "C"]);
        assert_eq!(filtered.unique_text(DESTINATION), vec!["B", "C", "A", "D"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::trips::columns::*;
    use proptest::prelude::*;

    fn arb_table() -> impl Strategy<Value = TripTable> {
        proptest::collection::vec(
            ("[A-C]", any::<bool>(), 0.0f64..100.0, -50.0f64..50.0),
            0..30,
        )
        .prop_map(|rows| {
            TripTable::new(
                vec![
                    ORIGIN.into(),
                    TRANSIT_IS_FASTER.into(),
                    DRIVING_DISTANCE_KM.into(),
                    TRANSIT_PERCENTAGE_FASTER.into(),
                ],
                rows.into_iter()
                    .map(|(o, b, km, pct)| vec![Cell::Text(o), b.into(), km.into(), pct.into()])
                    .collect(),
            )
            .unwrap()
        })
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            proptest::option::of(prop_oneof![Just(ALL.to_string()), "[A-D]"]),
            proptest::option::of(any::<bool>()),
            proptest::option::of((0.0f64..100.0, 0.0f64..100.0)),
            proptest::option::of((-50.0f64..50.0, -50.0f64..50.0)),
        )
            .prop_map(|(origin, faster, km, pct)| {
                let ordered = |(a, b): (f64, f64)| (a.min(b), a.max(b));
                let mut criteria = FilterCriteria::new();
                if let Some(origin) = origin {
                    criteria = criteria.with_categorical(CategoricalFilter::new(ORIGIN, origin));
                }
                if let Some(faster) = faster {
                    criteria = criteria.with_boolean(BooleanFilter::new(TRANSIT_IS_FASTER, faster));
                }
                criteria = match km.map(ordered) {
                    Some((lo, hi)) => criteria.with_range(RangeFilter::new(DRIVING_DISTANCE_KM, lo, hi).unwrap()),
                    None => criteria.with_range(RangeFilter::full(DRIVING_DISTANCE_KM)),
                };
                match pct.map(ordered) {
                    Some((lo, hi)) => criteria.with_range(RangeFilter::new(TRANSIT_PERCENTAGE_FASTER, lo, hi).unwrap()),
                    None => criteria.with_range(RangeFilter::full(TRANSIT_PERCENTAGE_FASTER)),
                }
            })
    }

    proptest! {
        /// Every stage keeps at most as many rows as it was given
        #[test]
        fn stages_never_grow(trips in arb_table(), criteria in arb_criteria()) {
            let filtered = apply_filters(&trips, &criteria);

            let mut previous = trips.len();
            for stage in filtered.stages() {
                prop_assert_eq!(stage.rows_in, previous);
                prop_assert!(stage.rows_out <= stage.rows_in);
                previous = stage.rows_out;
            }
            prop_assert_eq!(filtered.len(), previous);
        }

        /// "All" never removes a row
        #[test]
        fn all_is_identity(trips in arb_table()) {
            let criteria = FilterCriteria::new().with_categorical(CategoricalFilter::new(ORIGIN, ALL));
            let filtered = apply_filters(&trips, &criteria);
            prop_assert_eq!(filtered.table().rows(), trips.rows());
        }

        /// A full-span range keeps every numeric row
        #[test]
        fn full_range_is_identity(trips in arb_table()) {
            let criteria = FilterCriteria::new().with_range(RangeFilter::full(DRIVING_DISTANCE_KM));
            prop_assert_eq!(apply_filters(&trips, &criteria).len(), trips.len());
        }
    }
}
