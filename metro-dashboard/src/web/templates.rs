//! Askama templates for the web frontend.

use askama::Template;

use crate::trips::{FilteredDataset, StageKind, StageReport, TripTable};

use super::dto::TripQuery;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Dashboard page: filter form, trip table and route picker.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub filters: FilterFormView,
    pub trips: TripTableView,
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Filtered trip table fragment.
#[derive(Template)]
#[template(path = "trip_table.html")]
pub struct TripTableTemplate {
    pub trips: TripTableView,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One choice in a `<select>`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub value: String,
    pub selected: bool,
}

impl OptionView {
    /// Options for `values`, marking the one equal to `selected`.
    pub fn list(values: &[String], selected: &str) -> Vec<Self> {
        values
            .iter()
            .map(|v| OptionView {
                value: v.clone(),
                selected: v == selected,
            })
            .collect()
    }
}

/// A min/max pair of number inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeView {
    pub label: String,
    pub min_param: &'static str,
    pub max_param: &'static str,
    /// Values the user submitted, echoed back
    pub low: String,
    pub high: String,
    /// Min/max of the rows reaching this stage
    pub input_min: String,
    pub input_max: String,
}

impl RangeView {
    pub fn new(
        label: &str,
        params: (&'static str, &'static str),
        submitted: (Option<f64>, Option<f64>),
        stage: Option<&StageReport>,
    ) -> Self {
        let bounds = stage.and_then(|s| s.input_bounds);
        Self {
            label: label.to_string(),
            min_param: params.0,
            max_param: params.1,
            low: submitted.0.map(|v| v.to_string()).unwrap_or_default(),
            high: submitted.1.map(|v| v.to_string()).unwrap_or_default(),
            input_min: bounds.map(|(lo, _)| lo.to_string()).unwrap_or_default(),
            input_max: bounds.map(|(_, hi)| hi.to_string()).unwrap_or_default(),
        }
    }
}

/// State of the filter form.
#[derive(Debug, Clone)]
pub struct FilterFormView {
    pub origin_options: Vec<OptionView>,
    /// "true", "false" or "any"
    pub transit_faster: String,
    pub ranges: Vec<RangeView>,
}

impl FilterFormView {
    /// Echo `query` back into the form, with range hints from `filtered`.
    pub fn new(query: &TripQuery, origin_options: &[String], filtered: &FilteredDataset) -> Self {
        use crate::trips::columns::{DRIVING_DISTANCE_KM, TRANSIT_PERCENTAGE_FASTER};

        let transit_faster = match query.transit_faster() {
            Ok(Some(true)) | Err(_) => "true",
            Ok(Some(false)) => "false",
            Ok(None) => "any",
        };

        Self {
            origin_options: OptionView::list(origin_options, query.origin()),
            transit_faster: transit_faster.to_string(),
            ranges: vec![
                RangeView::new(
                    DRIVING_DISTANCE_KM,
                    ("distance_min", "distance_max"),
                    (query.distance_min, query.distance_max),
                    filtered.stage(DRIVING_DISTANCE_KM),
                ),
                RangeView::new(
                    TRANSIT_PERCENTAGE_FASTER,
                    ("faster_min", "faster_max"),
                    (query.faster_min, query.faster_max),
                    filtered.stage(TRANSIT_PERCENTAGE_FASTER),
                ),
            ],
        }
    }

    /// Whether `value` is the current transit-faster choice.
    pub fn is_transit(&self, value: &str) -> bool {
        self.transit_faster == value
    }
}

/// Rendered trip table.
#[derive(Debug, Clone)]
pub struct TripTableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub stages: Vec<StageView>,
}

impl TripTableView {
    pub fn new(filtered: &FilteredDataset, total_rows: usize) -> Self {
        Self {
            stages: filtered.stages().iter().map(StageView::from_report).collect(),
            ..Self::from_table(filtered.table(), total_rows)
        }
    }

    fn from_table(table: &TripTable, total_rows: usize) -> Self {
        Self {
            columns: table.columns().to_vec(),
            rows: table
                .rows()
                .iter()
                .map(|r| r.cells().iter().map(|c| c.to_string()).collect())
                .collect(),
            total_rows,
            stages: Vec::new(),
        }
    }

    /// e.g. "12 of 40 trips"
    pub fn summary(&self) -> String {
        format!("{} of {} trips", self.rows.len(), self.total_rows)
    }
}

/// One filter stage, for the summary under the table.
#[derive(Debug, Clone, PartialEq)]
pub struct StageView {
    pub column: String,
    pub kind: &'static str,
    pub applied: bool,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl StageView {
    pub fn from_report(report: &StageReport) -> Self {
        let kind = match report.kind {
            StageKind::Categorical => "category",
            StageKind::Boolean => "flag",
            StageKind::Range => "range",
        };
        Self {
            column: report.column.clone(),
            kind,
            applied: report.applied,
            rows_in: report.rows_in,
            rows_out: report.rows_out,
        }
    }
}
