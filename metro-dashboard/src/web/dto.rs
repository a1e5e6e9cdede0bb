//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

use crate::geo::Coordinates;
use crate::network::{LineSummary, StopMatch};
use crate::route::{DEFAULT_ZOOM, RouteGeometry, RouteStyle};
use crate::trips::{ALL, FilterCriteria, FilteredDataset, InvalidRange, StageReport, TripTable};

/// Shown when either endpoint of a route is not a known stop.
pub const UNRESOLVED_MESSAGE: &str = "Coordinates for Origin or Destination not found.";

/// Trip filter parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TripQuery {
    /// Origin to keep, or "All"
    pub origin: Option<String>,

    /// "true", "false", or "any" (defaults to "true")
    pub transit_faster: Option<String>,

    /// Driving distance bounds in km; blank means unbounded
    #[serde(default, deserialize_with = "blank_as_none")]
    pub distance_min: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub distance_max: Option<f64>,

    /// Transit percentage faster bounds; blank means unbounded
    #[serde(default, deserialize_with = "blank_as_none")]
    pub faster_min: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub faster_max: Option<f64>,
}

/// Read an optional number, treating an empty form field as absent.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number {s:?}"))),
    }
}

/// Why a [`TripQuery`] could not become filter criteria.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("transit_faster must be true, false or any, got {0:?}")]
    TransitFaster(String),

    #[error(transparent)]
    Range(#[from] InvalidRange),
}

impl TripQuery {
    /// The selected origin, defaulting to "All".
    pub fn origin(&self) -> &str {
        self.origin
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(ALL)
    }

    /// The boolean stage value; `None` disables the stage.
    pub fn transit_faster(&self) -> Result<Option<bool>, QueryError> {
        match self.transit_faster.as_deref().map(str::trim) {
            None | Some("") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(v) if v.eq_ignore_ascii_case("any") => Ok(None),
            Some(v) => Err(QueryError::TransitFaster(v.to_string())),
        }
    }

    /// Build the dashboard's filter chain.
    ///
    /// A range with neither bound given spans its stage input; a range with
    /// one bound given is open on the other side.
    pub fn to_criteria(&self) -> Result<FilterCriteria, QueryError> {
        Ok(FilterCriteria::dashboard(
            self.origin(),
            self.transit_faster()?,
            bounds(self.distance_min, self.distance_max),
            bounds(self.faster_min, self.faster_max),
        )?)
    }
}

fn bounds(low: Option<f64>, high: Option<f64>) -> Option<(f64, f64)> {
    match (low, high) {
        (None, None) => None,
        (low, high) => Some((
            low.unwrap_or(f64::NEG_INFINITY),
            high.unwrap_or(f64::INFINITY),
        )),
    }
}

/// Filtered trips plus everything a client needs to draw the filter widgets.
#[derive(Debug, Serialize)]
pub struct TripsResponse {
    /// Rows in the unfiltered table
    pub total_rows: usize,

    /// Remaining rows and their columns
    pub trips: TripTable,

    /// What each filter stage did
    pub stages: Vec<StageReport>,

    /// Selector choices for the origin filter ("All" first)
    pub origin_options: Vec<String>,

    /// Names available as route endpoints
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

impl TripsResponse {
    pub fn new(
        total_rows: usize,
        filtered: FilteredDataset,
        origin_options: Vec<String>,
        origins: Vec<String>,
        destinations: Vec<String>,
    ) -> Self {
        let stages = filtered.stages().to_vec();
        Self {
            total_rows,
            trips: filtered.into_table(),
            stages,
            origin_options,
            origins,
            destinations,
        }
    }
}

/// Request to search stop names.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    #[serde(default)]
    pub q: String,

    /// Maximum results (default 10, capped at 50)
    pub limit: Option<usize>,
}

/// Response for stop name search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StopMatch>,
}

/// Response listing metro lines.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineSummary>,
}

/// Request to draw a route between two names.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub origin: String,
    pub destination: String,

    /// "ground" (default) or "arc"
    pub style: Option<String>,
}

/// Initial map view for a route.
#[derive(Debug, Serialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
}

/// A route, resolved or not.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RouteResponse {
    Resolved {
        style: RouteStyle,
        view: MapView,
        route: RouteGeometry,
        layer: Value,
    },
    Unresolved {
        missing: Vec<String>,
        message: String,
    },
}

impl RouteResponse {
    pub fn resolved(style: RouteStyle, route: RouteGeometry, layer: Value) -> Self {
        RouteResponse::Resolved {
            style,
            view: MapView {
                center: route.center(),
                zoom: DEFAULT_ZOOM,
            },
            route,
            layer,
        }
    }

    pub fn unresolved(missing: Vec<String>) -> Self {
        RouteResponse::Unresolved {
            missing,
            message: UNRESOLVED_MESSAGE.to_string(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::columns::*;

    fn query(pairs: &[(&str, &str)]) -> TripQuery {
        let mut q = TripQuery::default();
        for (key, value) in pairs {
            let text = Some(value.to_string());
            let number = value.parse::<f64>().ok();
            match *key {
                "origin" => q.origin = text,
                "transit_faster" => q.transit_faster = text,
                "distance_min" => q.distance_min = number,
                "distance_max" => q.distance_max = number,
                "faster_min" => q.faster_min = number,
                "faster_max" => q.faster_max = number,
                other => panic!("unknown key {other}"),
            }
        }
        q
    }

    #[test]
    fn defaults() {
        let q = TripQuery::default();
        assert_eq!(q.origin(), "All");
        assert_eq!(q.transit_faster().unwrap(), Some(true));

        let criteria = q.to_criteria().unwrap();
        assert_eq!(criteria.boolean.unwrap().value, true);
        assert!(criteria.ranges.iter().all(|r| r.bounds().is_none()));
    }

    #[test]
    fn transit_faster_values() {
        assert_eq!(
            query(&[("transit_faster", "False")]).transit_faster().unwrap(),
            Some(false)
        );
        assert_eq!(
            query(&[("transit_faster", "any")]).transit_faster().unwrap(),
            None
        );
        assert!(matches!(
            query(&[("transit_faster", "maybe")]).transit_faster(),
            Err(QueryError::TransitFaster(_))
        ));
    }

    #[test]
    fn empty_origin_means_all() {
        assert_eq!(query(&[("origin", "")]).origin(), ALL);
        assert_eq!(query(&[("origin", "Olaya")]).origin(), "Olaya");
    }

    #[test]
    fn half_open_ranges() {
        let criteria = query(&[("distance_min", "5")]).to_criteria().unwrap();
        let distance = criteria
            .ranges
            .iter()
            .find(|r| r.column() == DRIVING_DISTANCE_KM)
            .unwrap();
        assert_eq!(distance.bounds(), Some((5.0, f64::INFINITY)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = query(&[("faster_min", "50"), ("faster_max", "10")])
            .to_criteria()
            .unwrap_err();
        assert!(matches!(err, QueryError::Range(_)));
    }

    #[test]
    fn blank_bounds_are_unbounded() {
        let q: TripQuery = serde_json::from_value(serde_json::json!({
            "origin": "All",
            "distance_min": "",
            "distance_max": " 12 ",
            "faster_min": "",
        }))
        .unwrap();

        assert_eq!(q.distance_min, None);
        assert_eq!(q.distance_max, Some(12.0));
        assert_eq!(q.faster_min, None);
        assert_eq!(q.faster_max, None);

        let bad = serde_json::from_value::<TripQuery>(serde_json::json!({ "faster_max": "lots" }));
        assert!(bad.is_err());
    }

    #[test]
    fn unresolved_route_json() {
        let value = serde_json::to_value(RouteResponse::unresolved(vec!["X".into()])).unwrap();
        assert_eq!(value["status"], "unresolved");
        assert_eq!(value["missing"], serde_json::json!(["X"]));
        assert_eq!(value["message"], UNRESOLVED_MESSAGE);
    }
}
