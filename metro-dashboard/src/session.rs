//! Per-session dashboard context.
//!
//! The station index and the raw travel-time table are loaded once and
//! shared read-only. Every change to the filter criteria rebuilds the
//! filtered rows from the raw table.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::network::{NetworkError, StationIndex, StationIndexBuilder};
use crate::route::{RouteResolution, RouteResolver};
use crate::trips::{FilterCriteria, FilteredDataset, TableError, TripTable, apply_filters, columns};

/// Errors loading a session's data.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("station index: {0}")]
    Network(#[from] NetworkError),

    #[error("travel-time table: {0}")]
    Table(#[from] TableError),
}

/// Origin and destination names a user can pick a route between.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointChoices {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
}

/// Build-once station index plus the raw trips it is explored against.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    stations: Arc<StationIndex>,
    trips: Arc<TripTable>,
}

impl DashboardSession {
    pub fn new(stations: StationIndex, trips: TripTable) -> Self {
        Self {
            stations: Arc::new(stations),
            trips: Arc::new(trips),
        }
    }

    /// Load both inputs from the paths in `config`.
    pub fn load(config: &DashboardConfig) -> Result<Self, SessionError> {
        let (stations, report) = StationIndexBuilder::new()
            .with_policy(config.missing_line_policy)
            .build_from_path(&config.stations_path)?;
        if !report.is_clean() {
            warn!(
                skipped = report.skipped.len(),
                "some lines or stops were left out of the station index"
            );
        }
        info!(
            records = stations.len(),
            names = stations.unique_names().len(),
            lines = stations.lines().len(),
            "built station index"
        );

        let trips = TripTable::from_path(&config.trips_path)?;
        info!(
            rows = trips.len(),
            columns = trips.columns().len(),
            "loaded travel-time table"
        );

        Ok(Self::new(stations, trips))
    }

    pub fn stations(&self) -> &StationIndex {
        &self.stations
    }

    pub fn trips(&self) -> &TripTable {
        &self.trips
    }

    /// Filter the raw trips with `criteria`.
    pub fn explore(&self, criteria: &FilterCriteria) -> FilteredDataset {
        apply_filters(&self.trips, criteria)
    }

    /// Choices for the origin selector, drawn from the unfiltered table.
    pub fn origin_options(&self) -> Vec<String> {
        apply_filters(&self.trips, &FilterCriteria::new()).category_options(columns::ORIGIN)
    }

    /// Names a user can route between, drawn from the filtered rows.
    pub fn endpoint_choices(&self, filtered: &FilteredDataset) -> EndpointChoices {
        EndpointChoices {
            origins: filtered.unique_text(columns::ORIGIN),
            destinations: filtered.unique_text(columns::DESTINATION),
        }
    }

    /// Resolve two names against the station index.
    pub fn route(&self, origin: &str, destination: &str) -> RouteResolution {
        RouteResolver::new(self.stations.as_ref()).resolve_route(origin, destination)
    }
}
