//! Application state for the web layer.

use crate::network::StationIndex;
use crate::session::DashboardSession;
use crate::trips::TripTable;

/// Shared application state.
///
/// Cloning is cheap: the station index and raw trips sit behind `Arc`s in
/// the session.
#[derive(Clone)]
pub struct AppState {
    /// Station index and raw travel-time table
    pub session: DashboardSession,
}

impl AppState {
    /// Create a new app state.
    pub fn new(session: DashboardSession) -> Self {
        Self { session }
    }

    /// State over already-built inputs.
    pub fn from_parts(stations: StationIndex, trips: TripTable) -> Self {
        Self::new(DashboardSession::new(stations, trips))
    }
}
